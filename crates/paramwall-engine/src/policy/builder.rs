//! Engine construction options.

use std::sync::Arc;

use paramwall_core::error::Result;
use paramwall_core::grammar::GrammarOptions;
use paramwall_core::limits::Limits;
use paramwall_core::plugin::{ConstraintPlugin, PluginRegistry};
use paramwall_core::rule::Callback;

use crate::plugins::BuiltinPlugin;

use super::engine::Engine;

/// Builder for [`Engine`].
///
/// Custom plugins are consulted before the built-in ones, in the order they
/// were added, so they can take over any syntax a built-in would claim.
pub struct EngineBuilder {
    plugins: Vec<Arc<dyn ConstraintPlugin>>,
    builtins: Vec<BuiltinPlugin>,
    callback: Option<Callback>,
    limits: Limits,
    grammar: GrammarOptions,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            builtins: BuiltinPlugin::ALL.to_vec(),
            callback: None,
            limits: Limits::default(),
            grammar: GrammarOptions::default(),
        }
    }

    pub fn plugin(mut self, plugin: impl ConstraintPlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugin_arc(mut self, plugin: Arc<dyn ConstraintPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Restrict the built-in plugins to `builtins`, in that order.
    pub fn builtin_plugins(mut self, builtins: &[BuiltinPlugin]) -> Self {
        self.builtins = builtins.to_vec();
        self
    }

    pub fn without_builtin_plugins(mut self) -> Self {
        self.builtins.clear();
        self
    }

    /// Default predicate for `=[?]` rules.
    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn grammar(mut self, grammar: GrammarOptions) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn native_ranges(mut self, on: bool) -> Self {
        self.grammar.native_ranges = on;
        self
    }

    /// Validate options, then load `source`. Any rule error fails the build.
    pub fn build(self, source: &str) -> Result<Engine> {
        self.limits.validate()?;

        let mut registry = PluginRegistry::new();
        for p in self.plugins {
            registry.register(p);
        }
        for b in &self.builtins {
            registry.register(b.instantiate());
        }

        let engine = Engine::from_parts(registry, self.limits, self.grammar, self.callback);
        engine.parse_rules(source)?;
        Ok(engine)
    }
}
