use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use paramwall_core::error::{ParamwallError, Result};
use paramwall_core::grammar::{GrammarOptions, RuleParser};
use paramwall_core::limits::Limits;
use paramwall_core::plugin::PluginRegistry;
use paramwall_core::query::split_url;
use paramwall_core::rule::Callback;

use super::builder::EngineBuilder;
use super::compiled::CompiledRuleSet;

/// Query-parameter firewall.
///
/// Readers take the lock only long enough to clone the current snapshot,
/// so a rule update never blocks on in-flight validation and no reader
/// sees a half-built rule set. Every read method here is the guarded
/// path: a panicking callback or plugin validator becomes a deny.
pub struct Engine {
    state: RwLock<EngineState>,
    plugins: Arc<PluginRegistry>,
    limits: Limits,
    grammar: GrammarOptions,
}

struct EngineState {
    compiled: Arc<CompiledRuleSet>,
    callback: Option<Callback>,
    closed: bool,
}

impl Engine {
    /// Build an engine with the built-in plugins and default limits.
    pub fn new(source: &str) -> Result<Self> {
        EngineBuilder::new().build(source)
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        plugins: PluginRegistry,
        limits: Limits,
        grammar: GrammarOptions,
        callback: Option<Callback>,
    ) -> Self {
        Self {
            state: RwLock::new(EngineState {
                compiled: Arc::new(CompiledRuleSet::empty(&limits)),
                callback,
                closed: false,
            }),
            plugins: Arc::new(plugins),
            limits,
            grammar,
        }
    }

    fn parser(&self) -> RuleParser<'_> {
        RuleParser::new(&self.plugins, &self.limits).options(self.grammar)
    }

    /// Replace the loaded rules. On error the previous rules stay in force.
    pub fn parse_rules(&self, source: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(ParamwallError::Closed);
        }

        self.plugins.clear_cache();
        let parsed = self.parser().parse(source).map_err(|e| {
            tracing::warn!(code = e.code().as_str(), error = %e, "rule source rejected; keeping previous rules");
            e
        })?;
        state.compiled = Arc::new(CompiledRuleSet::compile(parsed, &self.limits));
        Ok(())
    }

    /// Syntax check against this engine's plugins and limits. Touches no
    /// engine state, including the plugin cache.
    pub fn check_rules(&self, source: &str) -> Result<()> {
        let plugins = self.plugins.detached();
        RuleParser::new(&plugins, &self.limits)
            .options(self.grammar)
            .parse(source)
            .map(|_| ())
    }

    /// Drop all rules. Every non-empty query is denied until the next parse.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.compiled = Arc::new(CompiledRuleSet::empty(&self.limits));
        self.plugins.clear_cache();
        tracing::info!("rules cleared");
    }

    /// Drop all rules and reopen a closed engine.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.compiled = Arc::new(CompiledRuleSet::empty(&self.limits));
        state.closed = false;
        self.plugins.clear_cache();
        tracing::info!("engine reset");
    }

    /// Release plugin resources. A closed engine denies every query and
    /// refuses new rules until [`reset`](Self::reset).
    pub fn close(&self) {
        let mut state = self.state.write();
        if state.closed {
            return;
        }
        state.closed = true;
        state.compiled = Arc::new(CompiledRuleSet::empty(&self.limits));
        self.plugins.close();
        tracing::info!("engine closed");
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Install the predicate used by `=[?]` rules.
    pub fn set_callback<F>(&self, f: F)
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.state.write().callback = Some(Arc::new(f));
    }

    /// Current rule set. Its query methods skip the panic guard.
    pub fn snapshot(&self) -> Arc<CompiledRuleSet> {
        Arc::clone(&self.state.read().compiled)
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.names()
    }

    /// Loaded rules in grammar form.
    pub fn rules_string(&self) -> String {
        self.snapshot().to_rule_string()
    }

    pub fn validate_url(&self, url: &str) -> bool {
        if url.len() > self.limits.max_url_len {
            return false;
        }
        match split_url(url) {
            Some(parts) => self.validate_query(&parts.path, parts.query),
            None => false,
        }
    }

    pub fn validate_query(&self, path: &str, query: &str) -> bool {
        self.guarded("validate_query", false, |set, cb| {
            set.validate_query(path, query, cb)
        })
    }

    pub fn validate_param(&self, path: &str, name: &str, value: &str) -> bool {
        self.guarded("validate_param", false, |set, cb| {
            set.validate_param(path, name, value, cb)
        })
    }

    /// Filtered query string (no leading `?`); empty when nothing survives.
    ///
    /// Each parameter is guarded on its own: a panicking predicate drops
    /// that parameter and the rest are still judged.
    pub fn filter_query(&self, path: &str, query: &str) -> String {
        let Some((set, cb)) = self.current() else {
            return String::new();
        };
        set.filter_with(path, query, |scope, p| {
            contain("filter_query", false, || set.check(scope, p.name, p.value, cb.as_ref()))
        })
    }

    /// Rewrite `url` keeping only permitted parameters. The text before the
    /// query and any fragment are preserved; with nothing left the query
    /// is dropped entirely.
    pub fn normalize_url(&self, url: &str) -> String {
        let bare = url.split(['?', '#']).next().unwrap_or_default();
        if url.len() > self.limits.max_url_len {
            return if bare.len() > self.limits.max_url_len {
                String::new()
            } else {
                bare.to_string()
            };
        }
        let Some(parts) = split_url(url) else {
            return bare.to_string();
        };

        let filtered = self.filter_query(&parts.path, parts.query);
        let mut out = String::with_capacity(url.len());
        out.push_str(parts.prefix);
        if !filtered.is_empty() {
            out.push('?');
            out.push_str(&filtered);
        }
        if let Some(frag) = parts.fragment {
            out.push('#');
            out.push_str(frag);
        }
        out
    }

    fn current(&self) -> Option<(Arc<CompiledRuleSet>, Option<Callback>)> {
        let state = self.state.read();
        if state.closed {
            return None;
        }
        Some((Arc::clone(&state.compiled), state.callback.clone()))
    }

    fn guarded<T>(
        &self,
        op: &'static str,
        deny: T,
        f: impl FnOnce(&CompiledRuleSet, Option<&Callback>) -> T,
    ) -> T {
        let Some((set, cb)) = self.current() else {
            return deny;
        };
        contain(op, deny, || f(&set, cb.as_ref()))
    }
}

fn contain<T>(op: &'static str, deny: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(op, "constraint predicate panicked; denying");
            deny
        }
    }
}
