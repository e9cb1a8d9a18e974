use serde::Deserialize;

use paramwall_core::error::{ParamwallError, Result};
use paramwall_core::grammar::GrammarOptions;
use paramwall_core::limits::Limits;

use crate::plugins::BuiltinPlugin;
use crate::policy::{Engine, EngineBuilder};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub version: u32,

    /// Rule source in the rule language. Newlines separate clauses.
    #[serde(default)]
    pub rules: String,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub grammar: GrammarOptions,

    #[serde(default)]
    pub plugins: PluginSection,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ParamwallError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.limits.validate()?;
        ParamwallError::check_limit("rules", self.rules.len(), self.limits.max_rules_bytes)?;
        Ok(())
    }

    /// Builder preloaded with this config's limits, grammar and plugins.
    pub fn builder(&self) -> EngineBuilder {
        EngineBuilder::new()
            .limits(self.limits)
            .grammar(self.grammar)
            .builtin_plugins(&self.plugins.builtin)
    }

    pub fn build_engine(&self) -> Result<Engine> {
        self.builder().build(&self.rules)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    /// Built-in plugins to register, in order.
    #[serde(default = "default_builtin")]
    pub builtin: Vec<BuiltinPlugin>,
}

impl Default for PluginSection {
    fn default() -> Self {
        Self {
            builtin: default_builtin(),
        }
    }
}

fn default_builtin() -> Vec<BuiltinPlugin> {
    BuiltinPlugin::ALL.to_vec()
}
