//! Constraint plugin interface and the registry/cache that drives it.
//!
//! A plugin sniffs a bracketed constraint body with `can_parse` and compiles
//! it into a [`Validator`] with `parse`. Plugins are asked in registration
//! order; the first one that claims a body owns it, and a compile failure
//! from that plugin fails the whole rule load.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{ParamwallError, Result};
use crate::rule::Validator;

/// A pluggable constraint parser.
pub trait ConstraintPlugin: Send + Sync {
    /// Stable name used for cache keys and diagnostics.
    fn name(&self) -> &str;

    /// Cheap syntactic sniff. Runs for every bracketed constraint during
    /// parsing, so it must not allocate heavily or have side effects.
    fn can_parse(&self, body: &str) -> bool;

    /// Compile `body` for parameter `param` into a value predicate.
    /// The returned message becomes a [`ParamwallError::Plugin`].
    fn parse(&self, param: &str, body: &str) -> std::result::Result<Validator, String>;

    /// Release external resources. Called once when the engine closes.
    fn close(&self) {}
}

type CacheKey = (String, String, String);

/// Ordered plugin list plus a memo cache keyed by `(plugin, param, body)`.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ConstraintPlugin>>,
    cache: DashMap<CacheKey, Validator>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            cache: DashMap::new(),
        }
    }

    pub fn with_plugins(plugins: impl IntoIterator<Item = Arc<dyn ConstraintPlugin>>) -> Self {
        let mut reg = Self::new();
        for p in plugins {
            reg.register(p);
        }
        reg
    }

    pub fn register(&mut self, plugin: Arc<dyn ConstraintPlugin>) {
        self.plugins.push(plugin);
    }

    /// Same plugins, empty cache. Used for dry-run checks that must not
    /// touch the live cache.
    pub fn detached(&self) -> Self {
        Self::with_plugins(self.plugins.iter().cloned())
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Offer `body` to the plugins in order.
    ///
    /// `None` when no plugin claims it. Otherwise the claiming plugin's name
    /// and compiled validator, served from cache when the same
    /// `(plugin, param, body)` was compiled before.
    pub fn compile(&self, param: &str, body: &str) -> Option<Result<(String, Validator)>> {
        let plugin = self.plugins.iter().find(|p| p.can_parse(body))?;
        let name = plugin.name().to_string();
        let key = (name.clone(), param.to_string(), body.to_string());

        if let Some(v) = self.cache.get(&key) {
            tracing::debug!(plugin = %name, param = %param, "constraint cache hit");
            return Some(Ok((name, Arc::clone(v.value()))));
        }

        let compiled = match plugin.parse(param, body) {
            Ok(v) => v,
            Err(msg) => {
                return Some(Err(ParamwallError::Plugin {
                    plugin: name,
                    param: param.to_string(),
                    msg,
                }))
            }
        };

        tracing::debug!(plugin = %name, param = %param, "constraint compiled");
        let v = self.cache.entry(key).or_insert(compiled).value().clone();
        Some(Ok((name, v)))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Invoke every plugin's close hook and drop cached validators.
    pub fn close(&self) {
        for p in &self.plugins {
            p.close();
        }
        self.cache.clear();
    }
}
