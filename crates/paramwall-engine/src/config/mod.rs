//! YAML config for building an [`Engine`](crate::Engine).
//!
//! Parsing is strict: unknown keys fail at every level, and the document is
//! validated before any rule is compiled.

pub mod schema;

use std::fs;
use std::path::Path;

use paramwall_core::error::{ParamwallError, Result};

pub use schema::{EngineConfig, PluginSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        ParamwallError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let cfg = load_from_str(&s)?;
    tracing::debug!(config = %path.display(), rules_bytes = cfg.rules.len(), "config loaded");
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<EngineConfig> {
    let cfg: EngineConfig =
        serde_yaml::from_str(s).map_err(|e| ParamwallError::Config(format!("yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
