//! Input size caps applied before any parsing or matching work.

use serde::Deserialize;

use crate::bitset::BITSET_CAPACITY;
use crate::error::{ParamwallError, Result};

/// Configurable limits. Defaults match the values the rule language was
/// designed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Maximum size of a rule source, in bytes.
    #[serde(default = "default_max_rules_bytes")]
    pub max_rules_bytes: usize,

    /// Maximum length of a URL (or path + query) handed to validation.
    #[serde(default = "default_max_url_len")]
    pub max_url_len: usize,

    /// Maximum length of a parameter name in the rule source.
    #[serde(default = "default_max_param_name_len")]
    pub max_param_name_len: usize,

    /// Maximum length of one bracketed constraint body.
    #[serde(default = "default_max_constraint_len")]
    pub max_constraint_len: usize,

    /// Maximum number of raw parameters in one query string.
    #[serde(default = "default_max_query_params")]
    pub max_query_params: usize,

    /// Maximum number of distinct parameter names (bitset capacity).
    #[serde(default = "default_max_params")]
    pub max_params: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rules_bytes: default_max_rules_bytes(),
            max_url_len: default_max_url_len(),
            max_param_name_len: default_max_param_name_len(),
            max_constraint_len: default_max_constraint_len(),
            max_query_params: default_max_query_params(),
            max_params: default_max_params(),
        }
    }
}

impl Limits {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("limits.max_rules_bytes", self.max_rules_bytes),
            ("limits.max_url_len", self.max_url_len),
            ("limits.max_param_name_len", self.max_param_name_len),
            ("limits.max_constraint_len", self.max_constraint_len),
            ("limits.max_query_params", self.max_query_params),
            ("limits.max_params", self.max_params),
        ];
        for (name, v) in fields {
            if v == 0 {
                return Err(ParamwallError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.max_params > BITSET_CAPACITY {
            return Err(ParamwallError::Config(format!(
                "limits.max_params must be at most {BITSET_CAPACITY}"
            )));
        }
        Ok(())
    }
}

fn default_max_rules_bytes() -> usize {
    1024 * 1024
}
fn default_max_url_len() -> usize {
    8192
}
fn default_max_param_name_len() -> usize {
    128
}
fn default_max_constraint_len() -> usize {
    1024
}
fn default_max_query_params() -> usize {
    256
}
fn default_max_params() -> usize {
    BITSET_CAPACITY
}
