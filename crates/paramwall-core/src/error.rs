//! Shared error type across paramwall crates.
//!
//! Only rule-source and configuration problems are errors. A request that
//! fails its rules is a plain `false` / dropped parameter, never an `Err`.

use thiserror::Error;

/// Stable, machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed rule grammar.
    Syntax,
    /// A plugin claimed a constraint and failed to compile it.
    Plugin,
    /// Input larger than a configured cap.
    LimitExceeded,
    /// Invalid configuration document or limit values.
    InvalidConfig,
    /// Mutation attempted on a closed engine.
    Closed,
}

impl ErrorCode {
    /// String representation used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "SYNTAX_ERROR",
            ErrorCode::Plugin => "PLUGIN_ERROR",
            ErrorCode::LimitExceeded => "LIMIT_EXCEEDED",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::Closed => "ENGINE_CLOSED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ParamwallError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum ParamwallError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("plugin {plugin} rejected constraint for {param}: {msg}")]
    Plugin {
        plugin: String,
        param: String,
        msg: String,
    },
    #[error("{what} too large: {len} > {max}")]
    LimitExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("engine is closed")]
    Closed,
}

impl ParamwallError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ParamwallError::Syntax(_) => ErrorCode::Syntax,
            ParamwallError::Plugin { .. } => ErrorCode::Plugin,
            ParamwallError::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            ParamwallError::Config(_) => ErrorCode::InvalidConfig,
            ParamwallError::Closed => ErrorCode::Closed,
        }
    }

    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        ParamwallError::Syntax(msg.into())
    }

    /// Check `len` against `max`.
    pub fn check_limit(what: &'static str, len: usize, max: usize) -> Result<()> {
        if len > max {
            return Err(ParamwallError::LimitExceeded { what, len, max });
        }
        Ok(())
    }
}
