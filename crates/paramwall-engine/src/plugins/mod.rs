//! Built-in constraint plugins.
//!
//! Each one claims a distinct body syntax:
//! - `range`: `1-100`, `-5..5`
//! - `compare`: `>10`, `<=3`, `!=0`
//! - `length`: `len:8`, `len:1-32`
//! - `glob`: `glob:img_*`, or any comma-free body with `*`
//! - `regex`: `regex:[a-z]+`, `/[a-z]+/`
//!
//! `compare` needs a digit after the operator, so `<none>` stays an enum
//! value. The slash form of `regex` needs a metacharacter, so `/home/` stays
//! a literal. A slash-form regex containing `*` is claimed by `glob` first;
//! write it as `regex:` instead.

use std::sync::Arc;

use serde::Deserialize;

use paramwall_core::plugin::ConstraintPlugin;

pub mod compare;
pub mod glob;
pub mod length;
pub mod range;
pub mod regexp;

pub use compare::ComparePlugin;
pub use glob::GlobPlugin;
pub use length::LengthPlugin;
pub use range::RangePlugin;
pub use regexp::RegexPlugin;

/// Selector for the built-in plugins, as named in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinPlugin {
    Range,
    Compare,
    Length,
    Glob,
    Regex,
}

impl BuiltinPlugin {
    /// Default registration order.
    pub const ALL: [BuiltinPlugin; 5] = [
        BuiltinPlugin::Range,
        BuiltinPlugin::Compare,
        BuiltinPlugin::Length,
        BuiltinPlugin::Glob,
        BuiltinPlugin::Regex,
    ];

    pub fn instantiate(self) -> Arc<dyn ConstraintPlugin> {
        match self {
            BuiltinPlugin::Range => Arc::new(RangePlugin),
            BuiltinPlugin::Compare => Arc::new(ComparePlugin),
            BuiltinPlugin::Length => Arc::new(LengthPlugin),
            BuiltinPlugin::Glob => Arc::new(GlobPlugin),
            BuiltinPlugin::Regex => Arc::new(RegexPlugin::default()),
        }
    }
}
