//! paramwall engine library entry.
//!
//! Wires the core grammar, index and matcher into a compiled, atomically
//! swapped rule set, adds the built-in constraint plugins and the YAML
//! config loader. Consumed by the `paramwall` binary and by integration
//! tests.

pub mod config;
pub mod plugins;
pub mod policy;

pub use policy::{CompiledRuleSet, Engine, EngineBuilder, ParamMasks};
