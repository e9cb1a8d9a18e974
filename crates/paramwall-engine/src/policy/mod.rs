//! Policy layer (compiled rule sets and the validation engine).
//!
//! Compiles parsed rules into indexed, bitmask-annotated lookup structures
//! and serves validate / normalize / filter over them.

pub mod builder;
pub mod compiled;
pub mod engine;

pub use builder::EngineBuilder;
pub use compiled::{CompiledRuleSet, ParamMasks, RequestScope, UrlRule};
pub use engine::Engine;
