//! Top-level facade crate for paramwall.
//!
//! Re-exports the core types and the engine so users can depend on a single crate.

pub mod core {
    pub use paramwall_core::*;
}

pub mod engine {
    pub use paramwall_engine::*;
}

pub use paramwall_engine::{Engine, EngineBuilder};
