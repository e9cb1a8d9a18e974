//! paramwall core: rule grammar, parameter bitsets, URL pattern matching and
//! the constraint-plugin interface.
//!
//! This crate holds the pieces that have no locking or runtime policy of
//! their own. The engine crate composes them into a compiled, swappable
//! rule set.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed rule
//! sources surface as [`ParamwallError`]; malformed request input is never an
//! error at all.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod bitset;
pub mod error;
pub mod grammar;
pub mod index;
pub mod limits;
pub mod pattern;
pub mod plugin;
pub mod query;
pub mod rule;

/// Shared result type.
pub use error::{ErrorCode, ParamwallError, Result};
