//! backtrace-core
//!
//! Core library for turning firmware crash output into source locations.
//!
//! This crate defines how addresses are pulled out of pasted `Backtrace:` and
//! `Stack memory:` dumps, the decoder configuration, the `SymbolResolver`
//! capability with its external-tool and in-process DWARF implementations,
//! and the interactive session loop that ties them together.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends.

pub mod config;
pub mod input;
pub mod services;
pub mod session;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
