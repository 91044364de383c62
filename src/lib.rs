//! pair-arcade: code-based partner pairing for two-player sessions.
//!
//! The binary is a thin CLI over [`bootstrap`], which loads config, wires
//! the chosen backend and hands out the `pa-app` use cases.

pub mod bootstrap;
pub mod cli;

pub use cli::{run, Cli};
