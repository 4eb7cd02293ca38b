//! Command-line interface
//!
//! Command handlers live in [`commands`]; the binary in `main.rs` only parses
//! arguments, installs logging and dispatches.

pub mod commands;
pub mod error;
pub mod flags;
