//! Steward CLI library
//!
//! Argument parsing and the command implementations behind the `steward`
//! binary. Each command opens the vault, resolves configuration once, and
//! runs a control loop until Ctrl-C.

pub mod cli;
pub mod commands;
