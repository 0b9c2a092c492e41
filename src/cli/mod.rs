//! CLI command handlers

pub mod commands;

pub use commands::{cmd_compile, cmd_deploy, compile_with_diagnostics, write_diagnostic, CliResult};
