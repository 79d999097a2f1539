//! subq-cli library
//!
//! Provides the argument definitions, layered configuration and command
//! execution behind the `subq` binary for programmatic use.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{parse_args, parse_args_from, Cli, Commands, EnumerateSource};
pub use commands::{execute, load_registry, write_output, Output};
pub use config::{validate_config, Config};
