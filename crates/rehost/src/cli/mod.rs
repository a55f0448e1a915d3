//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the rehost binary.

mod commands;
mod run;

pub use commands::{Cli, Commands, RunArgs};
pub use run::{cache_one, migrate, run_photos, run_repair};
