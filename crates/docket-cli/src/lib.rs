//! Docket CLI library.
//!
//! Command-line front end for the case reasoning workflow: argument parsing,
//! configuration, command execution against a SQLite-backed engine, and
//! output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::Session;
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
