//! Vitrine CLI library
//!
//! Flag parsing, configuration, last-failed bookkeeping and console output
//! for the `vitrine` binary.

#![allow(clippy::missing_errors_doc)]

mod cache;
mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use cache::{LastFailedCache, CACHE_DIR};
pub use commands::{BrowserArg, Cli, ColorArg};
pub use config::{Backend, CliConfig, ColorChoice, TracebackStyle, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{RunArtifacts, TestRunner};
