//! Sondear: command-line front end for the Sonda harness
//!
//! Parses arguments, wires a browser session to the scenario runner, and
//! renders run reports as text or JSON. The heavy lifting lives in the
//! `sonda` crate; this one owns flags, exit codes, and terminal output.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod commands;
mod config;
mod error;
mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, FormatArg, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{render_report, OutputFormat, Reporter};
