//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sondear: CLI for Sonda - deterministic browser-driven UI smoke checks
#[derive(Parser, Debug)]
#[command(name = "sondear")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against a target deployment
    Run(RunArgs),

    /// List the built-in scenarios
    List,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario identifiers to run (default: all)
    #[arg(value_name = "SCENARIO")]
    pub scenarios: Vec<String>,

    /// Base URL of the deployment under check
    #[arg(long, default_value = sonda::DEFAULT_BASE_URL, env = "SONDA_BASE_URL")]
    pub base_url: String,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,

    /// Overall run deadline in milliseconds
    #[arg(long, default_value_t = sonda::DEFAULT_DEADLINE_MS)]
    pub deadline: u64,

    /// Probe timeout in milliseconds for condition checks
    #[arg(long, default_value_t = sonda::DEFAULT_TIMEOUT_MS)]
    pub probe_timeout: u64,

    /// Probe poll interval in milliseconds
    #[arg(long, default_value_t = sonda::DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval: u64,

    /// Run with a visible browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the chromium executable
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium: Option<PathBuf>,

    /// Disable the browser sandbox (needed in some containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Directory for JSON report files (one per scenario)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output for CI integration
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;
        use clap::CommandFactory;

        #[test]
        fn test_command_definition_is_consistent() {
            Cli::command().debug_assert();
        }

        #[test]
        fn test_parse_run_command() {
            let cli = Cli::parse_from(["sondear", "run"]);
            assert!(matches!(cli.command, Commands::Run(_)));
        }

        #[test]
        fn test_parse_run_with_scenarios() {
            let cli = Cli::parse_from(["sondear", "run", "smoke", "pwa"]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.scenarios, vec!["smoke", "pwa"]);
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_with_base_url() {
            let cli = Cli::parse_from(["sondear", "run", "--base-url", "http://localhost:9000"]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.base_url, "http://localhost:9000");
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_with_format() {
            let cli = Cli::parse_from(["sondear", "run", "--format", "json"]);
            if let Commands::Run(args) = cli.command {
                assert!(matches!(args.format, FormatArg::Json));
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["sondear", "run"]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.base_url, sonda::DEFAULT_BASE_URL);
                assert_eq!(args.deadline, sonda::DEFAULT_DEADLINE_MS);
                assert_eq!(args.probe_timeout, sonda::DEFAULT_TIMEOUT_MS);
                assert!(!args.headed);
                assert!(args.output.is_none());
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_headed_and_no_sandbox() {
            let cli = Cli::parse_from(["sondear", "run", "--headed", "--no-sandbox"]);
            if let Commands::Run(args) = cli.command {
                assert!(args.headed);
                assert!(args.no_sandbox);
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_list_command() {
            let cli = Cli::parse_from(["sondear", "list"]);
            assert!(matches!(cli.command, Commands::List));
        }

        #[test]
        fn test_global_verbose_flag() {
            let cli = Cli::parse_from(["sondear", "-vvv", "run"]);
            assert_eq!(cli.verbose, 3);
        }

        #[test]
        fn test_global_quiet_flag() {
            let cli = Cli::parse_from(["sondear", "-q", "list"]);
            assert!(cli.quiet);
        }

        #[test]
        fn test_global_color_flag() {
            let cli = Cli::parse_from(["sondear", "--color", "never", "run"]);
            assert!(matches!(cli.color, ColorArg::Never));
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_arg_default() {
            assert!(matches!(FormatArg::default(), FormatArg::Text));
        }

        #[test]
        fn test_format_arg_conversion() {
            use crate::output::OutputFormat;

            let text: OutputFormat = FormatArg::Text.into();
            assert!(matches!(text, OutputFormat::Text));

            let json: OutputFormat = FormatArg::Json.into();
            assert!(matches!(json, OutputFormat::Json));
        }

        #[test]
        fn test_color_arg_conversion() {
            use crate::config::ColorChoice;

            let auto: ColorChoice = ColorArg::Auto.into();
            assert!(matches!(auto, ColorChoice::Auto));

            let always: ColorChoice = ColorArg::Always.into();
            assert!(matches!(always, ColorChoice::Always));

            let never: ColorChoice = ColorArg::Never.into();
            assert!(matches!(never, ColorChoice::Never));
        }
    }
}
