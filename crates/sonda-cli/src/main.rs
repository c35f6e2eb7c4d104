//! Sondear CLI: browser smoke checks from the terminal
//!
//! ## Usage
//!
//! ```bash
//! sondear run                        # Run every built-in scenario
//! sondear run smoke pwa              # Run a subset
//! sondear run --format json          # JSON report on stdout
//! sondear list                       # List built-in scenarios
//! ```

use clap::Parser;
use sonda::{scenarios, RunReport, Scenario, Target};
use sondear::{
    render_report, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, OutputFormat,
    Reporter, RunArgs, Verbosity,
};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    sondear::init_logging(config.verbosity);

    match cli.command {
        Commands::Run(args) => run_scenarios(&config, &args),
        Commands::List => {
            list_scenarios();
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_scenarios(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let target = Target::new(args.base_url.as_str());
    let selected = select_scenarios(&target, &args.scenarios)?;
    let format = OutputFormat::from(args.format);
    tracing::debug!(
        base_url = %target.base_url(),
        scenarios = selected.len(),
        deadline_ms = args.deadline,
        "run configured"
    );

    if let Some(ref dir) = args.output {
        std::fs::create_dir_all(dir)?;
    }

    let mut reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.info(&format!(
        "checking {} ({} scenarios)",
        target.base_url(),
        selected.len()
    ));

    let rt = tokio::runtime::Runtime::new()?;

    let started = Instant::now();
    let mut failed = 0usize;
    for scenario in &selected {
        reporter.scenario_started(scenario.id(), scenario.len());
        let report = rt.block_on(run_one(args, scenario))?;
        reporter.scenario_finished(&report);

        // The report body is the product and goes to stdout; everything the
        // reporter prints is stderr decoration.
        let rendered = render_report(&report, format)?;
        println!("{rendered}");

        if let Some(ref dir) = args.output {
            let path = dir.join(format!("{}.json", scenario.id()));
            let json = report.to_json().map_err(|e| CliError::report(e.to_string()))?;
            std::fs::write(&path, json)?;
            reporter.info(&format!("wrote {}", path.display()));
        }

        if !report.is_passed() {
            failed += 1;
        }
    }

    reporter.summary(selected.len() - failed, failed, started.elapsed());

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::run(format!(
            "{failed} of {} scenario runs failed",
            selected.len()
        )))
    }
}

/// Resolve requested identifiers, or every built-in scenario when none given.
fn select_scenarios(target: &Target, requested: &[String]) -> CliResult<Vec<Scenario>> {
    if requested.is_empty() {
        return Ok(scenarios::all(target));
    }

    requested
        .iter()
        .map(|id| {
            scenarios::by_id(target, id).ok_or_else(|| {
                CliError::invalid_argument(format!(
                    "unknown scenario \"{id}\" (built-in: {})",
                    scenarios::names().join(", ")
                ))
            })
        })
        .collect()
}

#[cfg(feature = "browser")]
async fn run_one(args: &RunArgs, scenario: &Scenario) -> CliResult<RunReport> {
    let session = sonda::CdpSession::launch(&session_config(args)).await?;
    let runner = sonda::ScenarioRunner::with_config(session, runner_config(args));
    Ok(runner.run(scenario).await)
}

#[cfg(not(feature = "browser"))]
async fn run_one(args: &RunArgs, scenario: &Scenario) -> CliResult<RunReport> {
    let _ = (args, scenario);
    Err(CliError::config(
        "built without browser support; rebuild with --features browser",
    ))
}

#[cfg(feature = "browser")]
fn session_config(args: &RunArgs) -> sonda::SessionConfig {
    let mut config = sonda::SessionConfig::default().with_headless(!args.headed);
    if args.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(ref path) = args.chromium {
        config = config.with_chromium_path(path.to_string_lossy());
    }
    config
}

#[cfg(feature = "browser")]
fn runner_config(args: &RunArgs) -> sonda::RunnerConfig {
    use std::time::Duration;

    sonda::RunnerConfig::new()
        .with_deadline(Duration::from_millis(args.deadline))
        .with_probe_timeout(Duration::from_millis(args.probe_timeout))
        .with_poll_interval(Duration::from_millis(args.poll_interval))
}

fn list_scenarios() {
    let target = Target::new(sonda::DEFAULT_BASE_URL);
    for scenario in scenarios::all(&target) {
        println!(
            "{:<20} {:>2} steps, {} preconditions",
            scenario.id(),
            scenario.len(),
            scenario.precondition_count()
        );
    }
}
