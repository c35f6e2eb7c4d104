//! Scenario execution: one session, strictly ordered steps, one report.
//!
//! The runner owns the session for the whole run and closes it on every exit
//! path. Steps execute in declaration order; a failed step is recorded and
//! the run moves on, unless the step was a precondition or the session itself
//! is gone, in which case the remaining steps are skipped instead of being
//! attempted against an unknown page state.

use chrono::Utc;
use std::time::{Duration, Instant};

use crate::console::ConsoleCollector;
use crate::probe::Probe;
use crate::report::{RunReport, StepOutcome};
use crate::result::{SondaError, SondaResult};
use crate::scenario::{Scenario, StepSpec};
use crate::session::Session;
use crate::step::Step;

// ============================================================================
// Configuration
// ============================================================================

/// Default overall deadline for one scenario run, in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 60_000;

/// Timing policy for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    deadline: Duration,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerConfig {
    /// Sixty-second deadline, five-second expression probes, 100ms polling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
            probe_timeout: Duration::from_millis(crate::probe::DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(crate::probe::DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Overall wall-clock budget for the whole run
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Budget for expression probes, which carry no per-step timeout
    #[must_use]
    pub const fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Poll interval shared by every probe in the run
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The configured overall deadline
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The configured expression-probe budget
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// The configured poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Why the rest of a scenario is being skipped.
#[derive(Debug, Clone)]
enum SkipReason {
    Precondition(String),
    SessionLost,
    Deadline,
}

impl SkipReason {
    fn note(&self) -> String {
        match self {
            Self::Precondition(description) => format!("precondition \"{description}\" failed"),
            Self::SessionLost => "session lost".to_string(),
            Self::Deadline => "overall deadline exceeded".to_string(),
        }
    }
}

/// How one executed step turned out, short of an error.
#[derive(Debug)]
enum StepVerdict {
    Passed,
    /// A tolerated probe came up empty; the note says what was not seen.
    Tolerated(String),
}

/// Drives one scenario against one session and produces its report.
///
/// ```
/// use sonda::{MockSession, RunnerConfig, Scenario, ScenarioRunner, Step};
/// use std::time::Duration;
///
/// # async fn demo() {
/// let session = MockSession::new().with_selector("#app");
/// let scenario = Scenario::new("demo")
///     .precondition("load the app", Step::Navigate { url: "http://localhost:8000/".into() })
///     .step("app root renders", Step::WaitForSelector { selector: "#app".into(), timeout_ms: 1_000 });
///
/// let runner = ScenarioRunner::with_config(
///     session,
///     RunnerConfig::new().with_deadline(Duration::from_secs(10)),
/// );
/// let report = runner.run(&scenario).await;
/// assert!(report.is_passed());
/// # }
/// ```
#[derive(Debug)]
pub struct ScenarioRunner<S: Session> {
    session: S,
    config: RunnerConfig,
}

impl<S: Session> ScenarioRunner<S> {
    /// Runner with default timing.
    pub fn new(session: S) -> Self {
        Self::with_config(session, RunnerConfig::default())
    }

    /// Runner with explicit timing.
    pub fn with_config(session: S, config: RunnerConfig) -> Self {
        Self { session, config }
    }

    /// Execute every step in order and seal the outcome into a report.
    ///
    /// Consumes the runner: the session is closed before this returns, on
    /// every path, including deadline expiry and session loss.
    pub async fn run(mut self, scenario: &Scenario) -> RunReport {
        let started_at = Utc::now();
        let started = Instant::now();
        tracing::info!(
            scenario = scenario.id(),
            steps = scenario.len(),
            "starting scenario run"
        );

        let collector = match ConsoleCollector::start(&mut self.session).await {
            Ok(collector) => Some(collector),
            Err(error) => {
                tracing::warn!(%error, "console collection unavailable for this run");
                None
            }
        };

        let mut outcomes: Vec<StepOutcome> = Vec::with_capacity(scenario.len());
        let mut top_error: Option<String> = None;
        let mut skip_rest: Option<SkipReason> = None;

        for (index, spec) in scenario.steps().iter().enumerate() {
            if let Some(reason) = &skip_rest {
                outcomes.push(StepOutcome::skipped(index, spec.description(), reason.note()));
                continue;
            }

            let remaining = self.config.deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                let reason = SkipReason::Deadline;
                top_error.get_or_insert_with(|| deadline_error(self.config.deadline));
                outcomes.push(StepOutcome::skipped(index, spec.description(), reason.note()));
                skip_rest = Some(reason);
                continue;
            }

            let step_started = Instant::now();
            match tokio::time::timeout(remaining, self.execute(spec)).await {
                Err(_elapsed) => {
                    tracing::warn!(
                        step = spec.description(),
                        "overall deadline expired mid-step"
                    );
                    let reason = SkipReason::Deadline;
                    top_error.get_or_insert_with(|| deadline_error(self.config.deadline));
                    outcomes.push(StepOutcome::skipped(index, spec.description(), reason.note()));
                    skip_rest = Some(reason);
                }
                Ok(Ok(StepVerdict::Passed)) => {
                    tracing::debug!(step = spec.description(), "step passed");
                    outcomes.push(StepOutcome::passed(
                        index,
                        spec.description(),
                        step_started.elapsed(),
                    ));
                }
                Ok(Ok(StepVerdict::Tolerated(note))) => {
                    tracing::debug!(step = spec.description(), note, "tolerated absence");
                    outcomes.push(StepOutcome::skipped(index, spec.description(), note));
                }
                Ok(Err(error)) => {
                    tracing::warn!(step = spec.description(), %error, "step failed");
                    let note = error.to_string();
                    // Probe timeouts prove the session answered; anything else
                    // gets a liveness check before the run continues.
                    let session_lost = error.is_fatal()
                        || (!error.is_probe_timeout() && !self.session.is_alive().await);
                    outcomes.push(StepOutcome::failed(
                        index,
                        spec.description(),
                        &note,
                        step_started.elapsed(),
                    ));
                    if session_lost {
                        top_error.get_or_insert_with(|| format!("session lost: {note}"));
                        skip_rest = Some(SkipReason::SessionLost);
                    } else if spec.is_precondition() {
                        skip_rest = Some(SkipReason::Precondition(spec.description().to_string()));
                    }
                }
            }
        }

        let diagnostics = match collector {
            Some(collector) => match collector.stop(&mut self.session).await {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(%error, "console drain failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if let Err(error) = self.session.close().await {
            tracing::warn!(%error, "session close reported an error");
        }

        let report = RunReport::finalize(
            scenario.id(),
            started_at,
            started.elapsed(),
            outcomes,
            diagnostics,
            top_error,
        );
        tracing::info!(
            scenario = scenario.id(),
            status = %report.status,
            summary = report.summary(),
            "scenario run finished"
        );
        report
    }

    async fn execute(&mut self, spec: &StepSpec) -> SondaResult<StepVerdict> {
        match spec.action() {
            Step::Navigate { url } => {
                self.session.navigate(url).await?;
                Ok(StepVerdict::Passed)
            }
            Step::Click { selector } => {
                self.session.click(selector).await?;
                Ok(StepVerdict::Passed)
            }
            Step::Fill { selector, value } => {
                self.session.fill(selector, value).await?;
                Ok(StepVerdict::Passed)
            }
            Step::WaitForSelector {
                selector,
                timeout_ms,
            } => {
                let probe = Probe::new()
                    .with_timeout(Duration::from_millis(*timeout_ms))
                    .with_poll_interval(self.config.poll_interval);
                let result = probe.selector(&mut self.session, selector).await?;
                if result.found {
                    Ok(StepVerdict::Passed)
                } else if spec.is_tolerant() {
                    Ok(StepVerdict::Tolerated(format!(
                        "selector {selector} not seen within {timeout_ms}ms"
                    )))
                } else {
                    Err(SondaError::probe_timeout(
                        format!("selector {selector}"),
                        *timeout_ms,
                    ))
                }
            }
            Step::Evaluate { expression, expect } => {
                let probe = Probe::new()
                    .with_timeout(self.config.probe_timeout)
                    .with_poll_interval(self.config.poll_interval);
                let result = probe.eval(&mut self.session, expression, expect).await?;
                if result.found {
                    Ok(StepVerdict::Passed)
                } else {
                    let last = result
                        .value
                        .map_or_else(|| "nothing".to_string(), |value| value.to_string());
                    let what = format!("value that {expect} (last value: {last})");
                    if spec.is_tolerant() {
                        Ok(StepVerdict::Tolerated(format!(
                            "condition not met within {}ms: {what}",
                            millis(self.config.probe_timeout)
                        )))
                    } else {
                        Err(SondaError::probe_timeout(
                            what,
                            millis(self.config.probe_timeout),
                        ))
                    }
                }
            }
            Step::Resize { width, height } => {
                self.session.set_viewport(*width, *height).await?;
                Ok(StepVerdict::Passed)
            }
            Step::Settle { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(StepVerdict::Passed)
            }
        }
    }
}

fn deadline_error(deadline: Duration) -> String {
    format!("overall deadline of {}ms exceeded", millis(deadline))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
