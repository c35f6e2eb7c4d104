//! Run reports: per-step outcomes rolled up into one immutable record.
//!
//! A [`RunReport`] is produced once, after the last step has been decided and
//! the console buffer drained. Status derivation is a pure function of the
//! collected outcomes, so the same inputs always yield the same verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::console::DiagnosticEntry;

// ============================================================================
// Step outcomes
// ============================================================================

/// Terminal state of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step ran and its check held.
    Passed,
    /// The step ran and errored or its check did not hold.
    Failed,
    /// The step never ran, or a tolerated probe came up empty.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "pass"),
            Self::Failed => write!(f, "fail"),
            Self::Skipped => write!(f, "skip"),
        }
    }
}

/// What happened to one step of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Zero-based position within the scenario.
    pub index: usize,
    /// The step's human description.
    pub description: String,
    /// Terminal state.
    pub status: StepStatus,
    /// Failure detail or skip reason, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Wall-clock time the step consumed. Zero for steps that never ran.
    pub duration_ms: u64,
}

impl StepOutcome {
    /// A step that ran to completion with its check holding.
    #[must_use]
    pub fn passed(index: usize, description: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            index,
            description: description.into(),
            status: StepStatus::Passed,
            note: None,
            duration_ms: as_millis(elapsed),
        }
    }

    /// A step that ran and failed, with the reason.
    #[must_use]
    pub fn failed(
        index: usize,
        description: impl Into<String>,
        note: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            description: description.into(),
            status: StepStatus::Failed,
            note: Some(note.into()),
            duration_ms: as_millis(elapsed),
        }
    }

    /// A step that was skipped, with the reason it never got a verdict.
    #[must_use]
    pub fn skipped(index: usize, description: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            index,
            description: description.into(),
            status: StepStatus::Skipped,
            note: Some(note.into()),
            duration_ms: 0,
        }
    }
}

// ============================================================================
// Run report
// ============================================================================

/// Overall verdict for one scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every step that ran passed and the console stayed clean.
    Passed,
    /// At least one step failed, an error reached the console, or the run
    /// was cut short.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The immutable record of one scenario run.
///
/// Built exactly once by [`RunReport::finalize`]; everything a caller needs
/// afterwards is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identity of this run.
    pub run_id: Uuid,
    /// Identifier of the scenario that ran.
    pub scenario: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total wall-clock time of the run.
    pub duration_ms: u64,
    /// Overall verdict.
    pub status: RunStatus,
    /// One outcome per scenario step, in scenario order.
    pub steps: Vec<StepOutcome>,
    /// Everything the page wrote to its console during the run.
    pub diagnostics: Vec<DiagnosticEntry>,
    /// Run-level error, set when the run could not finish normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Derive the overall verdict from what was observed.
///
/// Failure wins whenever any step failed, any console entry carries error
/// severity, or a run-level error was recorded. A run where every executed
/// step was skipped or passed, with a clean console, passes.
#[must_use]
pub fn derive_status(
    steps: &[StepOutcome],
    diagnostics: &[DiagnosticEntry],
    error: Option<&str>,
) -> RunStatus {
    let any_step_failed = steps.iter().any(|s| s.status == StepStatus::Failed);
    let any_console_error = diagnostics.iter().any(|d| d.severity.is_error());
    if any_step_failed || any_console_error || error.is_some() {
        RunStatus::Failed
    } else {
        RunStatus::Passed
    }
}

impl RunReport {
    /// Seal the collected outcomes into a report.
    #[must_use]
    pub fn finalize(
        scenario: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        steps: Vec<StepOutcome>,
        diagnostics: Vec<DiagnosticEntry>,
        error: Option<String>,
    ) -> Self {
        let status = derive_status(&steps, &diagnostics, error.as_deref());
        Self {
            run_id: Uuid::new_v4(),
            scenario: scenario.into(),
            started_at,
            duration_ms: as_millis(elapsed),
            status,
            steps,
            diagnostics,
            error,
        }
    }

    /// Whether the run passed overall.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == RunStatus::Passed
    }

    /// Number of steps with the given status.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Number of console entries with error severity.
    #[must_use]
    pub fn console_error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// One-line tally, e.g. `12 passed, 1 failed, 2 skipped`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped",
            self.count(StepStatus::Passed),
            self.count(StepStatus::Failed),
            self.count(StepStatus::Skipped),
        )
    }

    /// Plain-text rendering for terminals and logs.
    #[must_use]
    pub fn render_text(&self) -> String {
        use fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "scenario: {}", self.scenario);
        let _ = writeln!(
            out,
            "run:      {} ({})",
            self.run_id,
            self.started_at.to_rfc3339()
        );
        let _ = writeln!(
            out,
            "status:   {} in {}ms ({})",
            self.status,
            self.duration_ms,
            self.summary()
        );
        let _ = writeln!(out);

        for step in &self.steps {
            let _ = writeln!(
                out,
                "  {:>3}. {}  {} ({}ms)",
                step.index + 1,
                step.status,
                step.description,
                step.duration_ms
            );
            if let Some(note) = &step.note {
                let _ = writeln!(out, "          {note}");
            }
        }

        if !self.diagnostics.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "console: {} entries ({} errors)",
                self.diagnostics.len(),
                self.console_error_count()
            );
            for entry in &self.diagnostics {
                let _ = writeln!(out, "  [{}] {}", entry.severity, entry.message);
            }
        }

        if let Some(error) = &self.error {
            let _ = writeln!(out);
            let _ = writeln!(out, "error: {error}");
        }

        out
    }

    /// Pretty-printed JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn as_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
