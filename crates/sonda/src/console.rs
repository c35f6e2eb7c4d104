//! Console/error collection.
//!
//! A scenario run passively subscribes to the page's console and exception
//! streams. Entries are buffered by the session for the whole run (unbounded;
//! a run is short-lived) and classified by severity. Any `error`-severity
//! entry marks the run as failed even when every step passed: a UI that
//! functions but logs an internal fault is still a regression.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::SondaResult;
use crate::session::Session;

/// Severity of a diagnostic entry, following the channel's own tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Console error or thrown page exception
    Error,
    /// Console warning
    Warning,
    /// Everything else the page logs
    Info,
}

impl Severity {
    /// Check if this severity marks a regression
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One message captured from the page's diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    /// Classified severity
    pub severity: Severity,
    /// Message text as emitted by the page
    pub message: String,
    /// Harness-side receipt time
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEntry {
    /// Create an entry stamped with the current time
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Error entry
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Warning entry
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Info entry
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

/// Windows the session's diagnostic buffer to one scenario run.
///
/// `start` drains whatever the page logged before the run began (page-load
/// noise belongs to the run only once the run has begun); `stop` drains the
/// entries emitted inside the window and hands them to the report.
#[derive(Debug)]
pub struct ConsoleCollector {
    discarded: usize,
}

impl ConsoleCollector {
    /// Begin a collection window, discarding anything already buffered.
    pub async fn start<S: Session + ?Sized>(session: &mut S) -> SondaResult<Self> {
        let stale = session.take_diagnostics().await?;
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "discarded pre-run console entries");
        }
        Ok(Self {
            discarded: stale.len(),
        })
    }

    /// End the window and take every entry emitted during it.
    pub async fn stop<S: Session + ?Sized>(
        self,
        session: &mut S,
    ) -> SondaResult<Vec<DiagnosticEntry>> {
        session.take_diagnostics().await
    }

    /// Number of pre-run entries `start` threw away
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::session::MockSession;

    mod severity_tests {
        use super::*;

        #[test]
        fn only_error_is_a_regression() {
            assert!(Severity::Error.is_error());
            assert!(!Severity::Warning.is_error());
            assert!(!Severity::Info.is_error());
        }

        #[test]
        fn serializes_lowercase() {
            let json = serde_json::to_string(&Severity::Warning).unwrap();
            assert_eq!(json, "\"warning\"");
        }

        #[test]
        fn display_matches_wire_form() {
            assert_eq!(Severity::Error.to_string(), "error");
            assert_eq!(Severity::Info.to_string(), "info");
        }
    }

    mod entry_tests {
        use super::*;

        #[test]
        fn constructors_set_severity() {
            assert_eq!(DiagnosticEntry::error("boom").severity, Severity::Error);
            assert_eq!(DiagnosticEntry::warning("hm").severity, Severity::Warning);
            assert_eq!(DiagnosticEntry::info("ok").severity, Severity::Info);
        }

        #[test]
        fn message_is_kept_verbatim() {
            let entry = DiagnosticEntry::error("Uncaught TypeError: x is null");
            assert_eq!(entry.message, "Uncaught TypeError: x is null");
        }
    }

    mod collector_tests {
        use super::*;

        #[tokio::test]
        async fn start_discards_preexisting_entries() {
            let mut session = MockSession::new();
            session.push_diagnostic(DiagnosticEntry::info("boot noise")).await;

            let collector = ConsoleCollector::start(&mut session).await.unwrap();
            assert_eq!(collector.discarded(), 1);

            let entries = collector.stop(&mut session).await.unwrap();
            assert!(entries.is_empty());
        }

        #[tokio::test]
        async fn stop_returns_entries_emitted_inside_the_window() {
            let mut session = MockSession::new();
            let collector = ConsoleCollector::start(&mut session).await.unwrap();

            session.push_diagnostic(DiagnosticEntry::error("mid-run fault")).await;
            session.push_diagnostic(DiagnosticEntry::info("mid-run log")).await;

            let entries = collector.stop(&mut session).await.unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].severity, Severity::Error);
            assert_eq!(entries[1].severity, Severity::Info);
        }

        #[tokio::test]
        async fn windows_do_not_overlap() {
            let mut session = MockSession::new();

            let first = ConsoleCollector::start(&mut session).await.unwrap();
            session.push_diagnostic(DiagnosticEntry::info("first window")).await;
            let first_entries = first.stop(&mut session).await.unwrap();

            let second = ConsoleCollector::start(&mut session).await.unwrap();
            let second_entries = second.stop(&mut session).await.unwrap();

            assert_eq!(first_entries.len(), 1);
            assert!(second_entries.is_empty());
        }
    }
}
