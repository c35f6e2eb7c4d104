//! Result and error types for the harness.

use thiserror::Error;

/// Result type for harness operations
pub type SondaResult<T> = Result<T, SondaError>;

/// Errors that can occur while driving a scenario.
///
/// The step runner reacts to the variant, not the message: probe timeouts and
/// action failures are recorded and the run continues, while launch and
/// session errors abort the scenario.
#[derive(Debug, Error)]
pub enum SondaError {
    /// Browser could not be launched
    #[error("Failed to launch browser: {message}. Install Chromium or set CHROMIUM_PATH")]
    Launch {
        /// Error message
        message: String,
    },

    /// Browser session crashed or the connection was lost
    #[error("Browser session lost: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Click, fill or evaluate failed against the live page
    #[error("Action failed: {message}")]
    Action {
        /// Error message
        message: String,
    },

    /// A probed condition stayed unsatisfied for the whole budget
    #[error("Condition not satisfied within {ms}ms: {what}")]
    ProbeTimeout {
        /// The condition that was being probed
        what: String,
        /// Probe budget in milliseconds
        ms: u64,
    },

    /// The overall scenario deadline expired
    #[error("Scenario deadline of {ms}ms exceeded")]
    Deadline {
        /// Deadline in milliseconds
        ms: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SondaError {
    /// Launch failure with a message
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch {
            message: message.into(),
        }
    }

    /// Session loss with a message
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Navigation failure for a URL
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Action failure with a message
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: message.into(),
        }
    }

    /// Probe timeout for a named condition
    pub fn probe_timeout(what: impl Into<String>, ms: u64) -> Self {
        Self::ProbeTimeout {
            what: what.into(),
            ms,
        }
    }

    /// True for errors that abort the whole scenario rather than one step.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::Session { .. })
    }

    /// True for a probe that ran out of budget.
    #[must_use]
    pub const fn is_probe_timeout(&self) -> bool {
        matches!(self, Self::ProbeTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    mod display_tests {
        use super::*;

        #[test]
        fn launch_mentions_chromium_path() {
            let err = SondaError::launch("no executable");
            assert!(err.to_string().contains("CHROMIUM_PATH"));
        }

        #[test]
        fn navigation_includes_url_and_message() {
            let err = SondaError::navigation("http://localhost:8000/", "connection refused");
            let text = err.to_string();
            assert!(text.contains("http://localhost:8000/"));
            assert!(text.contains("connection refused"));
        }

        #[test]
        fn probe_timeout_includes_budget() {
            let err = SondaError::probe_timeout("selector \"#github-token\"", 5000);
            let text = err.to_string();
            assert!(text.contains("5000ms"));
            assert!(text.contains("#github-token"));
        }
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn launch_and_session_are_fatal() {
            assert!(SondaError::launch("x").is_fatal());
            assert!(SondaError::session("x").is_fatal());
        }

        #[test]
        fn step_level_errors_are_not_fatal() {
            assert!(!SondaError::action("x").is_fatal());
            assert!(!SondaError::probe_timeout("x", 100).is_fatal());
            assert!(!SondaError::navigation("u", "m").is_fatal());
        }

        #[test]
        fn probe_timeout_is_recognized() {
            assert!(SondaError::probe_timeout("x", 1).is_probe_timeout());
            assert!(!SondaError::action("x").is_probe_timeout());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn io_error_converts() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
            let err: SondaError = io.into();
            assert!(matches!(err, SondaError::Io(_)));
        }

        #[test]
        fn json_error_converts() {
            let bad = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
            let err: SondaError = bad.into();
            assert!(matches!(err, SondaError::Json(_)));
        }
    }
}
