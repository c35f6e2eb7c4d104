//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario execution error
    #[error("Run failed: {message}")]
    Run {
        /// Error message
        message: String,
    },

    /// Report rendering or writing error
    #[error("Report output failed: {message}")]
    Report {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sonda harness error
    #[error("Harness error: {0}")]
    Sonda(#[from] sonda::SondaError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a run error
    #[must_use]
    pub fn run(message: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
        }
    }

    /// Create a report error
    #[must_use]
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_context() {
        let error = CliError::invalid_argument("unknown scenario \"bogus\"");
        assert_eq!(
            error.to_string(),
            "Invalid argument: unknown scenario \"bogus\""
        );

        let error = CliError::run("2 of 3 scenario runs failed");
        assert_eq!(error.to_string(), "Run failed: 2 of 3 scenario runs failed");
    }

    #[test]
    fn harness_errors_convert() {
        let error: CliError = sonda::SondaError::session("connection dropped").into();
        assert!(error.to_string().starts_with("Harness error:"));
    }
}
