//! Tracing subscriber setup

use crate::config::Verbosity;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the verbosity flags pick the filter.
/// Log lines go to stderr so stdout stays clean for report output.
pub fn init_logging(verbosity: Verbosity) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // try_init: a second call in the same process is a no-op, not a panic
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Default filter directive for a verbosity level
fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
        Verbosity::Debug => "info,sonda=debug,sondear=debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_mapping() {
        assert_eq!(default_filter(Verbosity::Quiet), "error");
        assert_eq!(default_filter(Verbosity::Normal), "warn");
        assert_eq!(default_filter(Verbosity::Verbose), "info");
        assert!(default_filter(Verbosity::Debug).contains("sonda=debug"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging(Verbosity::Normal);
        // Second call must not panic even though the global subscriber is set
        init_logging(Verbosity::Debug);
    }

    #[test]
    fn test_env_filter_fallback() {
        for verbosity in [Verbosity::Quiet, Verbosity::Verbose, Verbosity::Debug] {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
            drop(filter);
        }
    }
}
