//! Bounded polling against the live page.
//!
//! A probe replaces the fixed-duration sleep: it checks a condition
//! immediately, then re-checks on a poll interval until the condition holds
//! or the budget runs out. Absence is an answer, not an error: on timeout
//! the probe reports `found: false` and the caller decides what that means.
//! Only session-level failures propagate as errors.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::result::SondaResult;
use crate::session::Session;
use crate::step::Expectation;

/// Default probe budget in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// What a probe observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Whether the condition held before the budget ran out
    pub found: bool,
    /// Last value observed (evaluate probes only)
    pub value: Option<Value>,
    /// Wall time spent probing
    pub elapsed: Duration,
    /// Number of checks performed
    pub attempts: u32,
}

impl ProbeResult {
    fn hit(value: Option<Value>, elapsed: Duration, attempts: u32) -> Self {
        Self {
            found: true,
            value,
            elapsed,
            attempts,
        }
    }

    fn miss(value: Option<Value>, elapsed: Duration, attempts: u32) -> Self {
        Self {
            found: false,
            value,
            elapsed,
            attempts,
        }
    }
}

/// A single named check with an explicit timeout and poll interval.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use sonda::probe::Probe;
/// use sonda::session::MockSession;
///
/// let mut session = MockSession::new().with_selector_after("#toast", 2);
/// let probe = Probe::new()
///     .with_timeout(Duration::from_secs(1))
///     .with_poll_interval(Duration::from_millis(10));
///
/// let result = probe.selector(&mut session, "#toast").await.unwrap();
/// assert!(result.found);
/// assert_eq!(result.attempts, 3);
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe {
    /// Probe with the default budget and interval
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the total budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Total budget
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll until a selector matches.
    ///
    /// The first check runs immediately; a condition already true returns
    /// with no forced delay. Sleeps are clamped so the probe never blocks
    /// past its budget.
    pub async fn selector<S: Session + ?Sized>(
        &self,
        session: &mut S,
        selector: &str,
    ) -> SondaResult<ProbeResult> {
        let start = Instant::now();
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            if session.selector_exists(selector).await? {
                tracing::trace!(selector, attempts, "selector probe hit");
                return Ok(ProbeResult::hit(None, start.elapsed(), attempts));
            }
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                tracing::debug!(selector, attempts, "selector probe exhausted its budget");
                return Ok(ProbeResult::miss(None, start.elapsed(), attempts));
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    /// Poll an evaluated expression until it satisfies an expectation.
    ///
    /// The last observed value is reported either way, so a miss can say
    /// what the page actually returned.
    pub async fn eval<S: Session + ?Sized>(
        &self,
        session: &mut S,
        expression: &str,
        expect: &Expectation,
    ) -> SondaResult<ProbeResult> {
        let start = Instant::now();
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let value = session.evaluate(expression).await?;
            if expect.check(&value) {
                tracing::trace!(expression, attempts, "evaluate probe hit");
                return Ok(ProbeResult::hit(Some(value), start.elapsed(), attempts));
            }
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                tracing::debug!(expression, attempts, "evaluate probe exhausted its budget");
                return Ok(ProbeResult::miss(Some(value), start.elapsed(), attempts));
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}
