//! Sonda: deterministic browser-driven UI assertion harness
//!
//! Sonda drives a real Chromium page through ordered scenario steps and
//! turns what it saw into one immutable report. Fixed sleeps are replaced by
//! bounded polling probes, per-test try/catch glue by a runner that records
//! one outcome per step, and print statements by a report that renders to
//! text or JSON after the fact.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Scenario     │──►│ ScenarioRun- │──►│ RunReport    │
//! │ (steps)      │   │ ner + Probes │   │ (+ console)  │
//! └──────────────┘   └──────┬───────┘   └──────────────┘
//!                           │ Session trait
//!                    ┌──────┴───────┐
//!                    │ CdpSession / │
//!                    │ MockSession  │
//!                    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sonda::{Expectation, MockSession, Scenario, ScenarioRunner, Step};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let session = MockSession::new()
//!     .with_selector("#app")
//!     .with_eval("document.title", json!("Inventory Management v1"));
//!
//! let scenario = Scenario::new("example")
//!     .precondition("load the app", Step::Navigate {
//!         url: "http://localhost:8000/".into(),
//!     })
//!     .step("root renders", Step::WaitForSelector {
//!         selector: "#app".into(),
//!         timeout_ms: 1_000,
//!     })
//!     .step("title names the product", Step::Evaluate {
//!         expression: "document.title".into(),
//!         expect: Expectation::Contains("Inventory Management".into()),
//!     });
//!
//! let report = ScenarioRunner::new(session).run(&scenario).await;
//! assert!(report.is_passed());
//! assert_eq!(report.summary(), "3 passed, 0 failed, 0 skipped");
//! # }
//! ```
//!
//! Against a live target, swap [`MockSession`] for [`browser::CdpSession`]
//! (behind the default `browser` feature) and feed the built-in scenarios
//! from [`scenarios`].

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod console;
pub mod probe;
pub mod report;
pub mod result;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod session;
pub mod step;

/// Chromium-backed [`Session`] over the DevTools protocol.
#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::CdpSession;
pub use console::{ConsoleCollector, DiagnosticEntry, Severity};
pub use probe::{Probe, ProbeResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
pub use report::{derive_status, RunReport, RunStatus, StepOutcome, StepStatus};
pub use result::{SondaError, SondaResult};
pub use runner::{RunnerConfig, ScenarioRunner, DEFAULT_DEADLINE_MS};
pub use scenario::{Scenario, StepSpec};
pub use scenarios::{Target, DEFAULT_BASE_URL};
pub use session::{
    MockSession, Session, SessionConfig, Viewport, DESKTOP_VIEWPORT, MOBILE_VIEWPORT,
};
pub use step::{Expectation, Step};
