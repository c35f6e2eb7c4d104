//! Browser session abstraction.
//!
//! One [`Session`] is one logical browser context plus one page. The runner
//! drives every step through this trait, the probe polls through it, and the
//! console collector drains its diagnostic buffer. The real implementation
//! speaks CDP (see the `browser` module, behind the `browser` feature);
//! [`MockSession`] backs unit tests without launching anything.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::console::DiagnosticEntry;
use crate::result::{SondaError, SondaResult};

/// A viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Desktop viewport used unless a scenario resizes.
pub const DESKTOP_VIEWPORT: Viewport = Viewport {
    width: 1280,
    height: 720,
};

/// Viewport at the target app's mobile breakpoint.
pub const MOBILE_VIEWPORT: Viewport = Viewport {
    width: 375,
    height: 667,
};

/// Session launch configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Initial viewport
    pub viewport: Viewport,
    /// Path to a chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: DESKTOP_VIEWPORT,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl SessionConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the initial viewport
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Set the chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// The automation capability a scenario run drives.
///
/// Implementations own the page state; all methods are cheap single calls,
/// while waiting and retrying live in the probe. `take_diagnostics` must
/// keep working after the page is gone: the buffer is harness-side evidence.
#[async_trait]
pub trait Session: Send {
    /// Navigate the page to an absolute URL
    async fn navigate(&mut self, url: &str) -> SondaResult<()>;

    /// Click the first element matching a CSS selector
    async fn click(&mut self, selector: &str) -> SondaResult<()>;

    /// Replace the value of the first element matching a CSS selector,
    /// dispatching the input events the page listens for
    async fn fill(&mut self, selector: &str, value: &str) -> SondaResult<()>;

    /// Check (once, without waiting) whether a CSS selector matches
    async fn selector_exists(&mut self, selector: &str) -> SondaResult<bool>;

    /// Evaluate a script expression in page context; promises are awaited
    /// and the settled value is returned as JSON
    async fn evaluate(&mut self, expression: &str) -> SondaResult<Value>;

    /// Override the page viewport
    async fn set_viewport(&mut self, width: u32, height: u32) -> SondaResult<()>;

    /// Drain everything the page logged since the last drain
    async fn take_diagnostics(&mut self) -> SondaResult<Vec<DiagnosticEntry>>;

    /// Cheap health check used to tell a broken page from a dead browser
    async fn is_alive(&mut self) -> bool {
        self.evaluate("1 + 1").await.is_ok()
    }

    /// Close the session and release the browser
    async fn close(&mut self) -> SondaResult<()>;
}

// ============================================================================
// Mock session for unit testing
// ============================================================================

#[derive(Debug)]
struct MockState {
    /// Selector -> checks remaining until it reports present (0 = present now)
    selectors: HashMap<String, u32>,
    /// Expression -> scripted results; the last value repeats
    evals: HashMap<String, VecDeque<Value>>,
    /// Selectors whose click/fill is scripted to fail
    failing_selectors: HashSet<String>,
    diagnostics: Vec<DiagnosticEntry>,
    call_log: Vec<String>,
    alive: bool,
    /// Session calls that still succeed before the connection "drops"
    die_after: Option<u32>,
    close_count: u32,
    viewport: Viewport,
    last_url: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            selectors: HashMap::new(),
            evals: HashMap::new(),
            failing_selectors: HashSet::new(),
            diagnostics: Vec::new(),
            call_log: Vec::new(),
            alive: true,
            die_after: None,
            close_count: 0,
            viewport: DESKTOP_VIEWPORT,
            last_url: None,
        }
    }
}

impl MockState {
    /// Advance the scripted lifetime and fail if the connection is "gone".
    fn tick(&mut self) -> SondaResult<()> {
        match self.die_after {
            Some(0) => self.alive = false,
            Some(n) => self.die_after = Some(n - 1),
            None => {}
        }
        if self.alive {
            Ok(())
        } else {
            Err(SondaError::session("mock connection dropped"))
        }
    }
}

/// Scripted [`Session`] for unit tests.
///
/// State lives behind an [`Arc`], so a clone taken before handing the session
/// to a runner stays connected and can be inspected after the run:
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use sonda::session::{MockSession, Session};
///
/// let mut session = MockSession::new().with_selector("#github-token");
/// let handle = session.handle();
///
/// assert!(session.selector_exists("#github-token").await.unwrap());
/// assert!(handle.was_called("exists:#github-token").await);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    /// Create an empty scripted session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a selector as present from the first check
    #[must_use]
    pub fn with_selector(self, selector: impl Into<String>) -> Self {
        self.script(|state| {
            state.selectors.insert(selector.into(), 0);
        })
    }

    /// Script a selector to appear only after `checks` misses
    #[must_use]
    pub fn with_selector_after(self, selector: impl Into<String>, checks: u32) -> Self {
        self.script(|state| {
            state.selectors.insert(selector.into(), checks);
        })
    }

    /// Script an evaluation result; repeated calls append a sequence and the
    /// final value repeats forever
    #[must_use]
    pub fn with_eval(self, expression: impl Into<String>, value: Value) -> Self {
        self.script(|state| {
            state
                .evals
                .entry(expression.into())
                .or_default()
                .push_back(value);
        })
    }

    /// Script click/fill against a selector to fail
    #[must_use]
    pub fn with_failing_selector(self, selector: impl Into<String>) -> Self {
        self.script(|state| {
            state.failing_selectors.insert(selector.into());
        })
    }

    /// Script the connection to drop after `calls` further session calls
    #[must_use]
    pub fn with_die_after(self, calls: u32) -> Self {
        self.script(|state| {
            state.die_after = Some(calls);
        })
    }

    fn script(self, f: impl FnOnce(&mut MockState)) -> Self {
        // Builders run before the session is shared; the lock is uncontended.
        if let Ok(mut state) = self.state.try_lock() {
            f(&mut state);
        }
        self
    }

    /// A handle onto the same scripted state, for post-run inspection
    #[must_use]
    pub fn handle(&self) -> Self {
        self.clone()
    }

    /// Append a diagnostic as if the page had logged it
    pub async fn push_diagnostic(&self, entry: DiagnosticEntry) {
        self.state.lock().await.diagnostics.push(entry);
    }

    /// Make a selector visible from now on
    pub async fn add_selector(&self, selector: impl Into<String>) {
        self.state.lock().await.selectors.insert(selector.into(), 0);
    }

    /// Drop the connection immediately
    pub async fn kill(&self) {
        self.state.lock().await.alive = false;
    }

    /// Everything the session was asked to do, in order
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.call_log.clone()
    }

    /// Check if a call with this prefix was recorded
    pub async fn was_called(&self, prefix: &str) -> bool {
        self.state
            .lock()
            .await
            .call_log
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Number of times `close` ran
    pub async fn close_count(&self) -> u32 {
        self.state.lock().await.close_count
    }

    /// Last URL handed to `navigate`
    pub async fn last_url(&self) -> Option<String> {
        self.state.lock().await.last_url.clone()
    }

    /// Current viewport override
    pub async fn viewport(&self) -> Viewport {
        self.state.lock().await.viewport
    }
}

#[async_trait]
impl Session for MockSession {
    async fn navigate(&mut self, url: &str) -> SondaResult<()> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("navigate:{url}"));
        state.tick()?;
        state.last_url = Some(url.to_string());
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> SondaResult<()> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("click:{selector}"));
        state.tick()?;
        if state.failing_selectors.contains(selector) {
            return Err(SondaError::action(format!(
                "click on {selector} failed as scripted"
            )));
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> SondaResult<()> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("fill:{selector}={value}"));
        state.tick()?;
        if state.failing_selectors.contains(selector) {
            return Err(SondaError::action(format!(
                "fill on {selector} failed as scripted"
            )));
        }
        Ok(())
    }

    async fn selector_exists(&mut self, selector: &str) -> SondaResult<bool> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("exists:{selector}"));
        state.tick()?;
        match state.selectors.get_mut(selector) {
            Some(0) => Ok(true),
            Some(remaining) => {
                *remaining -= 1;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn evaluate(&mut self, expression: &str) -> SondaResult<Value> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("eval:{expression}"));
        state.tick()?;
        let value = match state.evals.get_mut(expression) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Value::Null),
            Some(queue) => queue.front().cloned().unwrap_or(Value::Null),
            None => Value::Null,
        };
        Ok(value)
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> SondaResult<()> {
        let mut state = self.state.lock().await;
        state.call_log.push(format!("viewport:{width}x{height}"));
        state.tick()?;
        state.viewport = Viewport { width, height };
        Ok(())
    }

    async fn take_diagnostics(&mut self) -> SondaResult<Vec<DiagnosticEntry>> {
        // Works even after the connection dropped: entries already captured
        // are harness-side evidence.
        let mut state = self.state.lock().await;
        Ok(std::mem::take(&mut state.diagnostics))
    }

    async fn is_alive(&mut self) -> bool {
        self.state.lock().await.alive
    }

    async fn close(&mut self) -> SondaResult<()> {
        let mut state = self.state.lock().await;
        state.call_log.push("close".to_string());
        state.close_count += 1;
        state.alive = false;
        Ok(())
    }
}
