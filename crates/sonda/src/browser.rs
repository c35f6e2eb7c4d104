//! Real browser session over the Chrome DevTools Protocol.
//!
//! [`CdpSession`] launches a Chromium process through `chromiumoxide`, keeps
//! one page for the whole run, and mirrors the page's console and thrown
//! exceptions into a harness-side buffer. Waiting and retrying are not done
//! here; every method is a single round trip, and probes own the polling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EvaluateParams, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::console::{DiagnosticEntry, Severity};
use crate::result::{SondaError, SondaResult};
use crate::session::{Session, SessionConfig};

/// Bound on waiting for the CDP handler to drain after a close.
const HANDLER_SHUTDOWN: Duration = Duration::from_secs(5);

type ConsoleBuffer = Arc<Mutex<Vec<DiagnosticEntry>>>;

/// A [`Session`] backed by one Chromium process and one page.
#[derive(Debug)]
pub struct CdpSession {
    browser: Browser,
    page: Page,
    console_buffer: ConsoleBuffer,
    handler_task: JoinHandle<()>,
    listener_tasks: Vec<JoinHandle<()>>,
    closed: bool,
}

impl CdpSession {
    /// Launch a Chromium process and open a blank page.
    ///
    /// Console output and uncaught exceptions are captured from this moment
    /// on, so entries from the initial blank page are in the buffer until the
    /// first [`Session::take_diagnostics`] drain.
    ///
    /// # Errors
    ///
    /// Returns [`SondaError::Launch`] if no usable Chromium binary is found,
    /// the process fails to start, or the initial page cannot be created.
    pub async fn launch(config: &SessionConfig) -> SondaResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport.width, config.viewport.height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(SondaError::launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|error| SondaError::launch(error.to_string()))?;

        // Drains websocket traffic between us and the browser; everything
        // else is starved without it.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|error| SondaError::launch(error.to_string()))?;

        override_metrics(&page, config.viewport.width, config.viewport.height).await?;

        let console_buffer: ConsoleBuffer = Arc::new(Mutex::new(Vec::new()));
        let listener_tasks = vec![
            spawn_console_listener(&page, Arc::clone(&console_buffer)).await?,
            spawn_exception_listener(&page, Arc::clone(&console_buffer)).await?,
        ];

        tracing::info!(
            headless = config.headless,
            width = config.viewport.width,
            height = config.viewport.height,
            "browser session ready"
        );

        Ok(Self {
            browser,
            page,
            console_buffer,
            handler_task,
            listener_tasks,
            closed: false,
        })
    }
}

#[async_trait]
impl Session for CdpSession {
    async fn navigate(&mut self, url: &str) -> SondaResult<()> {
        tracing::debug!(url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|error| SondaError::navigation(url, error.to_string()))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> SondaResult<()> {
        tracing::debug!(selector, "clicking");
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|error| SondaError::action(format!("{selector} not found: {error}")))?;
        element
            .click()
            .await
            .map_err(|error| SondaError::action(format!("click on {selector} failed: {error}")))?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> SondaResult<()> {
        tracing::debug!(selector, chars = value.len(), "filling");
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|error| SondaError::action(format!("input {selector} not found: {error}")))?;
        // Focus, wipe whatever is there, then type; typing alone appends.
        element
            .click()
            .await
            .map_err(|error| SondaError::action(format!("focus on {selector} failed: {error}")))?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|error| {
                SondaError::action(format!("clearing {selector} failed: {error}"))
            })?;
        element
            .type_str(value)
            .await
            .map_err(|error| {
                SondaError::action(format!("typing into {selector} failed: {error}"))
            })?;
        Ok(())
    }

    async fn selector_exists(&mut self, selector: &str) -> SondaResult<bool> {
        let value = self.evaluate(&js::selector_exists(selector)).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn evaluate(&mut self, expression: &str) -> SondaResult<Value> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(SondaError::action)?;
        let result = self
            .page
            .evaluate(params)
            .await
            .map_err(|error| SondaError::action(format!("evaluate failed: {error}")))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> SondaResult<()> {
        tracing::debug!(width, height, "overriding viewport");
        override_metrics(&self.page, width, height).await
    }

    async fn take_diagnostics(&mut self) -> SondaResult<Vec<DiagnosticEntry>> {
        let mut buffer = self.console_buffer.lock().await;
        Ok(std::mem::take(&mut *buffer))
    }

    async fn close(&mut self) -> SondaResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        for task in self.listener_tasks.drain(..) {
            task.abort();
        }
        let closed = self.browser.close().await;
        if tokio::time::timeout(HANDLER_SHUTDOWN, &mut self.handler_task)
            .await
            .is_err()
        {
            self.handler_task.abort();
        }
        closed.map_err(|error| SondaError::session(error.to_string()))?;
        tracing::info!("browser session closed");
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        // No async close from here; chromiumoxide reaps the child process
        // when the Browser handle drops.
        if !self.closed {
            tracing::debug!("session dropped without close");
            self.handler_task.abort();
            for task in &self.listener_tasks {
                task.abort();
            }
        }
    }
}

async fn override_metrics(page: &Page, width: u32, height: u32) -> SondaResult<()> {
    let params = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(width))
        .height(i64::from(height))
        .device_scale_factor(1.0)
        .mobile(false)
        .build()
        .map_err(SondaError::action)?;
    page.execute(params)
        .await
        .map_err(|error| SondaError::action(format!("viewport override failed: {error}")))?;
    Ok(())
}

async fn spawn_console_listener(
    page: &Page,
    buffer: ConsoleBuffer,
) -> SondaResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|error| SondaError::launch(format!("console subscription failed: {error}")))?;
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let entry = DiagnosticEntry::new(
                classify(&event.r#type),
                render_args(&event.args),
            );
            buffer.lock().await.push(entry);
        }
    }))
}

async fn spawn_exception_listener(
    page: &Page,
    buffer: ConsoleBuffer,
) -> SondaResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventExceptionThrown>()
        .await
        .map_err(|error| SondaError::launch(format!("exception subscription failed: {error}")))?;
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let details = &event.exception_details;
            let message = details
                .exception
                .as_ref()
                .and_then(|exception| exception.description.clone())
                .unwrap_or_else(|| details.text.clone());
            buffer.lock().await.push(DiagnosticEntry::error(message));
        }
    }))
}

/// Map the CDP console call type onto harness severities. `console.assert`
/// only emits an event when the assertion failed, so it counts as an error.
fn classify(kind: &ConsoleApiCalledType) -> Severity {
    match kind {
        ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => Severity::Error,
        ConsoleApiCalledType::Warning => Severity::Warning,
        _ => Severity::Info,
    }
}

fn render_args(args: &[chromiumoxide::cdp::js_protocol::runtime::RemoteObject]) -> String {
    let parts: Vec<String> = args
        .iter()
        .filter_map(|arg| render_arg(arg.value.as_ref(), arg.description.as_deref()))
        .collect();
    if parts.is_empty() {
        "console message with no readable arguments".to_string()
    } else {
        parts.join(" ")
    }
}

/// Prefer the serialized value; strings are shown bare, not JSON-quoted.
/// Objects without a value fall back to the CDP description.
fn render_arg(value: Option<&Value>, description: Option<&str>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
        None => description.map(str::to_string),
    }
}

mod js {
    //! Page-side snippets. Selectors are embedded with Rust debug quoting,
    //! which matches JS string escaping for quotes and backslashes.

    pub(crate) fn selector_exists(selector: &str) -> String {
        format!("document.querySelector({selector:?}) !== null")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    mod snippet_tests {
        use super::*;

        #[test]
        fn plain_selector_is_quoted() {
            assert_eq!(
                js::selector_exists("#github-token"),
                "document.querySelector(\"#github-token\") !== null"
            );
        }

        #[test]
        fn embedded_quotes_stay_valid_js() {
            let snippet = js::selector_exists("[data-tab=\"settings\"]");
            assert_eq!(
                snippet,
                "document.querySelector(\"[data-tab=\\\"settings\\\"]\") !== null"
            );
        }
    }

    mod classify_tests {
        use super::*;

        #[test]
        fn error_and_assert_are_errors() {
            assert_eq!(classify(&ConsoleApiCalledType::Error), Severity::Error);
            assert_eq!(classify(&ConsoleApiCalledType::Assert), Severity::Error);
        }

        #[test]
        fn warning_maps_to_warning() {
            assert_eq!(classify(&ConsoleApiCalledType::Warning), Severity::Warning);
        }

        #[test]
        fn everything_else_is_info() {
            assert_eq!(classify(&ConsoleApiCalledType::Log), Severity::Info);
            assert_eq!(classify(&ConsoleApiCalledType::Debug), Severity::Info);
            assert_eq!(classify(&ConsoleApiCalledType::Info), Severity::Info);
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn strings_render_bare() {
            assert_eq!(
                render_arg(Some(&json!("plain text")), None),
                Some("plain text".to_string())
            );
        }

        #[test]
        fn non_strings_render_as_json() {
            assert_eq!(render_arg(Some(&json!(42)), None), Some("42".to_string()));
            assert_eq!(
                render_arg(Some(&json!({"a": 1})), None),
                Some("{\"a\":1}".to_string())
            );
        }

        #[test]
        fn description_is_the_fallback() {
            assert_eq!(
                render_arg(None, Some("TypeError: boom")),
                Some("TypeError: boom".to_string())
            );
            assert_eq!(render_arg(None, None), None);
        }
    }
}
