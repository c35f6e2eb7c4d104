//! Built-in scenarios for the inventory-management web app.
//!
//! Three flows, expressed as ordered step lists against the harness. The app
//! itself is a black box: these definitions only speak its stable selectors,
//! its `localStorage` keys, and its manifest endpoint, all parameterized by
//! the target base URL.

use crate::scenario::Scenario;
use crate::session::{DESKTOP_VIEWPORT, MOBILE_VIEWPORT};
use crate::step::{Expectation, Step};

/// Base URL the app is served from unless overridden.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// Tab bar
const TAB_SETTINGS: &str = "[data-tab=\"settings\"]";
const TAB_PRODUCTS: &str = "[data-tab=\"products\"]";
const TAB_INPUT_INVOICES: &str = "[data-tab=\"input-invoices\"]";
const TAB_SALES: &str = "[data-tab=\"sales-151\"]";

// Settings form
const FIELD_GITHUB_TOKEN: &str = "#github-token";
const FIELD_GIST_ID: &str = "#github-gist-id";
const BUTTON_SAVE_SETTINGS: &str = "button[onclick=\"saveGitHubSettings()\"]";
const BUTTON_BACKUP: &str = "button[onclick=\"backupToGitHubGist()\"]";
const BUTTON_RESTORE: &str = "button[onclick=\"loadFromGitHubGist()\"]";
const SETTINGS_INPUTS: &str = ".settings-input";

// Product creation
const BUTTON_ADD_PRODUCT: &str = ".add-btn";
const FIELD_PRODUCT_NAME: &str = "#product-name";
const BUTTON_SAVE_PRODUCT: &str = "button[data-action=\"save\"]";

// Structure and feedback
const NOTIFICATION: &str = ".notification, .toast, .alert";
const MOBILE_MENU: &str = "#mobile-menu-btn";
const SIDEBAR: &str = ".sidebar";
const MAIN_CONTENT: &str = ".main-content";
const ICON_LINKS: &str = "link[rel*=\"icon\"], link[rel=\"apple-touch-icon\"]";

// Fixture values
const EXPECTED_TITLE_FRAGMENT: &str = "Inventory Management";
const TEST_GITHUB_TOKEN: &str = "ghp_test1234567890abcdef";
const TEST_GIST_ID: &str = "test-gist-id";
const TEST_PRODUCT_NAME: &str = "Test Product GitHub";
const STORAGE_KEY_TOKEN: &str = "githubToken";
const STORAGE_KEY_GIST: &str = "githubGistId";

/// Registration state of the app's service worker, or why there is none.
const SERVICE_WORKER_STATE: &str = "(async () => { \
    if (!('serviceWorker' in navigator)) { return 'unsupported'; } \
    const reg = await navigator.serviceWorker.getRegistration(); \
    if (!reg) { return 'none'; } \
    const worker = reg.active || reg.waiting || reg.installing; \
    return worker ? worker.state : 'registered'; \
})()";

const SERVICE_WORKER_STATE_PATTERN: &str =
    "^(activated|activating|installed|installing|parsed|registered)$";

const SERVICE_WORKER_SUPPORT: &str = "'serviceWorker' in navigator";
const INSTALL_PROMPT_SUPPORT: &str = "'beforeinstallprompt' in window";
const STANDALONE_DISPLAY: &str = "window.matchMedia('(display-mode: standalone)').matches";

/// The target application boundary: where the app is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    base_url: String,
}

impl Default for Target {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Target {
    /// Target at a base URL; a trailing slash is normalized away
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// The normalized base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }
}

fn storage_read(key: &str) -> String {
    format!("localStorage.getItem({key:?})")
}

fn count_of(selector: &str) -> String {
    format!("document.querySelectorAll({selector:?}).length")
}

fn meta_content(name: &str) -> String {
    let selector = format!("meta[name=\"{name}\"]");
    format!("(() => {{ const el = document.querySelector({selector:?}); return el ? el.content : null; }})()")
}

fn manifest_field(field: &str) -> String {
    format!(
        "(async () => {{ const m = await (await fetch('/manifest.json')).json(); return m.{field} ?? null; }})()"
    )
}

/// General smoke test: load, title, settings form, console observation
/// window, save feedback, tab walk.
#[must_use]
pub fn smoke(target: &Target) -> Scenario {
    Scenario::new("smoke")
        .precondition(
            "load the inventory app",
            Step::Navigate {
                url: target.url("/"),
            },
        )
        .step(
            "page title mentions the product",
            Step::Evaluate {
                expression: "document.title".into(),
                expect: Expectation::Contains(EXPECTED_TITLE_FRAGMENT.into()),
            },
        )
        .precondition(
            "open the settings tab",
            Step::Click {
                selector: TAB_SETTINGS.into(),
            },
        )
        .step(
            "github token field is present",
            Step::WaitForSelector {
                selector: FIELD_GITHUB_TOKEN.into(),
                timeout_ms: 5_000,
            },
        )
        .step(
            "gist id field is present",
            Step::WaitForSelector {
                selector: FIELD_GIST_ID.into(),
                timeout_ms: 5_000,
            },
        )
        .step(
            "let the page settle while console output is collected",
            Step::Settle { ms: 2_000 },
        )
        .step(
            "fill the github token field",
            Step::Fill {
                selector: FIELD_GITHUB_TOKEN.into(),
                value: TEST_GITHUB_TOKEN.into(),
            },
        )
        .step(
            "save github settings",
            Step::Click {
                selector: BUTTON_SAVE_SETTINGS.into(),
            },
        )
        .tolerant(
            "a save notification appears",
            Step::WaitForSelector {
                selector: NOTIFICATION.into(),
                timeout_ms: 3_000,
            },
        )
        .step(
            "open the products tab",
            Step::Click {
                selector: TAB_PRODUCTS.into(),
            },
        )
        .step(
            "give the products view a beat to render",
            Step::Settle { ms: 500 },
        )
        .step(
            "open the input invoices tab",
            Step::Click {
                selector: TAB_INPUT_INVOICES.into(),
            },
        )
        .step(
            "give the invoices view a beat to render",
            Step::Settle { ms: 500 },
        )
        .step(
            "open the sales tab",
            Step::Click {
                selector: TAB_SALES.into(),
            },
        )
        .step(
            "give the sales view a beat to render",
            Step::Settle { ms: 500 },
        )
}

/// GitHub integration flow: settings persistence, backup/restore actions,
/// product creation, mobile breakpoint, structural containers.
#[must_use]
pub fn github_integration(target: &Target) -> Scenario {
    Scenario::new("github-integration")
        .precondition(
            "load the inventory app",
            Step::Navigate {
                url: target.url("/"),
            },
        )
        .precondition(
            "open the settings tab",
            Step::Click {
                selector: TAB_SETTINGS.into(),
            },
        )
        .precondition(
            "github token field is present",
            Step::WaitForSelector {
                selector: FIELD_GITHUB_TOKEN.into(),
                timeout_ms: 5_000,
            },
        )
        .step(
            "fill the github token field",
            Step::Fill {
                selector: FIELD_GITHUB_TOKEN.into(),
                value: TEST_GITHUB_TOKEN.into(),
            },
        )
        .step(
            "fill the gist id field",
            Step::Fill {
                selector: FIELD_GIST_ID.into(),
                value: TEST_GIST_ID.into(),
            },
        )
        .step(
            "save github settings",
            Step::Click {
                selector: BUTTON_SAVE_SETTINGS.into(),
            },
        )
        .step(
            "token persisted to local storage",
            Step::Evaluate {
                expression: storage_read(STORAGE_KEY_TOKEN),
                expect: Expectation::Equals(TEST_GITHUB_TOKEN.into()),
            },
        )
        .step(
            "gist id persisted to local storage",
            Step::Evaluate {
                expression: storage_read(STORAGE_KEY_GIST),
                expect: Expectation::Equals(TEST_GIST_ID.into()),
            },
        )
        .step(
            "trigger a gist backup",
            Step::Click {
                selector: BUTTON_BACKUP.into(),
            },
        )
        .tolerant(
            "backup reports a completion signal",
            Step::WaitForSelector {
                selector: NOTIFICATION.into(),
                timeout_ms: 5_000,
            },
        )
        .step(
            "trigger a gist restore",
            Step::Click {
                selector: BUTTON_RESTORE.into(),
            },
        )
        .tolerant(
            "restore reports a completion signal",
            Step::WaitForSelector {
                selector: NOTIFICATION.into(),
                timeout_ms: 5_000,
            },
        )
        .step(
            "open the products tab",
            Step::Click {
                selector: TAB_PRODUCTS.into(),
            },
        )
        .step(
            "start creating a product",
            Step::Click {
                selector: BUTTON_ADD_PRODUCT.into(),
            },
        )
        .step(
            "product name field appears",
            Step::WaitForSelector {
                selector: FIELD_PRODUCT_NAME.into(),
                timeout_ms: 3_000,
            },
        )
        .step(
            "name the test product",
            Step::Fill {
                selector: FIELD_PRODUCT_NAME.into(),
                value: TEST_PRODUCT_NAME.into(),
            },
        )
        .step(
            "save the product",
            Step::Click {
                selector: BUTTON_SAVE_PRODUCT.into(),
            },
        )
        .step(
            "switch to the mobile viewport",
            Step::Resize {
                width: MOBILE_VIEWPORT.width,
                height: MOBILE_VIEWPORT.height,
            },
        )
        .step(
            "mobile menu control appears",
            Step::WaitForSelector {
                selector: MOBILE_MENU.into(),
                timeout_ms: 1_000,
            },
        )
        .step(
            "restore the desktop viewport",
            Step::Resize {
                width: DESKTOP_VIEWPORT.width,
                height: DESKTOP_VIEWPORT.height,
            },
        )
        .step(
            "sidebar container is present",
            Step::WaitForSelector {
                selector: SIDEBAR.into(),
                timeout_ms: 2_000,
            },
        )
        .step(
            "main content container is present",
            Step::WaitForSelector {
                selector: MAIN_CONTENT.into(),
                timeout_ms: 2_000,
            },
        )
        .step(
            "at least two settings inputs exist",
            Step::Evaluate {
                expression: count_of(SETTINGS_INPUTS),
                expect: Expectation::CountAtLeast(2),
            },
        )
}

/// PWA feature flow: service worker, manifest fields, platform meta tags,
/// icon links, installability signals.
#[must_use]
pub fn pwa(target: &Target) -> Scenario {
    Scenario::new("pwa")
        .precondition(
            "load the inventory app",
            Step::Navigate {
                url: target.url("/"),
            },
        )
        .step(
            "service worker is registered",
            Step::Evaluate {
                expression: SERVICE_WORKER_STATE.into(),
                expect: Expectation::Matches(SERVICE_WORKER_STATE_PATTERN.into()),
            },
        )
        .step(
            "manifest declares an app name",
            Step::Evaluate {
                expression: manifest_field("name"),
                expect: Expectation::NonEmptyString,
            },
        )
        .step(
            "manifest declares a short name",
            Step::Evaluate {
                expression: manifest_field("short_name"),
                expect: Expectation::NonEmptyString,
            },
        )
        .step(
            "manifest lists at least one icon",
            Step::Evaluate {
                expression: manifest_field("icons"),
                expect: Expectation::NonEmptyArray,
            },
        )
        .tolerant(
            "apple web app title tag is present",
            Step::Evaluate {
                expression: meta_content("apple-mobile-web-app-title"),
                expect: Expectation::NonEmptyString,
            },
        )
        .tolerant(
            "apple web app capable tag is present",
            Step::Evaluate {
                expression: meta_content("apple-mobile-web-app-capable"),
                expect: Expectation::NonEmptyString,
            },
        )
        .tolerant(
            "apple status bar style tag is present",
            Step::Evaluate {
                expression: meta_content("apple-mobile-web-app-status-bar-style"),
                expect: Expectation::NonEmptyString,
            },
        )
        .tolerant(
            "icon links are declared",
            Step::Evaluate {
                expression: count_of(ICON_LINKS),
                expect: Expectation::CountAtLeast(1),
            },
        )
        .step(
            "browser supports service workers",
            Step::Evaluate {
                expression: SERVICE_WORKER_SUPPORT.into(),
                expect: Expectation::Truthy,
            },
        )
        .tolerant(
            "install prompt capability is exposed",
            Step::Evaluate {
                expression: INSTALL_PROMPT_SUPPORT.into(),
                expect: Expectation::Truthy,
            },
        )
        .tolerant(
            "running in standalone display mode",
            Step::Evaluate {
                expression: STANDALONE_DISPLAY.into(),
                expect: Expectation::Truthy,
            },
        )
}

/// All built-in scenarios, in their canonical order.
#[must_use]
pub fn all(target: &Target) -> Vec<Scenario> {
    vec![smoke(target), github_integration(target), pwa(target)]
}

/// Built-in scenario identifiers, in canonical order.
#[must_use]
pub const fn names() -> [&'static str; 3] {
    ["smoke", "github-integration", "pwa"]
}

/// Look up one built-in scenario by identifier.
#[must_use]
pub fn by_id(target: &Target, id: &str) -> Option<Scenario> {
    match id {
        "smoke" => Some(smoke(target)),
        "github-integration" => Some(github_integration(target)),
        "pwa" => Some(pwa(target)),
        _ => None,
    }
}
