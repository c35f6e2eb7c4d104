//! Step actions and expectations.
//!
//! A step is one action against the page. Steps are data: the runner
//! interprets them, so scenario definitions stay declarative and the whole
//! vocabulary is testable without a browser.

use serde_json::Value;

/// One action in a scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Navigate the page to an absolute URL
    Navigate {
        /// Absolute URL
        url: String,
    },
    /// Click the first element matching a selector
    Click {
        /// CSS selector
        selector: String,
    },
    /// Replace an input's value
    Fill {
        /// CSS selector
        selector: String,
        /// Value to set
        value: String,
    },
    /// Probe for a selector with its own budget
    WaitForSelector {
        /// CSS selector
        selector: String,
        /// Probe budget in milliseconds
        timeout_ms: u64,
    },
    /// Probe an evaluated expression against an expectation
    Evaluate {
        /// Script expression evaluated in page context
        expression: String,
        /// What the settled value must satisfy
        expect: Expectation,
    },
    /// Override the viewport
    Resize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Bounded observation window; the only sanctioned fixed wait
    Settle {
        /// Window length in milliseconds
        ms: u64,
    },
}

impl Step {
    /// Short label for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::Click { .. } => "click",
            Self::Fill { .. } => "fill",
            Self::WaitForSelector { .. } => "wait-for-selector",
            Self::Evaluate { .. } => "evaluate",
            Self::Resize { .. } => "resize",
            Self::Settle { .. } => "settle",
        }
    }
}

/// What an evaluated value must satisfy.
///
/// Checks are JSON-level: expressions return their settled value by value,
/// so string, number, bool and array shapes cover the page surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Truthy under script rules (not null/false/0/"" )
    Truthy,
    /// Exact JSON equality
    Equals(Value),
    /// String value contains a substring
    Contains(String),
    /// String value matches a regular expression
    Matches(String),
    /// Number (or array length) is at least this big
    CountAtLeast(u64),
    /// Non-empty string
    NonEmptyString,
    /// Non-empty array
    NonEmptyArray,
}

impl Expectation {
    /// Check a settled value against this expectation.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Self::Truthy => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
            Self::Equals(expected) => value == expected,
            Self::Contains(needle) => value.as_str().is_some_and(|s| s.contains(needle)),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| value.as_str().is_some_and(|s| re.is_match(s)))
                .unwrap_or(false),
            Self::CountAtLeast(min) => match value {
                Value::Number(n) => n.as_u64().is_some_and(|c| c >= *min),
                Value::Array(items) => items.len() as u64 >= *min,
                _ => false,
            },
            Self::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
            Self::NonEmptyArray => value.as_array().is_some_and(|a| !a.is_empty()),
        }
    }
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truthy => write!(f, "is truthy"),
            Self::Equals(expected) => write!(f, "equals {expected}"),
            Self::Contains(needle) => write!(f, "contains {needle:?}"),
            Self::Matches(pattern) => write!(f, "matches /{pattern}/"),
            Self::CountAtLeast(min) => write!(f, "counts at least {min}"),
            Self::NonEmptyString => write!(f, "is a non-empty string"),
            Self::NonEmptyArray => write!(f, "is a non-empty array"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    mod step_tests {
        use super::*;

        #[test]
        fn kind_labels_every_variant() {
            assert_eq!(
                Step::Navigate {
                    url: "http://localhost:8000/".into()
                }
                .kind(),
                "navigate"
            );
            assert_eq!(
                Step::WaitForSelector {
                    selector: "#toast".into(),
                    timeout_ms: 1000
                }
                .kind(),
                "wait-for-selector"
            );
            assert_eq!(Step::Settle { ms: 500 }.kind(), "settle");
        }
    }

    mod truthy_tests {
        use super::*;

        #[test]
        fn follows_script_truthiness() {
            let expect = Expectation::Truthy;
            assert!(!expect.check(&Value::Null));
            assert!(!expect.check(&json!(false)));
            assert!(!expect.check(&json!(0)));
            assert!(!expect.check(&json!("")));
            assert!(expect.check(&json!(true)));
            assert!(expect.check(&json!(1)));
            assert!(expect.check(&json!("standalone")));
            assert!(expect.check(&json!([])));
            assert!(expect.check(&json!({})));
        }
    }

    mod matcher_tests {
        use super::*;

        #[test]
        fn equals_is_exact() {
            let expect = Expectation::Equals(json!("ghp_test1234567890abcdef"));
            assert!(expect.check(&json!("ghp_test1234567890abcdef")));
            assert!(!expect.check(&json!("ghp_other")));
            assert!(!expect.check(&Value::Null));
        }

        #[test]
        fn contains_only_applies_to_strings() {
            let expect = Expectation::Contains("Inventory Management".to_string());
            assert!(expect.check(&json!("Inventory Management - Dashboard")));
            assert!(!expect.check(&json!("Warehouse")));
            assert!(!expect.check(&json!(42)));
        }

        #[test]
        fn matches_uses_regex() {
            let expect = Expectation::Matches("^(activated|installing|waiting)$".to_string());
            assert!(expect.check(&json!("activated")));
            assert!(!expect.check(&json!("unsupported")));
        }

        #[test]
        fn invalid_regex_never_matches() {
            let expect = Expectation::Matches("(unclosed".to_string());
            assert!(!expect.check(&json!("anything")));
        }

        #[test]
        fn count_accepts_numbers_and_arrays() {
            let expect = Expectation::CountAtLeast(2);
            assert!(expect.check(&json!(2)));
            assert!(expect.check(&json!(5)));
            assert!(!expect.check(&json!(1)));
            assert!(expect.check(&json!(["a", "b", "c"])));
            assert!(!expect.check(&json!(["a"])));
            assert!(!expect.check(&json!("2")));
        }

        #[test]
        fn non_empty_string_rejects_blank_and_null() {
            let expect = Expectation::NonEmptyString;
            assert!(expect.check(&json!("Inventory")));
            assert!(!expect.check(&json!("")));
            assert!(!expect.check(&Value::Null));
            assert!(!expect.check(&json!(7)));
        }

        #[test]
        fn non_empty_array_rejects_empty_and_scalars() {
            let expect = Expectation::NonEmptyArray;
            assert!(expect.check(&json!([{ "src": "icon.png" }])));
            assert!(!expect.check(&json!([])));
            assert!(!expect.check(&json!("icons")));
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn descriptions_read_naturally() {
            assert_eq!(Expectation::Truthy.to_string(), "is truthy");
            assert_eq!(
                Expectation::Contains("Inventory".to_string()).to_string(),
                "contains \"Inventory\""
            );
            assert_eq!(Expectation::CountAtLeast(2).to_string(), "counts at least 2");
        }
    }
}
