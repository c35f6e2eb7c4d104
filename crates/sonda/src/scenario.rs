//! Scenario definitions: ordered, immutable step lists.

use crate::step::Step;

/// One step plus its reporting and policy flags.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    description: String,
    action: Step,
    precondition: bool,
    tolerant: bool,
}

impl StepSpec {
    /// Human-readable description used in reporting
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The action to execute
    #[must_use]
    pub const fn action(&self) -> &Step {
        &self.action
    }

    /// Whether a failure here skips every later step
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        self.precondition
    }

    /// Whether a probe miss is tolerated (recorded as skipped, not failed)
    #[must_use]
    pub const fn is_tolerant(&self) -> bool {
        self.tolerant
    }
}

/// An identifier plus an ordered sequence of steps.
///
/// Built once at program start and never mutated afterwards; the runner
/// executes the steps strictly in declaration order.
///
/// ```
/// use sonda::{Scenario, Step};
///
/// let scenario = Scenario::new("example")
///     .precondition("load the app", Step::Navigate {
///         url: "http://localhost:8000/".into(),
///     })
///     .step("open the settings tab", Step::Click {
///         selector: "[data-tab=\"settings\"]".into(),
///     })
///     .tolerant("a notification appears", Step::WaitForSelector {
///         selector: ".notification, .toast, .alert".into(),
///         timeout_ms: 3_000,
///     });
///
/// assert_eq!(scenario.id(), "example");
/// assert_eq!(scenario.len(), 3);
/// assert!(scenario.steps()[0].is_precondition());
/// assert!(scenario.steps()[2].is_tolerant());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    id: String,
    steps: Vec<StepSpec>,
}

impl Scenario {
    /// Start an empty scenario
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Append a strict step
    #[must_use]
    pub fn step(self, description: impl Into<String>, action: Step) -> Self {
        self.push(description, action, false, false)
    }

    /// Append a prerequisite step; its failure skips everything after it
    #[must_use]
    pub fn precondition(self, description: impl Into<String>, action: Step) -> Self {
        self.push(description, action, true, false)
    }

    /// Append a probe whose absence is tolerated
    #[must_use]
    pub fn tolerant(self, description: impl Into<String>, action: Step) -> Self {
        self.push(description, action, false, true)
    }

    fn push(mut self, description: impl Into<String>, action: Step, precondition: bool, tolerant: bool) -> Self {
        self.steps.push(StepSpec {
            description: description.into(),
            action,
            precondition,
            tolerant,
        });
        self
    }

    /// Scenario identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The steps, in declaration order
    #[must_use]
    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the scenario has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of precondition steps
    #[must_use]
    pub fn precondition_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_precondition()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod builder_tests {
        use super::*;

        #[test]
        fn steps_keep_declaration_order() {
            let scenario = Scenario::new("order")
                .step("first", Step::Settle { ms: 1 })
                .step("second", Step::Settle { ms: 2 })
                .step("third", Step::Settle { ms: 3 });

            let descriptions: Vec<_> = scenario
                .steps()
                .iter()
                .map(|s| s.description().to_string())
                .collect();
            assert_eq!(descriptions, vec!["first", "second", "third"]);
        }

        #[test]
        fn flags_are_independent() {
            let scenario = Scenario::new("flags")
                .precondition("load", Step::Navigate { url: "x".into() })
                .tolerant(
                    "toast",
                    Step::WaitForSelector {
                        selector: ".toast".into(),
                        timeout_ms: 100,
                    },
                )
                .step("click", Step::Click { selector: "a".into() });

            assert!(scenario.steps()[0].is_precondition());
            assert!(!scenario.steps()[0].is_tolerant());
            assert!(scenario.steps()[1].is_tolerant());
            assert!(!scenario.steps()[1].is_precondition());
            assert!(!scenario.steps()[2].is_precondition());
            assert!(!scenario.steps()[2].is_tolerant());
            assert_eq!(scenario.precondition_count(), 1);
        }

        #[test]
        fn empty_scenario_is_empty() {
            let scenario = Scenario::new("empty");
            assert!(scenario.is_empty());
            assert_eq!(scenario.len(), 0);
        }
    }
}
