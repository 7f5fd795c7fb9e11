//! Partitioning of tests into time-bounded sub-suites.
//!
//! # Strategies
//!
//! | Function | Description | Use Case |
//! |----------|-------------|----------|
//! | [`partition`](SuitePartitioner::partition) | Greedy packing under a runtime budget | Tests with history |
//! | [`fallback_partition`] | Round-robin into a fixed number of suites | No usable history |
//!
//! Greedy packing keeps a single open suite and closes it whenever the next
//! test would push it over budget. Input must already be sorted by runtime,
//! longest first, for the packing to be any good.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use suitesplit::partition::SuitePartitioner;
//! use suitesplit::stats::TestRuntime;
//!
//! let tests = vec![
//!     TestRuntime::new("a.js", 500.0),
//!     TestRuntime::new("b.js", 100.0),
//!     TestRuntime::new("c.js", 50.0),
//! ];
//!
//! let suites = SuitePartitioner::new(Duration::from_secs(400)).partition(&tests);
//! assert_eq!(suites.len(), 2);
//! assert_eq!(suites[0].tests(), ["a.js"]);
//! assert_eq!(suites[1].tests(), ["b.js", "c.js"]);
//! ```

use std::time::Duration;

use tracing::debug;

use crate::stats::TestRuntime;
use crate::suite::Suite;

/// Packs tests into suites that each fit a runtime budget.
#[derive(Debug, Clone)]
pub struct SuitePartitioner {
    max_runtime_secs: f64,
    max_suites: Option<usize>,
}

impl SuitePartitioner {
    /// Creates a partitioner targeting the given per-suite runtime.
    pub fn new(max_runtime: Duration) -> Self {
        Self {
            max_runtime_secs: max_runtime.as_secs_f64(),
            max_suites: None,
        }
    }

    /// Caps the number of suites. `None` or `Some(0)` means no cap.
    ///
    /// Once the cap is reached, remaining tests are spread round-robin over
    /// the existing suites regardless of their runtime.
    pub fn with_max_suites(mut self, max_suites: Option<usize>) -> Self {
        self.max_suites = max_suites.filter(|&max| max > 0);
        self
    }

    /// Divides tests, sorted longest first, into suites.
    ///
    /// A test that alone exceeds the budget still gets a suite of its own.
    /// Every input test ends up in exactly one suite.
    pub fn partition(&self, tests: &[TestRuntime]) -> Vec<Suite> {
        let mut suites = Vec::new();
        let mut current = Suite::new();
        let mut last_processed = tests.len();

        debug!("Determining suites for runtime: {}s", self.max_runtime_secs);
        for (idx, test) in tests.iter().enumerate() {
            debug!("Adding test {}, runtime {}", test.test_file, test.runtime);
            if current.runtime() + test.runtime > self.max_runtime_secs {
                debug!(
                    "Runtime({}) + new test({}) > max({})",
                    current.runtime(),
                    test.runtime,
                    self.max_runtime_secs
                );
                if !current.is_empty() {
                    suites.push(std::mem::take(&mut current));
                    if self.max_suites.is_some_and(|max| suites.len() >= max) {
                        last_processed = idx;
                        break;
                    }
                }
            }

            current.add_test(test.test_file.clone(), test.runtime);
        }

        if !current.is_empty() {
            suites.push(current);
        }

        if last_processed < tests.len() {
            debug!(
                "Reached max of {} suites, spreading {} remaining tests",
                suites.len(),
                tests.len() - last_processed
            );
            divide_remaining_tests(&tests[last_processed..], &mut suites);
        }

        suites
    }
}

/// Spreads tests round-robin over existing suites, ignoring the budget.
pub fn divide_remaining_tests(remaining: &[TestRuntime], suites: &mut [Suite]) {
    if suites.is_empty() {
        return;
    }

    for (i, test) in remaining.iter().enumerate() {
        suites[i % suites.len()].add_test(test.test_file.clone(), test.runtime);
    }
}

/// Splits tests into `num_suites` groups by index, without runtime data.
///
/// Every test is recorded with a runtime of zero, so fallback suites never
/// qualify for timeout overrides. `num_suites` is clamped to at least 1 and
/// exactly that many suites are returned, trailing ones possibly empty.
pub fn fallback_partition(tests: &[String], num_suites: usize) -> Vec<Suite> {
    let num_suites = num_suites.max(1);
    let mut suites: Vec<Suite> = (0..num_suites).map(|_| Suite::new()).collect();

    for (i, test) in tests.iter().enumerate() {
        suites[i % num_suites].add_test(test.clone(), 0.0);
    }

    suites
}
