//! Runtime accounting for a single generated sub-suite.

use serde::Serialize;

/// A group of tests that will run together as one CI task.
///
/// `Suite` tracks the cumulative and worst-case runtime of the tests added
/// to it, and how many of them had historical data. Totals are updated
/// incrementally on every [`add_test`](Self::add_test) and are never reset.
///
/// # Example
///
/// ```
/// use suitesplit::suite::Suite;
///
/// let mut suite = Suite::new();
/// suite.add_test("jstests/core/a.js", 120.0);
/// suite.add_test("jstests/core/b.js", 30.0);
///
/// assert_eq!(suite.runtime(), 150.0);
/// assert_eq!(suite.max_runtime(), 120.0);
/// assert!(suite.should_overwrite_timeout());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Suite {
    tests: Vec<String>,
    total_runtime: f64,
    max_runtime: f64,
    tests_with_runtime_info: usize,
}

impl Suite {
    /// Creates an empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a test with its expected runtime in seconds.
    ///
    /// A runtime of zero means no history is known for the test.
    pub fn add_test(&mut self, test_file: impl Into<String>, runtime: f64) {
        self.tests.push(test_file.into());
        self.total_runtime += runtime;

        if runtime != 0.0 {
            self.tests_with_runtime_info += 1;
        }

        if runtime > self.max_runtime {
            self.max_runtime = runtime;
        }
    }

    /// Whether the suite's runtime data is complete enough to derive timeouts.
    ///
    /// True only if every test has runtime info. An empty suite never
    /// qualifies.
    pub fn should_overwrite_timeout(&self) -> bool {
        !self.tests.is_empty() && self.tests.len() == self.tests_with_runtime_info
    }

    /// Sum of the runtimes of all tests added so far.
    pub fn runtime(&self) -> f64 {
        self.total_runtime
    }

    /// Longest single test runtime added so far.
    pub fn max_runtime(&self) -> f64 {
        self.max_runtime
    }

    /// Number of tests that were added with a non-zero runtime.
    pub fn tests_with_runtime_info(&self) -> usize {
        self.tests_with_runtime_info
    }

    /// Tests in insertion order.
    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    /// Number of tests in the suite.
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if no test has been added.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_suite() {
        let suite = Suite::new();
        assert!(suite.is_empty());
        assert_eq!(suite.runtime(), 0.0);
        assert_eq!(suite.max_runtime(), 0.0);
        assert!(!suite.should_overwrite_timeout());
    }

    #[test]
    fn test_totals_accumulate() {
        let mut suite = Suite::new();
        suite.add_test("a.js", 10.0);
        suite.add_test("b.js", 40.0);
        suite.add_test("c.js", 25.0);

        assert_eq!(suite.tests(), ["a.js", "b.js", "c.js"]);
        assert_eq!(suite.runtime(), 75.0);
        assert_eq!(suite.max_runtime(), 40.0);
        assert_eq!(suite.tests_with_runtime_info(), 3);
        assert_eq!(suite.test_count(), 3);
    }

    #[test]
    fn test_missing_runtime_blocks_timeout_override() {
        let mut suite = Suite::new();
        suite.add_test("a.js", 10.0);
        suite.add_test("b.js", 0.0);

        assert_eq!(suite.tests_with_runtime_info(), 1);
        assert!(!suite.should_overwrite_timeout());
    }

    #[test]
    fn test_all_zero_runtime_never_overrides() {
        let mut suite = Suite::new();
        suite.add_test("a.js", 0.0);
        suite.add_test("b.js", 0.0);

        assert_eq!(suite.runtime(), 0.0);
        assert!(!suite.should_overwrite_timeout());
    }
}
