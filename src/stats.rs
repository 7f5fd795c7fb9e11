//! Aggregation of historical runtime statistics.
//!
//! [`TestStats`] folds raw [`TestStatsRecord`]s into one average runtime
//! per test. Hook records contribute pure overhead: their average duration
//! is added to the runtime of the test they ran around instead of being
//! scheduled on their own.
//!
//! # Example
//!
//! ```
//! use suitesplit::history::TestStatsRecord;
//! use suitesplit::stats::TestStats;
//!
//! let stats = TestStats::from_records(&[
//!     TestStatsRecord::new("jstests/core/find.js", 10.0, 1),
//!     TestStatsRecord::new("jstests\\core\\find.js", 20.0, 1),
//!     TestStatsRecord::new("find:ValidateCollections", 5.0, 2),
//! ]);
//!
//! let runtimes = stats.tests_runtimes();
//! assert_eq!(runtimes[0].test_file, "jstests/core/find.js");
//! assert_eq!(runtimes[0].runtime, 20.0); // avg(10, 20) + hook 5
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::history::TestStatsRecord;
use crate::testname;

/// A statistics record classified once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Runtime of a test file, keyed by its normalized path.
    Test { test_file: String },

    /// Runtime of a hook, keyed by the short name of the test it ran around.
    Hook { test_name: String },
}

impl Observation {
    /// Classifies a raw `test_file` field from the statistics service.
    pub fn classify(raw_test_file: &str) -> Self {
        let test_file = testname::normalize_test_file(raw_test_file);
        match testname::split_hook_name(&test_file) {
            Some((test_name, _hook)) => Observation::Hook {
                test_name: test_name.to_string(),
            },
            None => Observation::Test { test_file },
        }
    }
}

/// Weighted average runtime over a number of passing runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeInfo {
    /// Average duration in seconds.
    pub duration: f64,

    /// Number of runs the average covers.
    pub num_run: u64,
}

impl RuntimeInfo {
    /// Creates an aggregate from a single observation.
    pub fn new(duration: f64, num_run: u64) -> Self {
        Self { duration, num_run }
    }

    /// Folds another observation into this aggregate.
    ///
    /// The duration becomes the run-weighted mean of both sides. If neither
    /// side carries any runs the plain mean is used instead.
    pub fn merge(&mut self, duration: f64, num_run: u64) {
        let total = self.num_run + num_run;
        self.duration = if total == 0 {
            (self.duration + duration) / 2.0
        } else {
            (self.duration * self.num_run as f64 + duration * num_run as f64) / total as f64
        };
        self.num_run = total;
    }
}

/// A test and its expected runtime, the unit the partitioner works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRuntime {
    /// Normalized test file path.
    pub test_file: String,

    /// Expected runtime in seconds, including hook overhead.
    pub runtime: f64,
}

impl TestRuntime {
    /// Creates a pair.
    pub fn new(test_file: impl Into<String>, runtime: f64) -> Self {
        Self {
            test_file: test_file.into(),
            runtime,
        }
    }
}

/// Per-test runtime aggregates for the task being analyzed.
#[derive(Debug, Clone, Default)]
pub struct TestStats {
    runtime_by_test: BTreeMap<String, RuntimeInfo>,
    hook_runtime_by_test: BTreeMap<String, RuntimeInfo>,
}

impl TestStats {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates all given records.
    pub fn from_records(records: &[TestStatsRecord]) -> Self {
        let mut stats = Self::new();
        for record in records {
            stats.add(record);
        }
        stats
    }

    /// Folds one record into the aggregate.
    pub fn add(&mut self, record: &TestStatsRecord) {
        let duration = record.avg_duration_pass;
        let num_run = record.num_pass;
        match Observation::classify(&record.test_file) {
            Observation::Test { test_file } => {
                add_runtime_info(&mut self.runtime_by_test, test_file, duration, num_run);
            }
            Observation::Hook { test_name } => {
                add_runtime_info(&mut self.hook_runtime_by_test, test_name, duration, num_run);
            }
        }
    }

    /// Returns true if no test records were aggregated.
    pub fn is_empty(&self) -> bool {
        self.runtime_by_test.is_empty()
    }

    /// Aggregate for a test file, excluding hook overhead.
    pub fn test_runtime(&self, test_file: &str) -> Option<RuntimeInfo> {
        self.runtime_by_test
            .get(&testname::normalize_test_file(test_file))
            .copied()
    }

    /// Aggregate for the hooks of the test with the given short name.
    pub fn hook_runtime(&self, test_name: &str) -> Option<RuntimeInfo> {
        self.hook_runtime_by_test.get(test_name).copied()
    }

    /// Returns every test with its runtime, longest first.
    ///
    /// Each runtime is the test's own average plus the average of its
    /// hooks. Tests with equal runtimes stay in path order.
    pub fn tests_runtimes(&self) -> Vec<TestRuntime> {
        let mut tests: Vec<TestRuntime> = self
            .runtime_by_test
            .iter()
            .map(|(test_file, info)| {
                let short_name = testname::short_name_from_test_file(test_file);
                let hook = self
                    .hook_runtime_by_test
                    .get(&short_name)
                    .map(|h| h.duration)
                    .unwrap_or(0.0);
                TestRuntime::new(test_file.clone(), info.duration + hook)
            })
            .collect();

        tests.sort_by(|a, b| b.runtime.total_cmp(&a.runtime));
        debug!("Aggregated runtimes for {} tests", tests.len());
        tests
    }
}

fn add_runtime_info(
    runtimes: &mut BTreeMap<String, RuntimeInfo>,
    key: String,
    duration: f64,
    num_run: u64,
) {
    runtimes
        .entry(key)
        .and_modify(|info| info.merge(duration, num_run))
        .or_insert_with(|| RuntimeInfo::new(duration, num_run));
}
