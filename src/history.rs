//! Historical test statistics sources.
//!
//! This module defines the interface to the CI analytics service that
//! reports how long each test took in previous runs of a task. The
//! generator only ever talks to a [`StatsSource`], which keeps the
//! partitioning logic testable without network access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        StatsSource                           │
//! │                                                              │
//! │  test_stats(&StatsQuery) ──────► Vec<TestStatsRecord>        │
//! │  tasks_by_build_id(build) ─────► Vec<BuildTask>              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Built-in Sources
//!
//! | Source | Module | Description |
//! |--------|--------|-------------|
//! | Evergreen | [`evergreen`] | Evergreen REST v2 `test_stats` endpoint |
//!
//! # Error Handling
//!
//! All operations return [`HistoryResult<T>`]. The
//! [`HistoryError::ServiceUnavailable`] variant is special: callers treat it
//! as a transient condition and fall back to runtime-agnostic partitioning.
//! Every other variant is fatal.

pub mod evergreen;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Result type for statistics operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while fetching historical statistics.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The service reported that it is temporarily unavailable (HTTP 503).
    ///
    /// Recovered locally by the generator.
    #[error("Statistics service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered with an unexpected status code.
    #[error("Statistics request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request could not be sent or the connection failed.
    #[error("Failed to reach statistics service: {0}")]
    Request(String),

    /// The response body could not be decoded.
    #[error("Failed to decode statistics response: {0}")]
    Decode(String),

    /// Client credentials or endpoint configuration are unusable.
    #[error("Invalid statistics client configuration: {0}")]
    Config(String),
}

impl HistoryError {
    /// Returns true for the transient condition that triggers the fallback path.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, HistoryError::ServiceUnavailable(_))
    }
}

/// One raw statistics record as reported by the service.
///
/// `test_file` is either a test path or a hook record of the form
/// `<test_name>:<hook_name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStatsRecord {
    /// Test file or hook identifier, using the separator of the reporting host.
    pub test_file: String,

    /// Average duration of passing executions, in seconds.
    #[serde(default)]
    pub avg_duration_pass: f64,

    /// Number of passing executions contributing to the average.
    #[serde(default)]
    pub num_pass: u64,
}

impl TestStatsRecord {
    /// Creates a record.
    pub fn new(test_file: impl Into<String>, avg_duration_pass: f64, num_pass: u64) -> Self {
        Self {
            test_file: test_file.into(),
            avg_duration_pass,
            num_pass,
        }
    }
}

/// A task already scheduled in the current build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTask {
    /// Display name of the task, e.g. `auth_0_linux`.
    pub display_name: String,
}

/// Parameters for a statistics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    /// Project whose history is analyzed.
    pub project: String,

    /// First day included in the window.
    pub after_date: NaiveDate,

    /// Last day included in the window.
    pub before_date: NaiveDate,

    /// Tasks to include.
    pub tasks: Vec<String>,

    /// Build variants to include.
    pub variants: Vec<String>,

    /// Number of days aggregated into each returned record.
    pub group_num_days: i64,
}

impl StatsQuery {
    /// Builds a query covering the `days` days that end at `end`.
    ///
    /// Results are grouped per test over the whole window.
    pub fn for_window(
        project: impl Into<String>,
        task: impl Into<String>,
        variant: impl Into<String>,
        end: DateTime<Utc>,
        days: i64,
    ) -> Self {
        let start = end - Duration::days(days);
        Self {
            project: project.into(),
            after_date: start.date_naive(),
            before_date: end.date_naive(),
            tasks: vec![task.into()],
            variants: vec![variant.into()],
            group_num_days: (end - start).num_days(),
        }
    }

    /// Query parameters in the form the REST endpoint expects.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("after_date", self.after_date.format("%Y-%m-%d").to_string()),
            ("before_date", self.before_date.format("%Y-%m-%d").to_string()),
            ("tasks", self.tasks.join(",")),
            ("variants", self.variants.join(",")),
            ("group_by", "test".to_string()),
            ("group_num_days", self.group_num_days.to_string()),
        ]
    }
}

/// Source of historical test runtimes and build metadata.
///
/// Implementations must be `Send + Sync` so they can be held by the
/// generator across await points.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetches per-test statistics for the given query.
    ///
    /// An empty vector means the task has no history (e.g. a new suite).
    async fn test_stats(&self, query: &StatsQuery) -> HistoryResult<Vec<TestStatsRecord>>;

    /// Lists the tasks already scheduled in the given build.
    async fn tasks_by_build_id(&self, build_id: &str) -> HistoryResult<Vec<BuildTask>>;

    /// Name of the source, for logging.
    fn name(&self) -> &str;
}
