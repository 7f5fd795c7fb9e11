//! Configuration schema definitions for suitesplit.
//!
//! [`ConfigOptions`] is the single immutable snapshot every component reads.
//! It is produced by [`resolve`](super::resolve) from layered sources and is
//! never mutated afterwards.
//!
//! # Options
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `task` | string | required |
//! | `project` | string | required |
//! | `build_variant` | string | required |
//! | `fallback_num_sub_suites` | integer ≥ 1 | required |
//! | `suite` | string | value of `task` |
//! | `target_resmoke_time` | minutes, 1 to 10080 | 60 |
//! | `max_sub_suites` | integer (0 = unlimited) | unlimited |
//! | `resmoke_args` | string | `""` |
//! | `resmoke_jobs_max` | string | none |
//! | `run_multiple_jobs` | string | `"true"` |
//! | `resmoke_repeat_suites` | integer, 1 to 1000 | 1 |
//! | `use_default_timeouts` | bool | false |
//! | `use_large_distro` | bool | false |
//! | `large_distro_name` | string | none |
//! | `use_multiversion` | string | none |
//! | `is_patch` | bool | false |
//! | `depends_on` | comma-separated list | empty |
//! | `build_id` | string | none |
//! | `analysis_duration_days` | integer, 1 to 365 | 14 |
//! | `test_suite_dir` | path | `buildscripts/resmokeconfig/suites` |
//! | `generated_config_dir` | path | `generated_resmoke_config` |

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Names of every recognized configuration key.
pub mod keys {
    pub const ANALYSIS_DURATION_DAYS: &str = "analysis_duration_days";
    pub const BUILD_ID: &str = "build_id";
    pub const BUILD_VARIANT: &str = "build_variant";
    pub const DEPENDS_ON: &str = "depends_on";
    pub const FALLBACK_NUM_SUB_SUITES: &str = "fallback_num_sub_suites";
    pub const GENERATED_CONFIG_DIR: &str = "generated_config_dir";
    pub const IS_PATCH: &str = "is_patch";
    pub const LARGE_DISTRO_NAME: &str = "large_distro_name";
    pub const MAX_SUB_SUITES: &str = "max_sub_suites";
    pub const PROJECT: &str = "project";
    pub const REPEAT_SUITES: &str = "resmoke_repeat_suites";
    pub const RESMOKE_ARGS: &str = "resmoke_args";
    pub const RESMOKE_JOBS_MAX: &str = "resmoke_jobs_max";
    pub const RUN_MULTIPLE_JOBS: &str = "run_multiple_jobs";
    pub const SUITE: &str = "suite";
    pub const TARGET_RESMOKE_TIME: &str = "target_resmoke_time";
    pub const TASK: &str = "task";
    pub const TEST_SUITE_DIR: &str = "test_suite_dir";
    pub const USE_DEFAULT_TIMEOUTS: &str = "use_default_timeouts";
    pub const USE_LARGE_DISTRO: &str = "use_large_distro";
    pub const USE_MULTIVERSION: &str = "use_multiversion";
}

/// Longest accepted target runtime per task, in minutes (one week).
pub const MAX_TARGET_RESMOKE_TIME: u64 = 7 * 24 * 60;

/// Most repetitions accepted for one generated suite.
pub const MAX_REPEAT_SUITES: u64 = 1_000;

/// Longest accepted history window, in days.
pub const MAX_ANALYSIS_DURATION_DAYS: i64 = 365;

/// Errors produced while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required option was not provided by any source.
    #[error("Missing required configuration value: {0}")]
    MissingRequired(&'static str),

    /// An option was provided but could not be interpreted.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Resolved configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigOptions {
    /// Build whose already-scheduled tasks are matched for dependencies.
    pub build_id: Option<String>,

    /// Task names whose generated sub-tasks the new tasks depend on.
    pub depends_on: Vec<String>,

    /// Number of suites to create when no usable history exists.
    pub fallback_num_sub_suites: usize,

    /// Whether this run belongs to a patch build.
    ///
    /// Cross-task dependencies are only declared outside patch builds.
    pub is_patch: bool,

    /// Distro to run generated tasks on when `use_large_distro` is set.
    pub large_distro_name: Option<String>,

    /// Upper bound on the number of generated suites.
    pub max_sub_suites: Option<usize>,

    /// Project whose history is analyzed.
    pub project: String,

    /// How many times each generated suite is repeated.
    pub repeat_suites: u64,

    /// Extra arguments passed to every test invocation.
    pub resmoke_args: String,

    /// Optional cap on test runner jobs, passed through verbatim.
    pub resmoke_jobs_max: Option<String>,

    /// Whether the test runner may use multiple jobs, passed through verbatim.
    pub run_multiple_jobs: String,

    /// Name of the suite definition being split.
    pub suite: String,

    /// Target runtime per generated task, in minutes.
    pub target_resmoke_time: u64,

    /// Name of the task being split.
    pub task: String,

    /// Skip history-derived timeout overrides.
    pub use_default_timeouts: bool,

    /// Run generated tasks on `large_distro_name`.
    pub use_large_distro: bool,

    /// Task path suffix for multiversion tasks, if any.
    pub use_multiversion: Option<String>,

    /// Build variant being generated for.
    pub variant: String,

    /// Number of days of history to analyze.
    pub analysis_duration_days: i64,

    /// Directory holding the source suite definitions.
    pub test_suite_dir: PathBuf,

    /// Directory generated suite files and task configuration are written to.
    pub generated_config_dir: PathBuf,
}

impl ConfigOptions {
    /// Target runtime per generated task.
    pub fn target_runtime(&self) -> Duration {
        Duration::from_secs(self.target_resmoke_time * 60)
    }

    /// Whether generated tasks should declare dependencies on other tasks.
    pub fn wants_task_dependencies(&self) -> bool {
        !self.is_patch && !self.depends_on.is_empty()
    }
}

pub(crate) fn default_target_resmoke_time() -> u64 {
    60
}

pub(crate) fn default_repeat_suites() -> u64 {
    1
}

pub(crate) fn default_run_multiple_jobs() -> String {
    "true".to_string()
}

pub(crate) fn default_analysis_duration_days() -> i64 {
    14
}

pub(crate) fn default_test_suite_dir() -> PathBuf {
    PathBuf::from("buildscripts/resmokeconfig/suites")
}

pub(crate) fn default_generated_config_dir() -> PathBuf {
    PathBuf::from("generated_resmoke_config")
}
