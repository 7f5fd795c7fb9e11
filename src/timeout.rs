//! Timeout derivation from historical runtimes.
//!
//! Each generated task gets two limits: `timeout_secs`, which bounds how long
//! a single test may go without output, derived from the suite's slowest
//! test; and `exec_timeout_secs`, which bounds the whole task, derived from
//! the suite's total runtime. Both are scaled by the repeat factor.
//!
//! # Example
//!
//! ```
//! use suitesplit::timeout::{calculate_timeout, round_to_minute};
//!
//! assert_eq!(round_to_minute(400.0), 420);
//! assert_eq!(calculate_timeout(400.0, 3), 1260);
//! assert_eq!(calculate_timeout(10.0, 3), 900); // 5 minute floor
//! ```

use serde::Serialize;
use tracing::debug;

use crate::suite::Suite;

/// Lower bound for any computed timeout, before scaling.
pub const MIN_TIMEOUT_SECS: u64 = 5 * 60;

/// Scaling applied to both the per-test and whole-task timeouts.
pub const TIMEOUT_SCALING_FACTOR: u64 = 3;

/// Rounds seconds up to the next whole minute.
///
/// A value already on a minute boundary still advances a full minute, so
/// `round_to_minute(60.0) == 120`.
pub fn round_to_minute(runtime: f64) -> u64 {
    let distance_to_min = 60.0 - runtime.rem_euclid(60.0);
    (runtime + distance_to_min).ceil() as u64
}

/// Computes a timeout from an average runtime and a scaling factor.
pub fn calculate_timeout(avg_runtime: f64, scaling_factor: u64) -> u64 {
    MIN_TIMEOUT_SECS
        .max(round_to_minute(avg_runtime))
        .saturating_mul(scaling_factor)
}

/// Timeout values that replace the task defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutOverride {
    /// Per-test idle timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Whole-task execution timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_timeout_secs: Option<u64>,
}

impl TimeoutOverride {
    /// Derives overrides for a suite, scaled by `repeat_factor`.
    ///
    /// Returns `None` unless every test in the suite has runtime history,
    /// or if both runtimes are zero.
    pub fn for_suite(suite: &Suite, repeat_factor: u64) -> Option<Self> {
        if !suite.should_overwrite_timeout() {
            return None;
        }
        Self::from_runtimes(suite.max_runtime(), suite.runtime(), repeat_factor)
    }

    /// Derives overrides from a worst-case test runtime and total runtime.
    pub fn from_runtimes(
        max_test_runtime: f64,
        expected_suite_runtime: f64,
        repeat_factor: u64,
    ) -> Option<Self> {
        let timeout_secs = (max_test_runtime > 0.0).then(|| {
            let timeout = calculate_timeout(max_test_runtime, TIMEOUT_SCALING_FACTOR)
                .saturating_mul(repeat_factor);
            debug!(
                "Setting timeout to: {} (max={}, repeat={})",
                timeout, max_test_runtime, repeat_factor
            );
            timeout
        });

        let exec_timeout_secs = (expected_suite_runtime > 0.0).then(|| {
            let timeout =
                calculate_timeout(expected_suite_runtime, TIMEOUT_SCALING_FACTOR)
                    .saturating_mul(repeat_factor);
            debug!(
                "Setting exec_timeout to: {} (runtime={}, repeat={})",
                timeout, expected_suite_runtime, repeat_factor
            );
            timeout
        });

        if timeout_secs.is_none() && exec_timeout_secs.is_none() {
            return None;
        }

        Some(Self {
            timeout_secs,
            exec_timeout_secs,
        })
    }
}
