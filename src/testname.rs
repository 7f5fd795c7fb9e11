//! Naming helpers for test files, hook records, and generated tasks.
//!
//! Historical statistics identify tests by the file path they were run
//! from, which may use either path separator depending on the host that
//! produced them. Hooks are reported under `<test_name>:<hook_name>`, where
//! `test_name` is the short name (basename without extension) of the test
//! the hook ran around.
//!
//! # Example
//!
//! ```
//! use suitesplit::testname::{name_generated_task, normalize_test_file, split_hook_name};
//!
//! assert_eq!(normalize_test_file("jstests\\core\\find.js"), "jstests/core/find.js");
//! assert_eq!(split_hook_name("find:CleanEveryN"), Some(("find", "CleanEveryN")));
//! assert_eq!(name_generated_task("core", 3, 12, Some("linux")), "core_03_linux");
//! ```

use std::path::Path;

/// Separator between the test name and hook name in hook records.
const HOOK_DELIMITER: char = ':';

/// Normalizes a test file reported by Windows or POSIX hosts to `/` separators.
pub fn normalize_test_file(test_file: &str) -> String {
    test_file.replace('\\', "/")
}

/// Splits a hook record into `(test_name, hook_name)`.
///
/// Returns `None` if the record is not a hook.
pub fn split_hook_name(hook_file: &str) -> Option<(&str, &str)> {
    hook_file.split_once(HOOK_DELIMITER)
}

/// Returns the short name a test is known by in hook records.
///
/// This is the basename of the test file without its extension, so
/// `jstests/core/find.js` becomes `find`.
pub fn short_name_from_test_file(test_file: &str) -> String {
    let normalized = normalize_test_file(test_file);
    Path::new(&normalized)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or(normalized)
}

/// Builds the name of a generated sub-suite or sub-task.
///
/// The index is zero-padded to the number of digits needed for
/// `total_tasks` so names sort in generation order. An optional variant is
/// appended as a suffix.
pub fn name_generated_task(
    parent_name: &str,
    task_index: usize,
    total_tasks: usize,
    variant: Option<&str>,
) -> String {
    let width = index_width(total_tasks);
    let suffix = variant.map(|v| format!("_{}", v)).unwrap_or_default();
    format!("{}_{:0width$}{}", parent_name, task_index, suffix, width = width)
}

/// Smallest `w` with `10^w >= total`, i.e. `ceil(log10(total))`.
fn index_width(total: usize) -> usize {
    let mut width = 0;
    let mut bound: usize = 1;
    while bound < total {
        bound = bound.saturating_mul(10);
        width += 1;
    }
    width
}
