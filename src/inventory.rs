//! Discovery of the tests a suite definition selects.
//!
//! A resmoke suite file names its tests through glob patterns:
//!
//! ```yaml
//! selector:
//!   roots:
//!     - jstests/core/**/*.js
//!   exclude_files:
//!     - jstests/core/txns/**/*.js
//! ```
//!
//! [`ResmokeSuiteInventory`] expands `roots` relative to a repository root,
//! drops anything matching `exclude_files`, and returns the survivors in
//! root order with duplicates removed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::testname;

/// Errors that can occur while listing a suite's tests.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The suite definition file could not be read.
    #[error("Failed to read suite definition {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// The suite definition is not valid YAML or lacks a selector.
    #[error("Invalid suite definition {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A root or exclude entry is not a valid glob.
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Result type for inventory operations.
pub type InventoryResult<T> = std::result::Result<T, InventoryError>;

/// Source of the tests that currently belong to a suite.
pub trait TestInventory: Send + Sync {
    /// Lists the suite's tests as normalized paths, ordered and de-duplicated.
    fn list_tests(&self, suite: &str) -> InventoryResult<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct SuiteDocument {
    selector: Selector,
}

#[derive(Debug, Default, Deserialize)]
struct Selector {
    #[serde(default)]
    roots: Vec<String>,
    #[serde(default)]
    exclude_files: Vec<String>,
}

/// Inventory backed by resmoke suite files on disk.
#[derive(Debug, Clone)]
pub struct ResmokeSuiteInventory {
    suite_dir: PathBuf,
    root_dir: PathBuf,
}

impl ResmokeSuiteInventory {
    /// Creates an inventory reading `{suite_dir}/{suite}.yml` and resolving
    /// patterns relative to `root_dir`.
    pub fn new(suite_dir: impl Into<PathBuf>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            suite_dir: suite_dir.into(),
            root_dir: root_dir.into(),
        }
    }

    /// Path of the definition file for `suite`.
    pub fn suite_path(&self, suite: &str) -> PathBuf {
        self.suite_dir.join(format!("{}.yml", suite))
    }

    fn load_selector(&self, suite: &str) -> InventoryResult<Selector> {
        let path = self.suite_path(suite);
        let content = std::fs::read_to_string(&path).map_err(|e| InventoryError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let doc: SuiteDocument =
            serde_yaml::from_str(&content).map_err(|e| InventoryError::Parse {
                path,
                message: e.to_string(),
            })?;
        Ok(doc.selector)
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root_dir).unwrap_or(path);
        testname::normalize_test_file(&rel.to_string_lossy())
    }

    fn expand_root(&self, root: &str) -> InventoryResult<Vec<String>> {
        let pattern = self.root_dir.join(root);
        let pattern = pattern.to_string_lossy();

        let paths = glob::glob(&pattern).map_err(|e| InventoryError::Pattern {
            pattern: root.to_string(),
            message: e.to_string(),
        })?;

        let mut tests: Vec<String> = paths
            .flatten()
            .filter(|p| p.is_file())
            .map(|p| self.relative(&p))
            .collect();
        tests.sort();
        Ok(tests)
    }
}

fn compile_patterns(patterns: &[String]) -> InventoryResult<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(&testname::normalize_test_file(p)).map_err(|e| {
                InventoryError::Pattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                }
            })
        })
        .collect()
}

impl TestInventory for ResmokeSuiteInventory {
    fn list_tests(&self, suite: &str) -> InventoryResult<Vec<String>> {
        let selector = self.load_selector(suite)?;
        let excludes = compile_patterns(&selector.exclude_files)?;

        let mut seen = HashSet::new();
        let mut tests = Vec::new();
        for root in &selector.roots {
            for test in self.expand_root(root)? {
                if excludes.iter().any(|p| p.matches(&test)) {
                    continue;
                }
                if seen.insert(test.clone()) {
                    tests.push(test);
                }
            }
        }

        debug!("Suite {} selects {} tests", suite, tests.len());
        Ok(tests)
    }
}
