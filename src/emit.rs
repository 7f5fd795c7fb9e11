//! Emission of generated suite files and task configuration.
//!
//! | Module | Output |
//! |--------|--------|
//! | [`suite_file`] | `{config_dir}/{sub_suite}.yml`, one per suite plus `{suite}_misc.yml` |
//! | [`task_config`] | `{config_dir}/{task}.json`, the task graph for the CI system |

pub mod suite_file;
pub mod task_config;

pub use suite_file::{SelectorUpdate, SuiteDefinition, misc_suite_name, sub_suite_names};
pub use task_config::{EvergreenConfig, TaskConfigGenerator, write_task_config};

use std::path::PathBuf;

/// Errors that can occur while emitting configuration.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A source file could not be read.
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// A source suite definition is not valid YAML.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A suite definition has no `selector` mapping to rewrite.
    #[error("Suite definition {path} has no selector mapping")]
    MissingSelector { path: PathBuf },

    /// An output file could not be written.
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A dependency pattern could not be compiled.
    #[error("Invalid dependency pattern: {0}")]
    Pattern(String),
}

/// Result type for emit operations.
pub type EmitResult<T> = std::result::Result<T, EmitError>;

pub(crate) fn write_file(path: PathBuf, content: &str) -> EmitResult<PathBuf> {
    std::fs::write(&path, content).map_err(|e| EmitError::Write {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(path)
}
