//! Configuration loading and resolution for suitesplit.
//!
//! Options are collected into [`ConfigLayer`]s, flat maps of key to string
//! value, and resolved into one [`ConfigOptions`]. Earlier layers win:
//!
//! ```text
//! CLI flags ──► config file ──► defaults
//! ```
//!
//! Config files are either Evergreen expansions files (YAML) or TOML, chosen
//! by extension. Scalars are coerced to strings, sequences of scalars are
//! joined with `,`, and nested maps are ignored. Empty values count as absent.

pub mod schema;

pub use schema::*;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

/// Result type for configuration resolution.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// One source of configuration values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    values: BTreeMap<String, String>,
}

impl ConfigLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` if `value` is present, builder style.
    pub fn with<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value.to_string());
        }
        self
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value for `key`, treating empty strings as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Number of keys in the layer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the layer holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parses a YAML mapping, such as an Evergreen expansions file.
    ///
    /// An empty document yields an empty layer.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).context("Failed to parse YAML config")?;

        let mut layer = Self::new();
        if let serde_yaml::Value::Mapping(map) = value {
            for (key, value) in map {
                let Some(key) = yaml_scalar(&key) else {
                    continue;
                };
                if let Some(value) = yaml_value(&value) {
                    layer.insert(key, value);
                }
            }
        }
        Ok(layer)
    }

    /// Parses a TOML table.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("Failed to parse TOML config")?;

        let mut layer = Self::new();
        for (key, value) in table {
            if let Some(value) = toml_value(&value) {
                layer.insert(key, value);
            }
        }
        Ok(layer)
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn yaml_value(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Sequence(items) => {
            Some(items.iter().filter_map(yaml_scalar).collect::<Vec<_>>().join(","))
        }
        other => yaml_scalar(other),
    }
}

fn toml_scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        _ => None,
    }
}

fn toml_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::Array(items) => {
            Some(items.iter().filter_map(toml_scalar).collect::<Vec<_>>().join(","))
        }
        other => toml_scalar(other),
    }
}

/// Loads a configuration layer from a file.
///
/// `.toml` files are parsed as TOML; anything else as YAML.
///
/// # Example
///
/// ```no_run
/// use suitesplit::config::load_config_file;
/// use std::path::Path;
///
/// let layer = load_config_file(Path::new("expansions.yml"))?;
/// println!("{} keys", layer.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let layer = if is_toml {
        ConfigLayer::from_toml_str(&content)
    } else {
        ConfigLayer::from_yaml_str(&content)
    };

    layer.with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parses a boolean the way Evergreen expansions spell them.
///
/// Accepts `y/yes/t/true/on/1` and `n/no/f/false/off/0`, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Resolves layers, highest priority first, into [`ConfigOptions`].
///
/// # Example
///
/// ```
/// use suitesplit::config::{resolve, ConfigLayer};
///
/// let cli = ConfigLayer::new()
///     .with("task", Some("jsCore"))
///     .with("project", Some("mongodb-mongo-master"))
///     .with("build_variant", Some("linux-64"))
///     .with("fallback_num_sub_suites", Some(4));
///
/// let options = resolve(&[&cli])?;
/// assert_eq!(options.suite, "jsCore");
/// assert_eq!(options.target_resmoke_time, 60);
/// # Ok::<(), suitesplit::config::ConfigError>(())
/// ```
pub fn resolve(layers: &[&ConfigLayer]) -> ConfigResult<ConfigOptions> {
    let r = Resolver { layers };

    let task = r.required(keys::TASK)?;
    let project = r.required(keys::PROJECT)?;
    let variant = r.required(keys::BUILD_VARIANT)?;

    let fallback_num_sub_suites: usize = r
        .parse(keys::FALLBACK_NUM_SUB_SUITES)?
        .ok_or(ConfigError::MissingRequired(keys::FALLBACK_NUM_SUB_SUITES))?;
    if fallback_num_sub_suites == 0 {
        return Err(r.invalid(keys::FALLBACK_NUM_SUB_SUITES, "must be at least 1"));
    }

    let repeat_suites = r.ranged(
        keys::REPEAT_SUITES,
        default_repeat_suites(),
        1..=MAX_REPEAT_SUITES,
    )?;
    let target_resmoke_time = r.ranged(
        keys::TARGET_RESMOKE_TIME,
        default_target_resmoke_time(),
        1..=MAX_TARGET_RESMOKE_TIME,
    )?;
    let analysis_duration_days = r.ranged(
        keys::ANALYSIS_DURATION_DAYS,
        default_analysis_duration_days(),
        1..=MAX_ANALYSIS_DURATION_DAYS,
    )?;

    let max_sub_suites = r
        .parse::<usize>(keys::MAX_SUB_SUITES)?
        .filter(|&max| max > 0);

    let depends_on = r
        .get(keys::DEPENDS_ON)
        .map(|deps| {
            deps.split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(ConfigOptions {
        build_id: r.optional(keys::BUILD_ID),
        depends_on,
        fallback_num_sub_suites,
        is_patch: r.flag(keys::IS_PATCH)?,
        large_distro_name: r.optional(keys::LARGE_DISTRO_NAME),
        max_sub_suites,
        project,
        repeat_suites,
        resmoke_args: r.optional(keys::RESMOKE_ARGS).unwrap_or_default(),
        resmoke_jobs_max: r.optional(keys::RESMOKE_JOBS_MAX),
        run_multiple_jobs: r
            .optional(keys::RUN_MULTIPLE_JOBS)
            .unwrap_or_else(default_run_multiple_jobs),
        suite: r.optional(keys::SUITE).unwrap_or_else(|| task.clone()),
        target_resmoke_time,
        task,
        use_default_timeouts: r.flag(keys::USE_DEFAULT_TIMEOUTS)?,
        use_large_distro: r.flag(keys::USE_LARGE_DISTRO)?,
        use_multiversion: r.optional(keys::USE_MULTIVERSION),
        variant,
        analysis_duration_days,
        test_suite_dir: r
            .optional(keys::TEST_SUITE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_test_suite_dir),
        generated_config_dir: r
            .optional(keys::GENERATED_CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_generated_config_dir),
    })
}

struct Resolver<'a> {
    layers: &'a [&'a ConfigLayer],
}

impl Resolver<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).map(String::from)
    }

    fn required(&self, key: &'static str) -> ConfigResult<String> {
        self.optional(key).ok_or(ConfigError::MissingRequired(key))
    }

    fn parse<T: FromStr>(&self, key: &'static str) -> ConfigResult<Option<T>>
    where
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|value| {
                value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Parses `key`, falling back to `default`, and rejects values outside `range`.
    fn ranged<T>(&self, key: &'static str, default: T, range: RangeInclusive<T>) -> ConfigResult<T>
    where
        T: FromStr + PartialOrd + fmt::Display,
        T::Err: fmt::Display,
    {
        let value = self.parse(key)?.unwrap_or(default);
        if !range.contains(&value) {
            return Err(ConfigError::Invalid {
                key,
                value: value.to_string(),
                reason: format!("must be between {} and {}", range.start(), range.end()),
            });
        }
        Ok(value)
    }

    fn flag(&self, key: &'static str) -> ConfigResult<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(value) => parse_bool(value).ok_or_else(|| ConfigError::Invalid {
                key,
                value: value.to_string(),
                reason: "expected a boolean".to_string(),
            }),
        }
    }

    fn invalid(&self, key: &'static str, reason: &str) -> ConfigError {
        ConfigError::Invalid {
            key,
            value: self.get(key).unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }
}
