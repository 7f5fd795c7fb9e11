//! Generated resmoke suite files.
//!
//! Every generated file is a copy of the source suite definition with its
//! `selector` rewritten:
//!
//! ```text
//! source: selector.roots = [jstests/core/**/*.js]
//!
//! jsCore_0.yml    roots = [a.js, c.js]           (exclude_files removed)
//! jsCore_1.yml    roots = [b.js]                 (exclude_files removed)
//! jsCore_misc.yml exclude_files += [a.js, b.js, c.js]
//! ```
//!
//! The misc suite keeps the source roots and excludes every test already
//! assigned, so tests added after the history window still run somewhere.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{EmitError, EmitResult, write_file};
use crate::suite::Suite;
use crate::testname;

const ROOTS: &str = "roots";
const EXCLUDE_FILES: &str = "exclude_files";

/// How a generated file rewrites the source selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorUpdate {
    /// Run exactly these tests; any `exclude_files` is dropped.
    Roots(Vec<String>),

    /// Run the source roots minus these tests.
    ///
    /// An empty list leaves the source's `exclude_files` untouched.
    Excludes(Vec<String>),
}

/// Names of the sub-suite files for `count` suites split from `suite_name`.
pub fn sub_suite_names(suite_name: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| testname::name_generated_task(suite_name, idx, count, None))
        .collect()
}

/// Name of the misc suite file for `suite_name`.
pub fn misc_suite_name(suite_name: &str) -> String {
    format!("{}_misc", suite_name)
}

/// Applies `update` to the `selector` mapping of a suite document.
pub fn update_suite_config(selector: &mut Mapping, update: &SelectorUpdate) {
    match update {
        SelectorUpdate::Roots(tests) => {
            selector.insert(ROOTS.into(), to_sequence(tests));
            selector.remove(EXCLUDE_FILES);
        }
        SelectorUpdate::Excludes(tests) if tests.is_empty() => {}
        SelectorUpdate::Excludes(tests) => {
            let extended = match selector.get_mut(EXCLUDE_FILES) {
                Some(Value::Sequence(existing)) if !existing.is_empty() => {
                    existing.extend(tests.iter().cloned().map(Value::String));
                    true
                }
                _ => false,
            };
            if !extended {
                selector.insert(EXCLUDE_FILES.into(), to_sequence(tests));
            }
        }
    }
}

fn to_sequence(tests: &[String]) -> Value {
    Value::Sequence(tests.iter().cloned().map(Value::String).collect())
}

/// A source suite definition, loaded once and rendered many times.
#[derive(Debug, Clone)]
pub struct SuiteDefinition {
    source: PathBuf,
    document: Value,
}

impl SuiteDefinition {
    /// Loads and validates a suite definition file.
    pub fn load(path: &Path) -> EmitResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EmitError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    /// Parses a suite definition, recording `source` for the file header.
    pub fn parse(source: &Path, content: &str) -> EmitResult<Self> {
        let document: Value = serde_yaml::from_str(content).map_err(|e| EmitError::Parse {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        if !document.get("selector").is_some_and(Value::is_mapping) {
            return Err(EmitError::MissingSelector {
                path: source.to_path_buf(),
            });
        }

        Ok(Self {
            source: source.to_path_buf(),
            document,
        })
    }

    /// Path the definition was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns a copy of the document with its selector rewritten.
    pub fn updated(&self, update: &SelectorUpdate) -> EmitResult<Value> {
        let mut document = self.document.clone();
        let selector = document
            .get_mut("selector")
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| EmitError::MissingSelector {
                path: self.source.clone(),
            })?;
        update_suite_config(selector, update);
        Ok(document)
    }

    /// Renders a generated suite file, header included.
    pub fn render(&self, update: &SelectorUpdate) -> EmitResult<String> {
        let document = self.updated(update)?;
        let body =
            serde_yaml::to_string(&document).map_err(|e| EmitError::Serialize(e.to_string()))?;

        Ok(format!(
            "# DO NOT EDIT THIS FILE. All manual edits will be lost.\n\
             # This file was generated by {} from\n\
             # {}.\n{}",
            env!("CARGO_PKG_NAME"),
            self.source.display(),
            body
        ))
    }

    /// Writes `{dir}/{name}.yml` and returns its path.
    pub fn write(&self, dir: &Path, name: &str, update: &SelectorUpdate) -> EmitResult<PathBuf> {
        let content = self.render(update)?;
        let path = dir.join(format!("{}.yml", name));
        debug!("Writing suite file {}", path.display());
        write_file(path, &content)
    }

    /// Writes one file per suite plus the misc file.
    ///
    /// `all_tests` is the list the misc suite excludes. Returns the paths in
    /// suite order, misc last.
    pub fn write_all(
        &self,
        dir: &Path,
        suite_name: &str,
        suites: &[Suite],
        all_tests: &[String],
    ) -> EmitResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(suites.len() + 1);
        for (name, suite) in sub_suite_names(suite_name, suites.len()).iter().zip(suites) {
            let update = SelectorUpdate::Roots(suite.tests().to_vec());
            written.push(self.write(dir, name, &update)?);
        }

        let misc = SelectorUpdate::Excludes(all_tests.to_vec());
        written.push(self.write(dir, &misc_suite_name(suite_name), &misc)?);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = "\
test_kind: js_test
selector:
  roots:
  - jstests/core/**/*.js
  exclude_files:
  - jstests/core/txns/**/*.js
executor:
  config:
    shell_options:
      readMode: commands
";

    fn definition() -> SuiteDefinition {
        SuiteDefinition::parse(Path::new("suites/core.yml"), SOURCE).unwrap()
    }

    fn selector(value: &Value) -> &Mapping {
        value.get("selector").and_then(Value::as_mapping).unwrap()
    }

    fn strings(value: Option<&Value>) -> Vec<String> {
        value
            .and_then(Value::as_sequence)
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_roots_replace_and_drop_excludes() {
        let doc = definition()
            .updated(&SelectorUpdate::Roots(vec!["a.js".into(), "b.js".into()]))
            .unwrap();

        let selector = selector(&doc);
        assert_eq!(strings(selector.get("roots")), vec!["a.js", "b.js"]);
        assert!(selector.get("exclude_files").is_none());
        assert_eq!(doc["test_kind"].as_str(), Some("js_test"));
    }

    #[test]
    fn test_excludes_extend_existing() {
        let doc = definition()
            .updated(&SelectorUpdate::Excludes(vec!["a.js".into()]))
            .unwrap();

        let selector = selector(&doc);
        assert_eq!(strings(selector.get("roots")), vec!["jstests/core/**/*.js"]);
        assert_eq!(
            strings(selector.get("exclude_files")),
            vec!["jstests/core/txns/**/*.js", "a.js"]
        );
    }

    #[test]
    fn test_excludes_created_when_absent() {
        let def = SuiteDefinition::parse(
            Path::new("core.yml"),
            "selector:\n  roots:\n  - x/*.js\n  exclude_files: []\n",
        )
        .unwrap();

        let doc = def
            .updated(&SelectorUpdate::Excludes(vec!["x/a.js".into()]))
            .unwrap();
        assert_eq!(strings(selector(&doc).get("exclude_files")), vec!["x/a.js"]);
    }

    #[test]
    fn test_empty_excludes_keep_source() {
        let doc = definition()
            .updated(&SelectorUpdate::Excludes(Vec::new()))
            .unwrap();
        assert_eq!(
            strings(selector(&doc).get("exclude_files")),
            vec!["jstests/core/txns/**/*.js"]
        );
    }

    #[test]
    fn test_missing_selector_rejected() {
        let err = SuiteDefinition::parse(Path::new("bad.yml"), "test_kind: js_test\n").unwrap_err();
        assert!(matches!(err, EmitError::MissingSelector { .. }));
    }

    #[test]
    fn test_render_has_header() {
        let rendered = definition()
            .render(&SelectorUpdate::Roots(vec!["a.js".into()]))
            .unwrap();

        assert!(rendered.starts_with("# DO NOT EDIT THIS FILE. All manual edits will be lost.\n"));
        assert!(rendered.contains("# suites/core.yml.\n"));

        let body: Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(strings(selector(&body).get("roots")), vec!["a.js"]);
    }

    #[test]
    fn test_write_all() {
        let dir = TempDir::new().unwrap();
        let mut first = Suite::new();
        first.add_test("a.js", 10.0);
        let mut second = Suite::new();
        second.add_test("b.js", 5.0);

        let written = definition()
            .write_all(
                dir.path(),
                "core",
                &[first, second],
                &["a.js".to_string(), "b.js".to_string()],
            )
            .unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["core_0.yml", "core_1.yml", "core_misc.yml"]);

        let misc: Value =
            serde_yaml::from_str(&std::fs::read_to_string(&written[2]).unwrap()).unwrap();
        assert_eq!(
            strings(selector(&misc).get("exclude_files")),
            vec!["jstests/core/txns/**/*.js", "a.js", "b.js"]
        );
    }

    #[test]
    fn test_sub_suite_names() {
        assert_eq!(sub_suite_names("core", 2), vec!["core_0", "core_1"]);
        assert_eq!(sub_suite_names("core", 11)[3], "core_03");
        assert_eq!(misc_suite_name("core"), "core_misc");
    }
}
