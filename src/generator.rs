//! End-to-end generation of sub-suites for one task.
//!
//! # Flow
//!
//! ```text
//!  StatsSource ──► Vec<TestStatsRecord>
//!                        │ (empty / 503 ──► fallback)
//!                        ▼
//!                    TestStats ──► tests_runtimes()
//!                        │
//!  TestInventory ──► filter_existing_tests()
//!                        │ (nothing left ──► fallback)
//!                        ▼
//!                 SuitePartitioner ──► Vec<Suite>
//!                        │
//!                        ▼
//!        suite files + misc file + task graph JSON
//! ```
//!
//! The fallback path lists the suite's tests from the inventory and splits
//! them round-robin into `fallback_num_sub_suites` suites with no runtime
//! information, so none of them receives a timeout override. Fallback suites
//! that end up with no tests are not emitted; the summary reports how many
//! were skipped.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::ConfigOptions;
use crate::emit::{
    SuiteDefinition, TaskConfigGenerator, misc_suite_name, sub_suite_names, write_task_config,
};
use crate::history::{BuildTask, StatsQuery, StatsSource, TestStatsRecord};
use crate::inventory::TestInventory;
use crate::partition::{SuitePartitioner, fallback_partition};
use crate::stats::{TestRuntime, TestStats};
use crate::suite::Suite;
use crate::testname;
use crate::timeout::TimeoutOverride;

/// Why runtime history was not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The service returned no records for the window.
    NoHistory,

    /// None of the tests with history are still part of the suite.
    NoCurrentTests,

    /// The service answered HTTP 503.
    ServiceUnavailable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoHistory => write!(f, "no test history"),
            FallbackReason::NoCurrentTests => write!(f, "no tests with history remain in the suite"),
            FallbackReason::ServiceUnavailable(msg) => {
                write!(f, "statistics service unavailable ({})", msg)
            }
        }
    }
}

/// Where the suite layout came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSource {
    /// Greedy packing over historical runtimes.
    History,

    /// Round-robin split without runtime data.
    Fallback(FallbackReason),
}

impl PartitionSource {
    /// Returns true for the fallback path.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PartitionSource::Fallback(_))
    }
}

/// Suites computed for a task, before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSuites {
    /// Sub-suites in generation order.
    pub suites: Vec<Suite>,

    /// Tests the misc suite excludes.
    pub test_list: Vec<String>,

    /// How the suites were computed.
    pub source: PartitionSource,

    /// Fallback suites left without tests and not emitted.
    pub empty_suites_dropped: usize,
}

/// Per-suite line of a [`GenerationSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteSummary {
    /// Generated suite file name, without extension.
    pub suite_name: String,

    /// Generated task name.
    pub task_name: String,

    /// Number of tests assigned to the suite.
    pub test_count: usize,

    /// Expected runtime in seconds.
    pub runtime: f64,

    /// Timeouts the task will run with, if overridden.
    pub timeouts: Option<TimeoutOverride>,

    /// Tests in the order they run.
    pub tests: Vec<String>,
}

/// Files written by [`SuiteGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFiles {
    /// Sub-suite files in suite order, misc file last.
    pub suite_files: Vec<PathBuf>,

    /// Task graph JSON file.
    pub task_config: PathBuf,
}

/// Outcome of a plan or generate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Task that was split.
    pub task: String,

    /// Build variant the tasks were generated for.
    pub variant: String,

    /// How the suites were computed.
    pub source: PartitionSource,

    /// Generated suites in order.
    pub suites: Vec<SuiteSummary>,

    /// Fallback suites left without tests and not emitted.
    pub empty_suites_dropped: usize,

    /// Name of the misc suite catching tests without history.
    pub misc_suite: String,

    /// `None` for a plan, which writes nothing.
    pub files: Option<GeneratedFiles>,
}

impl GenerationSummary {
    /// Number of tests assigned to generated suites, misc excluded.
    pub fn total_tests(&self) -> usize {
        self.suites.iter().map(|s| s.test_count).sum()
    }
}

/// Splits one task into sub-suites and emits their configuration.
///
/// # Type Parameters
///
/// - `S`: The statistics source
/// - `I`: The test inventory
pub struct SuiteGenerator<S, I> {
    options: ConfigOptions,
    source: S,
    inventory: I,
}

impl<S, I> SuiteGenerator<S, I>
where
    S: StatsSource,
    I: TestInventory,
{
    /// Creates a generator over resolved options.
    pub fn new(options: ConfigOptions, source: S, inventory: I) -> Self {
        Self {
            options,
            source,
            inventory,
        }
    }

    /// Resolved options this generator runs with.
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Computes suites from the history window ending at `end`.
    ///
    /// Falls back when there is no history or the service is unavailable.
    /// Any other statistics error is returned.
    pub async fn calculate_suites(&self, end: DateTime<Utc>) -> Result<GeneratedSuites> {
        let options = &self.options;
        let query = StatsQuery::for_window(
            &options.project,
            &options.task,
            &options.variant,
            end,
            options.analysis_duration_days,
        );
        debug!(
            "Querying {} for {} to {}",
            self.source.name(),
            query.after_date,
            query.before_date
        );

        match self.source.test_stats(&query).await {
            Ok(records) if records.is_empty() => {
                info!("No test history found, using fallback");
                self.calculate_fallback_suites(FallbackReason::NoHistory)
            }
            Ok(records) => self.calculate_suites_from_stats(&records),
            Err(e) if e.is_service_unavailable() => {
                warn!("Statistics service unavailable, using fallback: {}", e);
                self.calculate_fallback_suites(FallbackReason::ServiceUnavailable(e.to_string()))
            }
            Err(e) => Err(e).with_context(|| {
                format!("Failed to fetch test statistics from {}", self.source.name())
            }),
        }
    }

    /// Computes suites from already-fetched statistics records.
    pub fn calculate_suites_from_stats(
        &self,
        records: &[TestStatsRecord],
    ) -> Result<GeneratedSuites> {
        let stats = TestStats::from_records(records);
        let runtimes = self.filter_existing_tests(stats.tests_runtimes())?;

        if runtimes.is_empty() {
            info!("No tests with history are still in the suite, using fallback");
            return self.calculate_fallback_suites(FallbackReason::NoCurrentTests);
        }

        let suites = SuitePartitioner::new(self.options.target_runtime())
            .with_max_suites(self.options.max_sub_suites)
            .partition(&runtimes);
        info!(
            "Split {} tests into {} suites using history",
            runtimes.len(),
            suites.len()
        );

        Ok(GeneratedSuites {
            suites,
            test_list: runtimes.into_iter().map(|t| t.test_file).collect(),
            source: PartitionSource::History,
            empty_suites_dropped: 0,
        })
    }

    /// Drops tests that are no longer part of the suite.
    pub fn filter_existing_tests(&self, runtimes: Vec<TestRuntime>) -> Result<Vec<TestRuntime>> {
        let current: HashSet<String> = self.list_tests()?.into_iter().collect();

        Ok(runtimes
            .into_iter()
            .filter(|t| {
                let keep = current.contains(&testname::normalize_test_file(&t.test_file));
                if !keep {
                    debug!("Dropping stale test {}", t.test_file);
                }
                keep
            })
            .collect())
    }

    /// Splits the suite's current tests without runtime information.
    pub fn calculate_fallback_suites(&self, reason: FallbackReason) -> Result<GeneratedSuites> {
        let test_list = self.list_tests()?;
        let mut suites = fallback_partition(&test_list, self.options.fallback_num_sub_suites);
        let requested = suites.len();
        suites.retain(|s| !s.is_empty());
        let empty_suites_dropped = requested - suites.len();
        if empty_suites_dropped > 0 {
            debug!(
                "Skipping {} empty fallback suites out of {}",
                empty_suites_dropped, requested
            );
        }
        info!(
            "Split {} tests into {} suites ({})",
            test_list.len(),
            suites.len(),
            reason
        );

        Ok(GeneratedSuites {
            suites,
            test_list,
            source: PartitionSource::Fallback(reason),
            empty_suites_dropped,
        })
    }

    fn list_tests(&self) -> Result<Vec<String>> {
        self.inventory
            .list_tests(&self.options.suite)
            .with_context(|| format!("Failed to list tests for suite {}", self.options.suite))
    }

    /// Computes suites without writing anything.
    pub async fn plan(&self, end: DateTime<Utc>) -> Result<GenerationSummary> {
        let span = info_span!("generate", task = %self.options.task, variant = %self.options.variant);
        self.plan_inner(end).instrument(span).await
    }

    async fn plan_inner(&self, end: DateTime<Utc>) -> Result<GenerationSummary> {
        let generated = self.calculate_suites(end).await?;
        Ok(self.summarize(generated, None))
    }

    /// Computes suites and writes suite files and the task graph.
    pub async fn generate(&self, end: DateTime<Utc>) -> Result<GenerationSummary> {
        let span = info_span!("generate", task = %self.options.task, variant = %self.options.variant);
        self.generate_inner(end).instrument(span).await
    }

    async fn generate_inner(&self, end: DateTime<Utc>) -> Result<GenerationSummary> {
        let options = &self.options;
        let config_dir = &options.generated_config_dir;
        std::fs::create_dir_all(config_dir).with_context(|| {
            format!("Failed to create output directory: {}", config_dir.display())
        })?;

        let generated = self.calculate_suites(end).await?;

        let source_path = options.test_suite_dir.join(format!("{}.yml", options.suite));
        let definition = SuiteDefinition::load(&source_path)?;
        let suite_files = definition
            .write_all(
                config_dir,
                &options.suite,
                &generated.suites,
                &generated.test_list,
            )
            .context("Failed to write suite files")?;

        let build_tasks = self.fetch_build_tasks().await?;
        let config = TaskConfigGenerator::new(options, &build_tasks).generate(&generated.suites)?;
        let task_config = write_task_config(&config, config_dir, &options.task)
            .context("Failed to write task configuration")?;
        info!(
            "Generated {} tasks into {}",
            config.tasks.len(),
            task_config.display()
        );

        Ok(self.summarize(
            generated,
            Some(GeneratedFiles {
                suite_files,
                task_config,
            }),
        ))
    }

    async fn fetch_build_tasks(&self) -> Result<Vec<BuildTask>> {
        if !self.options.wants_task_dependencies() {
            return Ok(Vec::new());
        }

        let Some(build_id) = &self.options.build_id else {
            warn!("depends_on is set but no build_id was given, only depending on compile");
            return Ok(Vec::new());
        };

        self.source
            .tasks_by_build_id(build_id)
            .await
            .with_context(|| format!("Failed to fetch tasks for build {}", build_id))
    }

    fn summarize(
        &self,
        generated: GeneratedSuites,
        files: Option<GeneratedFiles>,
    ) -> GenerationSummary {
        let options = &self.options;
        let total = generated.suites.len();
        let names = sub_suite_names(&options.suite, total);

        let suites = generated
            .suites
            .iter()
            .zip(names)
            .enumerate()
            .map(|(idx, (suite, suite_name))| SuiteSummary {
                suite_name,
                task_name: testname::name_generated_task(
                    &options.task,
                    idx,
                    total,
                    Some(&options.variant),
                ),
                test_count: suite.test_count(),
                runtime: suite.runtime(),
                timeouts: if options.use_default_timeouts {
                    None
                } else {
                    TimeoutOverride::for_suite(suite, options.repeat_suites)
                },
                tests: suite.tests().to_vec(),
            })
            .collect();

        GenerationSummary {
            task: options.task.clone(),
            variant: options.variant.clone(),
            source: generated.source,
            suites,
            empty_suites_dropped: generated.empty_suites_dropped,
            misc_suite: misc_suite_name(&options.suite),
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, keys, resolve};
    use crate::history::{HistoryError, HistoryResult};
    use crate::inventory::InventoryResult;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tempfile::TempDir;

    enum Behavior {
        Records(Vec<TestStatsRecord>),
        Unavailable,
        Broken,
    }

    struct FakeSource {
        behavior: Behavior,
        build_tasks: Vec<BuildTask>,
        queries: Mutex<Vec<StatsQuery>>,
        build_lookups: Mutex<usize>,
    }

    impl FakeSource {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                build_tasks: Vec::new(),
                queries: Mutex::new(Vec::new()),
                build_lookups: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl StatsSource for FakeSource {
        async fn test_stats(&self, query: &StatsQuery) -> HistoryResult<Vec<TestStatsRecord>> {
            self.queries.lock().unwrap().push(query.clone());
            match &self.behavior {
                Behavior::Records(records) => Ok(records.clone()),
                Behavior::Unavailable => {
                    Err(HistoryError::ServiceUnavailable("503 Service Unavailable".into()))
                }
                Behavior::Broken => Err(HistoryError::Status {
                    status: 500,
                    message: "boom".into(),
                }),
            }
        }

        async fn tasks_by_build_id(&self, _build_id: &str) -> HistoryResult<Vec<BuildTask>> {
            *self.build_lookups.lock().unwrap() += 1;
            Ok(self.build_tasks.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct StaticInventory(Vec<String>);

    impl TestInventory for StaticInventory {
        fn list_tests(&self, _suite: &str) -> InventoryResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    fn inventory(tests: &[&str]) -> StaticInventory {
        StaticInventory(tests.iter().map(|t| t.to_string()).collect())
    }

    fn options(extra: &[(&str, &str)]) -> ConfigOptions {
        let mut layer = ConfigLayer::new()
            .with(keys::TASK, Some("jsCore"))
            .with(keys::PROJECT, Some("mongodb-mongo-master"))
            .with(keys::BUILD_VARIANT, Some("linux-64"))
            .with(keys::FALLBACK_NUM_SUB_SUITES, Some(2))
            .with(keys::TARGET_RESMOKE_TIME, Some(10));
        for (key, value) in extra {
            layer.insert(*key, *value);
        }
        resolve(&[&layer]).unwrap()
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn record(test_file: &str, duration: f64) -> TestStatsRecord {
        TestStatsRecord::new(test_file, duration, 1)
    }

    #[tokio::test]
    async fn test_history_partition() {
        let source = FakeSource::new(Behavior::Records(vec![
            record("jstests/core/a.js", 500.0),
            record("jstests/core/b.js", 200.0),
            record("jstests/core/c.js", 150.0),
        ]));
        let generator = SuiteGenerator::new(
            options(&[]),
            source,
            inventory(&["jstests/core/a.js", "jstests/core/b.js", "jstests/core/c.js"]),
        );

        let generated = generator.calculate_suites(end()).await.unwrap();
        assert_eq!(generated.source, PartitionSource::History);
        assert_eq!(generated.suites.len(), 2);
        assert_eq!(generated.suites[0].tests(), ["jstests/core/a.js"]);
        assert_eq!(
            generated.suites[1].tests(),
            ["jstests/core/b.js", "jstests/core/c.js"]
        );

        let queries = generator.source.queries.lock().unwrap();
        assert_eq!(queries[0].tasks, vec!["jsCore"]);
        assert_eq!(queries[0].group_num_days, 14);
    }

    #[tokio::test]
    async fn test_stale_tests_filtered() {
        let source = FakeSource::new(Behavior::Records(vec![
            record("jstests\\core\\a.js", 100.0),
            record("jstests/core/deleted.js", 100.0),
        ]));
        let generator =
            SuiteGenerator::new(options(&[]), source, inventory(&["jstests/core/a.js"]));

        let generated = generator.calculate_suites(end()).await.unwrap();
        assert_eq!(generated.test_list, vec!["jstests/core/a.js"]);
        assert_eq!(generated.suites.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_history_falls_back() {
        let generator = SuiteGenerator::new(
            options(&[]),
            FakeSource::new(Behavior::Records(Vec::new())),
            inventory(&["a.js", "b.js", "c.js"]),
        );

        let generated = generator.calculate_suites(end()).await.unwrap();
        assert_eq!(
            generated.source,
            PartitionSource::Fallback(FallbackReason::NoHistory)
        );
        assert_eq!(generated.suites.len(), 2);
        assert_eq!(generated.test_list, vec!["a.js", "b.js", "c.js"]);
        assert!(generated.suites.iter().all(|s| !s.should_overwrite_timeout()));
    }

    #[tokio::test]
    async fn test_fallback_skips_empty_suites() {
        let generator = SuiteGenerator::new(
            options(&[(keys::FALLBACK_NUM_SUB_SUITES, "5")]),
            FakeSource::new(Behavior::Records(Vec::new())),
            inventory(&["a.js", "b.js"]),
        );

        let generated = generator.calculate_fallback_suites(FallbackReason::NoHistory).unwrap();
        assert_eq!(generated.suites.len(), 2);
        assert_eq!(generated.empty_suites_dropped, 3);

        let summary = generator.plan(end()).await.unwrap();
        assert_eq!(summary.suites.len(), 2);
        assert_eq!(summary.suites[1].suite_name, "jsCore_1");
        assert_eq!(summary.empty_suites_dropped, 3);
    }

    #[tokio::test]
    async fn test_only_stale_history_falls_back() {
        let generator = SuiteGenerator::new(
            options(&[]),
            FakeSource::new(Behavior::Records(vec![record("gone.js", 10.0)])),
            inventory(&["a.js"]),
        );

        let generated = generator.calculate_suites(end()).await.unwrap();
        assert_eq!(
            generated.source,
            PartitionSource::Fallback(FallbackReason::NoCurrentTests)
        );
        assert_eq!(generated.suites.len(), 1);
    }

    #[tokio::test]
    async fn test_service_unavailable_falls_back() {
        let generator = SuiteGenerator::new(
            options(&[]),
            FakeSource::new(Behavior::Unavailable),
            inventory(&["a.js", "b.js", "c.js", "d.js"]),
        );

        let generated = generator.calculate_suites(end()).await.unwrap();
        assert!(generated.source.is_fallback());
        assert_eq!(generated.suites.len(), 2);
        assert_eq!(generated.suites[0].tests(), ["a.js", "c.js"]);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let generator = SuiteGenerator::new(
            options(&[]),
            FakeSource::new(Behavior::Broken),
            inventory(&["a.js"]),
        );

        let err = generator.calculate_suites(end()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch test statistics"));
    }

    #[tokio::test]
    async fn test_plan_summary() {
        let generator = SuiteGenerator::new(
            options(&[]),
            FakeSource::new(Behavior::Records(vec![
                record("a.js", 400.0),
                record("b.js", 300.0),
            ])),
            inventory(&["a.js", "b.js"]),
        );

        let summary = generator.plan(end()).await.unwrap();
        assert!(summary.files.is_none());
        assert_eq!(summary.misc_suite, "jsCore_misc");
        assert_eq!(summary.suites.len(), 2);
        assert_eq!(summary.suites[0].suite_name, "jsCore_0");
        assert_eq!(summary.suites[0].task_name, "jsCore_0_linux-64");
        assert_eq!(summary.suites[0].timeouts.unwrap().timeout_secs, Some(1260));
        assert_eq!(summary.total_tests(), 2);
        assert_eq!(summary.empty_suites_dropped, 0);
    }

    fn write_suite(dir: &TempDir) -> (PathBuf, PathBuf) {
        let suite_dir = dir.path().join("suites");
        let out_dir = dir.path().join("generated");
        std::fs::create_dir_all(&suite_dir).unwrap();
        std::fs::write(
            suite_dir.join("jsCore.yml"),
            "test_kind: js_test\nselector:\n  roots:\n  - jstests/core/*.js\n",
        )
        .unwrap();
        (suite_dir, out_dir)
    }

    #[tokio::test]
    async fn test_generate_writes_files() {
        let dir = TempDir::new().unwrap();
        let (suite_dir, out_dir) = write_suite(&dir);
        let suite_dir = suite_dir.to_string_lossy().into_owned();
        let out = out_dir.to_string_lossy().into_owned();

        let generator = SuiteGenerator::new(
            options(&[
                (keys::TEST_SUITE_DIR, suite_dir.as_str()),
                (keys::GENERATED_CONFIG_DIR, out.as_str()),
            ]),
            FakeSource::new(Behavior::Records(vec![
                record("jstests/core/a.js", 500.0),
                record("jstests/core/b.js", 200.0),
            ])),
            inventory(&["jstests/core/a.js", "jstests/core/b.js"]),
        );

        let summary = generator.generate(end()).await.unwrap();
        let files = summary.files.unwrap();
        assert_eq!(files.suite_files.len(), 3);
        assert!(out_dir.join("jsCore_0.yml").exists());
        assert!(out_dir.join("jsCore_1.yml").exists());
        assert!(out_dir.join("jsCore_misc.yml").exists());
        assert_eq!(files.task_config, out_dir.join("jsCore.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.task_config).unwrap()).unwrap();
        assert_eq!(json["tasks"].as_array().unwrap().len(), 3);

        // No dependencies requested, so the build is never looked up.
        assert_eq!(*generator.source.build_lookups.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_fetches_build_tasks_for_dependencies() {
        let dir = TempDir::new().unwrap();
        let (suite_dir, out_dir) = write_suite(&dir);
        let suite_dir = suite_dir.to_string_lossy().into_owned();
        let out = out_dir.to_string_lossy().into_owned();

        let mut source = FakeSource::new(Behavior::Records(Vec::new()));
        source.build_tasks = vec![BuildTask {
            display_name: "aggregation_0_linux-64".into(),
        }];

        let generator = SuiteGenerator::new(
            options(&[
                (keys::TEST_SUITE_DIR, suite_dir.as_str()),
                (keys::GENERATED_CONFIG_DIR, out.as_str()),
                (keys::DEPENDS_ON, "aggregation"),
                (keys::BUILD_ID, "build_123"),
            ]),
            source,
            inventory(&["jstests/core/a.js"]),
        );

        let summary = generator.generate(end()).await.unwrap();
        assert!(summary.source.is_fallback());
        assert_eq!(*generator.source.build_lookups.lock().unwrap(), 1);

        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(out_dir.join("jsCore.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            json["tasks"][0]["depends_on"][1]["name"],
            "aggregation_0_linux-64"
        );
    }

    #[tokio::test]
    async fn test_generate_with_zero_tests() {
        let dir = TempDir::new().unwrap();
        let (suite_dir, out_dir) = write_suite(&dir);
        let suite_dir = suite_dir.to_string_lossy().into_owned();
        let out = out_dir.to_string_lossy().into_owned();

        let generator = SuiteGenerator::new(
            options(&[
                (keys::TEST_SUITE_DIR, suite_dir.as_str()),
                (keys::GENERATED_CONFIG_DIR, out.as_str()),
            ]),
            FakeSource::new(Behavior::Records(Vec::new())),
            inventory(&[]),
        );

        let summary = generator.generate(end()).await.unwrap();
        assert!(summary.suites.is_empty());
        assert_eq!(summary.empty_suites_dropped, 2);
        assert!(out_dir.join("jsCore_misc.yml").exists());
    }
}
