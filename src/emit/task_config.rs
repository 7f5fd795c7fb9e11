//! Task graph for the CI system.
//!
//! The generated JSON holds one task per sub-suite, a misc task, a build
//! variant listing them all and a display task grouping them under the
//! name of the task being split:
//!
//! ```text
//! tasks:          jsCore_0_linux-64, jsCore_1_linux-64, jsCore_misc_linux-64
//! buildvariants:  linux-64
//!                   tasks:         (the three above, optional distro)
//!                   display_tasks: jsCore → all three + jsCore_gen
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::{EmitError, EmitResult, write_file};
use super::suite_file::{misc_suite_name, sub_suite_names};
use crate::config::ConfigOptions;
use crate::history::BuildTask;
use crate::suite::Suite;
use crate::testname;
use crate::timeout::TimeoutOverride;

/// Root of the generated task configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvergreenConfig {
    /// Generated tasks, misc task last.
    pub tasks: Vec<TaskDefinition>,

    /// The single variant the tasks are scheduled on.
    pub buildvariants: Vec<VariantDefinition>,
}

/// One generated task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    /// Task name, suffixed with the variant.
    pub name: String,

    /// Tasks that must finish first. Always starts with `compile`.
    pub depends_on: Vec<TaskDependency>,

    /// Commands run in order.
    pub commands: Vec<Command>,
}

/// A task another task must wait for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDependency {
    /// Name of the task depended on.
    pub name: String,
}

/// A command in a task body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Built-in command, only `timeout.update` is generated.
    Builtin {
        /// Command name.
        command: String,
        /// Timeouts to apply.
        params: TimeoutOverride,
    },

    /// Call of a function defined in the project configuration.
    Function {
        /// Function name.
        func: String,
        /// Expansions passed to the function.
        #[serde(skip_serializing_if = "Option::is_none")]
        vars: Option<BTreeMap<String, String>>,
    },
}

impl Command {
    fn timeout_update(timeouts: TimeoutOverride) -> Self {
        Command::Builtin {
            command: "timeout.update".to_string(),
            params: timeouts,
        }
    }

    fn func(name: &str) -> Self {
        Command::Function {
            func: name.to_string(),
            vars: None,
        }
    }

    fn func_with_vars(name: &str, vars: BTreeMap<String, String>) -> Self {
        Command::Function {
            func: name.to_string(),
            vars: Some(vars),
        }
    }
}

/// Reference to a task from a build variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSpec {
    /// Name of the task.
    pub name: String,

    /// Distros to run on instead of the variant default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distros: Vec<String>,
}

/// Build variant section of the task graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDefinition {
    /// Build variant name.
    pub name: String,

    /// Every generated task, misc included.
    pub tasks: Vec<TaskSpec>,

    /// Grouping of the generated tasks.
    pub display_tasks: Vec<DisplayTask>,
}

/// Groups generated tasks under one name in the CI UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTask {
    /// Name shown in the UI, the task being split.
    pub name: String,

    /// Grouped tasks, including the `_gen` task that produced them.
    pub execution_tasks: Vec<String>,
}

/// Builds the task graph for a set of suites.
pub struct TaskConfigGenerator<'a> {
    options: &'a ConfigOptions,
    build_tasks: &'a [BuildTask],
}

impl<'a> TaskConfigGenerator<'a> {
    /// Creates a generator. `build_tasks` are the tasks already scheduled in
    /// the build and are only consulted for dependencies.
    pub fn new(options: &'a ConfigOptions, build_tasks: &'a [BuildTask]) -> Self {
        if options.use_large_distro && options.large_distro_name.is_none() {
            warn!(
                "use_large_distro is set for {} but no large_distro_name is configured, using the default distro",
                options.variant
            );
        }
        Self {
            options,
            build_tasks,
        }
    }

    /// Generates the full configuration: one task per suite, then the misc
    /// task, then the build variant.
    pub fn generate(&self, suites: &[Suite]) -> EmitResult<EvergreenConfig> {
        let options = self.options;
        let depends_on = self.dependencies()?;

        let mut tasks = Vec::with_capacity(suites.len() + 1);
        for (idx, (suite, sub_suite)) in suites
            .iter()
            .zip(sub_suite_names(&options.suite, suites.len()))
            .enumerate()
        {
            let task_name = testname::name_generated_task(
                &options.task,
                idx,
                suites.len(),
                Some(&options.variant),
            );
            tasks.push(self.generate_task(&sub_suite, task_name, Some(suite), &depends_on));
        }

        let misc_task = format!("{}_misc_{}", options.task, options.variant);
        tasks.push(self.generate_task(
            &misc_suite_name(&options.suite),
            misc_task,
            None,
            &depends_on,
        ));

        let task_names: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
        let variant = VariantDefinition {
            name: options.variant.clone(),
            tasks: task_names.iter().map(|name| self.task_spec(name)).collect(),
            display_tasks: vec![self.display_task(task_names)],
        };

        Ok(EvergreenConfig {
            tasks,
            buildvariants: vec![variant],
        })
    }

    fn generate_task(
        &self,
        sub_suite: &str,
        task_name: String,
        suite: Option<&Suite>,
        depends_on: &[TaskDependency],
    ) -> TaskDefinition {
        debug!("Generating task for: {}", sub_suite);
        let options = self.options;

        let mut commands = Vec::new();
        let timeouts = suite
            .filter(|_| !options.use_default_timeouts)
            .and_then(|s| TimeoutOverride::for_suite(s, options.repeat_suites));
        if let Some(timeouts) = timeouts {
            commands.push(Command::timeout_update(timeouts));
        }
        commands.push(Command::func("do setup"));
        if options.use_multiversion.is_some() {
            commands.push(Command::func("do multiversion setup"));
        }
        commands.push(Command::func_with_vars(
            "run generated tests",
            self.run_tests_vars(sub_suite),
        ));

        TaskDefinition {
            name: task_name,
            depends_on: depends_on.to_vec(),
            commands,
        }
    }

    /// Arguments for one invocation of the test runner on `sub_suite`.
    ///
    /// `--repeat` is appended unless the user already passed a repeat flag.
    pub fn resmoke_args(&self, sub_suite: &str) -> String {
        let options = self.options;
        let suite_path = testname::normalize_test_file(
            &options
                .generated_config_dir
                .join(format!("{}.yml", sub_suite))
                .to_string_lossy(),
        );

        let mut args = vec![format!("--suite={}", suite_path)];
        if !options.resmoke_args.trim().is_empty() {
            args.push(options.resmoke_args.trim().to_string());
        }
        if !has_repeat_flag(&options.resmoke_args) {
            args.push(format!("--repeat={}", options.repeat_suites));
        }
        args.join(" ")
    }

    fn run_tests_vars(&self, sub_suite: &str) -> BTreeMap<String, String> {
        let options = self.options;
        let mut vars = BTreeMap::new();
        vars.insert("resmoke_args".to_string(), self.resmoke_args(sub_suite));
        vars.insert(
            "run_multiple_jobs".to_string(),
            options.run_multiple_jobs.clone(),
        );
        vars.insert("task".to_string(), options.task.clone());

        if let Some(jobs_max) = &options.resmoke_jobs_max {
            vars.insert("resmoke_jobs_max".to_string(), jobs_max.clone());
        }
        if let Some(suffix) = &options.use_multiversion {
            vars.insert("task_path_suffix".to_string(), suffix.clone());
        }
        vars
    }

    /// Dependencies shared by every generated task.
    ///
    /// Always `compile`. Outside patch builds, also every scheduled task
    /// generated from a `depends_on` entry.
    pub fn dependencies(&self) -> EmitResult<Vec<TaskDependency>> {
        let mut deps = vec![TaskDependency {
            name: "compile".to_string(),
        }];

        if !self.options.wants_task_dependencies() {
            return Ok(deps);
        }

        for dep in &self.options.depends_on {
            let pattern = format!(r"^{}_(\d+|misc)", regex::escape(dep));
            let re = Regex::new(&pattern).map_err(|e| EmitError::Pattern(e.to_string()))?;
            for task in self.build_tasks {
                if re.is_match(&task.display_name) {
                    deps.push(TaskDependency {
                        name: task.display_name.clone(),
                    });
                }
            }
        }

        Ok(deps)
    }

    fn task_spec(&self, name: &str) -> TaskSpec {
        let distros = match (&self.options.large_distro_name, self.options.use_large_distro) {
            (Some(distro), true) => vec![distro.clone()],
            _ => Vec::new(),
        };
        TaskSpec {
            name: name.to_string(),
            distros,
        }
    }

    fn display_task(&self, mut execution_tasks: Vec<String>) -> DisplayTask {
        execution_tasks.push(format!("{}_gen", self.options.task));
        DisplayTask {
            name: self.options.task.clone(),
            execution_tasks,
        }
    }
}

fn has_repeat_flag(resmoke_args: &str) -> bool {
    match shell_words::split(resmoke_args) {
        Ok(tokens) => tokens.iter().any(|t| t.starts_with("--repeat")),
        Err(_) => resmoke_args.contains("--repeat"),
    }
}

/// Writes `config` as pretty JSON to `{dir}/{task}.json`.
pub fn write_task_config(config: &EvergreenConfig, dir: &Path, task: &str) -> EmitResult<PathBuf> {
    let content =
        serde_json::to_string_pretty(config).map_err(|e| EmitError::Serialize(e.to_string()))?;
    let path = dir.join(format!("{}.json", task));
    debug!("Writing task configuration {}", path.display());
    write_file(path, &content)
}
