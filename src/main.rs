//! suitesplit CLI - split CI test suites by historical runtime.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use suitesplit::config::{self, ConfigLayer, ConfigOptions, keys};
use suitesplit::generator::SuiteGenerator;
use suitesplit::history::evergreen::{DEFAULT_CONFIG_FILE, EvergreenClient};
use suitesplit::inventory::ResmokeSuiteInventory;
use suitesplit::report;

#[derive(Parser)]
#[command(name = "suitesplit")]
#[command(about = "Split CI test suites into time-bounded sub-suites", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate suite files and task configuration
    Generate {
        #[command(flatten)]
        options: OptionArgs,

        /// Evergreen credentials file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        evergreen_config: String,
    },

    /// Compute suites without writing anything
    Plan {
        #[command(flatten)]
        options: OptionArgs,

        /// Evergreen credentials file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        evergreen_config: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Resolve configuration and print the settings
    Validate {
        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Options shared by every subcommand. Flags override the expansion file.
#[derive(Args)]
struct OptionArgs {
    /// Expansions file (YAML) or TOML config to read options from
    #[arg(short = 'f', long)]
    expansion_file: Option<PathBuf>,

    /// Days of history to analyze
    #[arg(long, value_name = "DAYS")]
    analysis_duration: Option<String>,

    /// Target runtime per generated task
    #[arg(long, value_name = "MINUTES")]
    execution_time: Option<String>,

    /// Maximum number of generated suites (0 for no limit)
    #[arg(long)]
    max_sub_suites: Option<String>,

    /// Number of suites to create when history is unavailable
    #[arg(long)]
    fallback_num_sub_suites: Option<String>,

    /// Project to analyze
    #[arg(long)]
    project: Option<String>,

    /// Arguments passed to every test runner invocation
    #[arg(long, allow_hyphen_values = true)]
    resmoke_args: Option<String>,

    /// Maximum number of test runner jobs
    #[arg(long)]
    resmoke_jobs_max: Option<String>,

    /// Suite definition to split (defaults to the task name)
    #[arg(long)]
    suite: Option<String>,

    /// Whether the test runner may use multiple jobs
    #[arg(long)]
    run_multiple_jobs: Option<String>,

    /// Task to split
    #[arg(long)]
    task_name: Option<String>,

    /// Build variant to generate for
    #[arg(long)]
    variant: Option<String>,

    /// Run generated tasks on the large distro
    #[arg(long, value_name = "BOOL")]
    use_large_distro: Option<String>,

    /// Name of the large distro
    #[arg(long)]
    large_distro_name: Option<String>,

    /// Keep default task timeouts
    #[arg(long, value_name = "BOOL")]
    use_default_timeouts: Option<String>,

    /// Task path suffix for multiversion tasks
    #[arg(long)]
    use_multiversion: Option<String>,

    /// Whether this is a patch build
    #[arg(long, value_name = "BOOL")]
    is_patch: Option<String>,

    /// Comma-separated tasks the generated tasks depend on
    #[arg(long)]
    depends_on: Option<String>,

    /// Number of times to repeat each suite
    #[arg(long)]
    repeat_suites: Option<String>,

    /// Build whose tasks are matched for dependencies
    #[arg(long)]
    build_id: Option<String>,

    /// Directory holding the source suite definitions
    #[arg(long)]
    suite_dir: Option<PathBuf>,

    /// Directory to write generated files to
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl OptionArgs {
    fn to_layer(&self) -> ConfigLayer {
        ConfigLayer::new()
            .with(keys::ANALYSIS_DURATION_DAYS, self.analysis_duration.as_ref())
            .with(keys::TARGET_RESMOKE_TIME, self.execution_time.as_ref())
            .with(keys::MAX_SUB_SUITES, self.max_sub_suites.as_ref())
            .with(keys::FALLBACK_NUM_SUB_SUITES, self.fallback_num_sub_suites.as_ref())
            .with(keys::PROJECT, self.project.as_ref())
            .with(keys::RESMOKE_ARGS, self.resmoke_args.as_ref())
            .with(keys::RESMOKE_JOBS_MAX, self.resmoke_jobs_max.as_ref())
            .with(keys::SUITE, self.suite.as_ref())
            .with(keys::RUN_MULTIPLE_JOBS, self.run_multiple_jobs.as_ref())
            .with(keys::TASK, self.task_name.as_ref())
            .with(keys::BUILD_VARIANT, self.variant.as_ref())
            .with(keys::USE_LARGE_DISTRO, self.use_large_distro.as_ref())
            .with(keys::LARGE_DISTRO_NAME, self.large_distro_name.as_ref())
            .with(keys::USE_DEFAULT_TIMEOUTS, self.use_default_timeouts.as_ref())
            .with(keys::USE_MULTIVERSION, self.use_multiversion.as_ref())
            .with(keys::IS_PATCH, self.is_patch.as_ref())
            .with(keys::DEPENDS_ON, self.depends_on.as_ref())
            .with(keys::REPEAT_SUITES, self.repeat_suites.as_ref())
            .with(keys::BUILD_ID, self.build_id.as_ref())
            .with(keys::TEST_SUITE_DIR, self.suite_dir.as_ref().map(|p| p.display()))
            .with(keys::GENERATED_CONFIG_DIR, self.output_dir.as_ref().map(|p| p.display()))
    }

    fn resolve(&self) -> Result<ConfigOptions> {
        let cli = self.to_layer();
        let file = match &self.expansion_file {
            Some(path) => config::load_config_file(path)?,
            None => ConfigLayer::new(),
        };
        debug!(
            "Resolving configuration from {} flags and {} file values",
            cli.len(),
            file.len()
        );

        config::resolve(&[&cli, &file]).context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            options,
            evergreen_config,
        } => generate(&options, &evergreen_config).await,
        Commands::Plan {
            options,
            evergreen_config,
            format,
        } => plan(&options, &evergreen_config, format).await,
        Commands::Validate { options } => validate_config(&options),
    }
}

fn build_generator(
    options: ConfigOptions,
    evergreen_config: &str,
) -> Result<SuiteGenerator<EvergreenClient, ResmokeSuiteInventory>> {
    let client = EvergreenClient::from_config_file(evergreen_config)
        .with_context(|| format!("Failed to set up Evergreen client from {}", evergreen_config))?;
    let inventory = ResmokeSuiteInventory::new(&options.test_suite_dir, ".");
    Ok(SuiteGenerator::new(options, client, inventory))
}

async fn generate(args: &OptionArgs, evergreen_config: &str) -> Result<()> {
    let options = args.resolve()?;
    let generator = build_generator(options, evergreen_config)?;

    let summary = generator.generate(chrono::Utc::now()).await?;
    report::print_summary(&summary);
    Ok(())
}

async fn plan(args: &OptionArgs, evergreen_config: &str, format: OutputFormat) -> Result<()> {
    let options = args.resolve()?;
    let generator = build_generator(options, evergreen_config)?;

    let summary = generator.plan(chrono::Utc::now()).await?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
        OutputFormat::Text => report::print_summary(&summary),
    }
    Ok(())
}

fn validate_config(args: &OptionArgs) -> Result<()> {
    match args.resolve() {
        Ok(options) => {
            println!("Configuration is valid!");
            println!();
            println!("Settings:");
            println!("  Task: {}", options.task);
            println!("  Suite: {}", options.suite);
            println!("  Project: {}", options.project);
            println!("  Variant: {}", options.variant);
            println!("  Target runtime: {} min", options.target_resmoke_time);
            match options.max_sub_suites {
                Some(max) => println!("  Max sub-suites: {}", max),
                None => println!("  Max sub-suites: unlimited"),
            }
            println!("  Fallback sub-suites: {}", options.fallback_num_sub_suites);
            println!("  Repeat suites: {}", options.repeat_suites);
            println!("  History window: {} days", options.analysis_duration_days);
            if !options.depends_on.is_empty() {
                println!("  Depends on: {}", options.depends_on.join(", "));
            }
            println!("  Suite dir: {}", options.test_suite_dir.display());
            println!("  Output dir: {}", options.generated_config_dir.display());

            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    }
}
