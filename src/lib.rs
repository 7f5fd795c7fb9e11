//! suitesplit: runtime-aware splitting of CI test suites.
//!
//! A long-running test suite is split into sub-suites that each finish in
//! roughly a target amount of time, using per-test runtimes from the CI
//! system's statistics service. The result is a set of suite files plus a
//! task graph the CI system can schedule.
//!
//! # Architecture
//!
//! The main components are:
//!
//! - **History**: Fetch per-test runtime statistics ([`history`])
//! - **Stats**: Aggregate records into one runtime per test ([`stats`])
//! - **Partition**: Pack tests into time-bounded suites ([`partition`])
//! - **Timeout**: Derive task timeouts from runtimes ([`timeout`])
//! - **Emit**: Write suite files and the task graph ([`emit`])
//! - **Generator**: Tie it together, with a fallback when history is
//!   unavailable ([`generator`])
//!
//! # Example
//!
//! ```no_run
//! use suitesplit::config::{load_config_file, resolve};
//! use suitesplit::generator::SuiteGenerator;
//! use suitesplit::history::evergreen::{EvergreenClient, DEFAULT_CONFIG_FILE};
//! use suitesplit::inventory::ResmokeSuiteInventory;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let file = load_config_file(std::path::Path::new("expansions.yml"))?;
//!     let options = resolve(&[&file])?;
//!
//!     let client = EvergreenClient::from_config_file(DEFAULT_CONFIG_FILE)?;
//!     let inventory = ResmokeSuiteInventory::new(&options.test_suite_dir, ".");
//!     let generator = SuiteGenerator::new(options, client, inventory);
//!
//!     let summary = generator.generate(chrono::Utc::now()).await?;
//!     println!("{} suites", summary.suites.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod emit;
pub mod generator;
pub mod history;
pub mod inventory;
pub mod partition;
pub mod report;
pub mod stats;
pub mod suite;
pub mod testname;
pub mod timeout;

// Re-export commonly used types
pub use config::{ConfigLayer, ConfigOptions, load_config_file, resolve};
pub use generator::{GenerationSummary, PartitionSource, SuiteGenerator};
pub use history::{StatsSource, TestStatsRecord};
pub use inventory::{ResmokeSuiteInventory, TestInventory};
pub use partition::SuitePartitioner;
pub use suite::Suite;
