pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::SweepEngine, pipeline::SweepPipeline, sweep::Sweeper};
pub use domain::model::{Engine, ExperimentConfig, MatchMode, OutputFormat, Sweep, SweepReport, Workload};
pub use utils::error::{Result, SweepError};
