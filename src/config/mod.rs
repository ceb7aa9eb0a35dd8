pub mod cli;
pub mod toml_config;

use crate::domain::model::{ExperimentConfig, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    Validate,
};

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{
    Engine, MatchMode, Sweep, Workload, WorkloadKind, DEFAULT_BACKTRACK_LIMIT, DEFAULT_REPETITIONS,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "regex-sweep")]
#[command(about = "Time regex engines against pathological patterns over a sweep of input sizes")]
pub struct CliConfig {
    #[arg(long, value_enum, default_value = "star-star")]
    pub workload: WorkloadKind,

    #[arg(long, value_enum, default_value = "regex")]
    pub engine: Engine,

    #[arg(long, value_enum, help = "Override the workload's match mode")]
    pub mode: Option<MatchMode>,

    #[arg(long, help = "Pattern template for the custom workload, {n} is the input size")]
    pub pattern: Option<String>,

    #[arg(long, help = "Input unit repeated n times for the custom workload")]
    pub unit: Option<String>,

    #[arg(long, default_value = "0")]
    pub start: usize,

    #[arg(long, default_value = "150", help = "Exclusive upper bound of the sweep")]
    pub end: usize,

    #[arg(long, default_value = "10")]
    pub step: usize,

    #[arg(long, default_value = "5")]
    pub repetitions: usize,

    #[arg(long, help = "Count pattern compilation in each sample")]
    pub include_compile: bool,

    #[arg(long, help = "Stop the sweep once a size's mean exceeds this many milliseconds")]
    pub budget_ms: Option<u64>,

    #[arg(long, default_value = "1000000")]
    pub backtrack_limit: usize,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Write the report to a file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, help = "Only print the per-size mean in text output")]
    pub quiet_matches: bool,

    #[arg(long, help = "Experiment name used in reports")]
    pub name: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory between phases")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Default for CliConfig {
    fn default() -> Self {
        Self {
            workload: WorkloadKind::StarStar,
            engine: Engine::Regex,
            mode: None,
            pattern: None,
            unit: None,
            start: Sweep::default().start,
            end: Sweep::default().end,
            step: Sweep::default().step,
            repetitions: DEFAULT_REPETITIONS,
            include_compile: false,
            budget_ms: None,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            format: OutputFormat::Text,
            output: None,
            quiet_matches: false,
            name: None,
            verbose: false,
            monitor: false,
        }
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn experiment(&self) -> Result<ExperimentConfig> {
        let workload = Workload::from_kind(self.workload, self.pattern.as_ref(), self.unit.as_ref())?;
        Ok(ExperimentConfig {
            name: self.name.clone().unwrap_or_else(|| workload.name().to_string()),
            mode: self.mode.unwrap_or_else(|| workload.default_mode()),
            workload,
            engine: self.engine,
            sweep: Sweep {
                start: self.start,
                end: self.end,
                step: self.step,
            },
            repetitions: self.repetitions,
            include_compile: self.include_compile,
            budget: self.budget_ms.map(Duration::from_millis),
            backtrack_limit: self.backtrack_limit,
        })
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn experiments(&self) -> Result<Vec<ExperimentConfig>> {
        Ok(vec![self.experiment()?])
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }

    fn quiet_matches(&self) -> bool {
        self.quiet_matches
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.experiment()?.validate()?;
        if let Some(path) = &self.output {
            validate_output_path("output", path, self.format)?;
        }
        Ok(())
    }
}

impl Validate for ExperimentConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_positive_number("step", self.sweep.step, 1)?;
        validate_positive_number("repetitions", self.repetitions, 1)?;
        validate_positive_number("backtrack_limit", self.backtrack_limit, 1)?;
        // end 不含在內，至少要量到 start 這一個尺寸
        validate_positive_number("end", self.sweep.end, 1)?;
        validate_range("start", self.sweep.start, 0, self.sweep.end - 1)?;

        Ok(())
    }
}

pub fn validate_output_path(field_name: &str, path: &str, format: OutputFormat) -> Result<()> {
    validate_path(field_name, path)?;
    validate_file_extension(field_name, path, &[format.extension()])
}
