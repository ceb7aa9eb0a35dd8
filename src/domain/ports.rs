use crate::domain::model::{ExperimentConfig, Outcome, OutputFormat, SweepReport};
use crate::utils::error::Result;

/// A compiled pattern ready to run against haystacks.
///
/// `&mut self` lets engines keep their search caches between repetitions.
pub trait Matcher {
    fn run(&mut self, haystack: &str) -> Outcome;
}

pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn experiments(&self) -> Result<Vec<ExperimentConfig>>;
    fn output_format(&self) -> OutputFormat;
    /// `None` means stdout.
    fn output_path(&self) -> Option<&str>;
    fn quiet_matches(&self) -> bool;
}

pub trait Pipeline {
    fn measure(&self) -> Result<Vec<SweepReport>>;
    fn render(&self, reports: &[SweepReport]) -> Result<Vec<u8>>;
    fn load(&self, rendered: Vec<u8>) -> Result<String>;
}
