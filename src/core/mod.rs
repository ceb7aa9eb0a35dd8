pub mod engine;
pub mod engines;
pub mod pipeline;
pub mod report;
pub mod sweep;
pub mod workload;

pub use crate::domain::model::{SizeMeasurement, SweepReport};
pub use crate::domain::ports::{ConfigProvider, Matcher, Pipeline, Storage};
pub use crate::utils::error::Result;
