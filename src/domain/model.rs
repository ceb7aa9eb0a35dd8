use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 被測的正規表達式引擎，全部來自第三方 crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// `regex::Regex`
    Regex,
    /// `regex_automata` PikeVM
    Pikevm,
    /// `regex_automata` bounded backtracker
    Backtrack,
    /// `fancy_regex::Regex`
    Fancy,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Regex => "regex",
            Engine::Pikevm => "pikevm",
            Engine::Backtrack => "backtrack",
            Engine::Fancy => "fancy",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Match must start at offset 0
    Anchored,
    /// Count every non-overlapping match
    Tokenize,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Anchored => f.write_str("anchored"),
            MatchMode::Tokenize => f.write_str("tokenize"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// `(a*)*b` against a^n
    StarStar,
    /// `((a?){n})((a){n})` against a^n
    OptionalRepeat,
    /// `(a|aa)*` against a^n
    Alternation,
    /// `(a+a+)+b` against a^n
    PlusPlus,
    /// WHILE-language tokenizer against the factorial program repeated n times
    WhileProgram,
    /// User pattern with `{n}` placeholders against a repeated unit
    Custom,
}

/// 一個工作負載：模式族加上輸入產生方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workload {
    StarStar,
    OptionalRepeat,
    Alternation,
    PlusPlus,
    WhileProgram,
    Custom { pattern: String, unit: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Input sizes `start, start + step, ...` strictly below `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweep {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            start: 0,
            end: 150,
            step: 10,
        }
    }
}

impl Sweep {
    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        // step 為 0 時不產生任何尺寸，驗證層會先擋下
        let step = self.step;
        (self.start..self.end).step_by(step.max(1)).take_while(move |_| step > 0)
    }

    pub fn len(&self) -> usize {
        self.sizes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully resolved experiment, independent of where it was configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub name: String,
    pub workload: Workload,
    pub engine: Engine,
    pub mode: MatchMode,
    pub sweep: Sweep,
    pub repetitions: usize,
    pub include_compile: bool,
    pub budget: Option<Duration>,
    pub backtrack_limit: usize,
}

pub const DEFAULT_REPETITIONS: usize = 5;
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    NoMatch,
    Matched { start: usize, end: usize },
    Tokens { count: usize },
    Failed { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoMatch => f.write_str("None"),
            Outcome::Matched { start, end } => write!(f, "Match(span=({}, {}))", start, end),
            Outcome::Tokens { count } => write!(f, "Tokens({})", count),
            Outcome::Failed { reason } => write!(f, "Failed({})", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub repetition: usize,
    pub elapsed_ns: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeMeasurement {
    pub n: usize,
    pub samples: Vec<Sample>,
    pub mean_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
}

impl SizeMeasurement {
    /// Aggregates the samples of one size; the mean is total / count.
    pub fn from_samples(n: usize, samples: Vec<Sample>) -> Self {
        let total: u128 = samples.iter().map(|s| s.elapsed_ns as u128).sum();
        let mean_ns = if samples.is_empty() {
            0
        } else {
            (total / samples.len() as u128) as u64
        };
        let min_ns = samples.iter().map(|s| s.elapsed_ns).min().unwrap_or(0);
        let max_ns = samples.iter().map(|s| s.elapsed_ns).max().unwrap_or(0);

        Self {
            n,
            samples,
            mean_ns,
            min_ns,
            max_ns,
        }
    }

    pub fn mean(&self) -> Duration {
        Duration::from_nanos(self.mean_ns)
    }

    pub fn mean_seconds(&self) -> f64 {
        self.mean_ns as f64 / 1e9
    }

    /// Outcome of the last repetition; every repetition sees the same input.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.samples.last().map(|s| &s.outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub name: String,
    pub workload: String,
    pub engine: Engine,
    pub mode: MatchMode,
    pub pattern_template: String,
    pub repetitions: usize,
    pub include_compile: bool,
    pub started_at: DateTime<Utc>,
    pub measurements: Vec<SizeMeasurement>,
    pub stopped_early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemSnapshot>,
}
