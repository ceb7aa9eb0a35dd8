use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Pattern '{pattern}' rejected by {engine}: {message}")]
    PatternError {
        engine: String,
        pattern: String,
        message: String,
    },

    #[error("Report error: {message}")]
    ReportError { message: String },

    #[error("Standard output was closed by the reader")]
    OutputClosed,
}

impl SweepError {
    /// stdout 的讀取端關閉（例如 `| head`）時不算失敗
    pub fn from_stdout(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::BrokenPipe {
            SweepError::OutputClosed
        } else {
            SweepError::IoError(error)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Pattern,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SweepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SweepError::IoError(_) | SweepError::OutputClosed => ErrorCategory::Io,
            SweepError::CsvError(_)
            | SweepError::SerializationError(_)
            | SweepError::ReportError { .. } => ErrorCategory::Report,
            SweepError::ConfigValidationError { .. }
            | SweepError::InvalidConfigValueError { .. }
            | SweepError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SweepError::PatternError { .. } => ErrorCategory::Pattern,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if let SweepError::OutputClosed = self {
            return ErrorSeverity::Low;
        }
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Pattern => ErrorSeverity::High,
            ErrorCategory::Report => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 程序退出碼，依嚴重程度決定
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SweepError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            SweepError::CsvError(_) | SweepError::SerializationError(_) => {
                "Try another --format, or rerun with --verbose to see the failing row".to_string()
            }
            SweepError::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            SweepError::InvalidConfigValueError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            SweepError::MissingConfigError { field } => {
                format!("Add the '{}' setting", field)
            }
            SweepError::PatternError { engine, .. } => format!(
                "The {} engine does not support this pattern; try --engine fancy or simplify it",
                engine
            ),
            SweepError::ReportError { .. } => "Rerun with --verbose for details".to_string(),
            SweepError::OutputClosed => {
                "Write the report with --output instead of piping it".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Pattern => format!("Pattern compilation failed: {}", self),
            ErrorCategory::Report => format!("Could not produce the report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
