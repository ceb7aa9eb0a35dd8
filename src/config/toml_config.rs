use crate::config::validate_output_path;
use crate::core::ConfigProvider;
use crate::domain::model::{
    Engine, ExperimentConfig, MatchMode, OutputFormat, Sweep, Workload, WorkloadKind, DEFAULT_BACKTRACK_LIMIT,
    DEFAULT_REPETITIONS,
};
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default, rename = "experiment")]
    pub experiments: Vec<ExperimentTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    pub path: Option<String>,
    #[serde(default)]
    pub quiet_matches: bool,
}

fn default_format() -> OutputFormat {
    OutputFormat::Text
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: None,
            quiet_matches: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

/// One `[[experiment]]` table; unset keys fall back to the classic sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperimentTable {
    pub name: Option<String>,
    pub workload: Option<WorkloadKind>,
    pub engine: Option<Engine>,
    pub mode: Option<MatchMode>,
    pub pattern: Option<String>,
    pub unit: Option<String>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub step: Option<usize>,
    pub repetitions: Option<usize>,
    pub include_compile: Option<bool>,
    pub budget_ms: Option<u64>,
    pub backtrack_limit: Option<usize>,
}

impl ExperimentTable {
    pub fn resolve(&self, index: usize) -> Result<ExperimentConfig> {
        let kind = self.workload.unwrap_or(WorkloadKind::StarStar);
        let workload = Workload::from_kind(kind, self.pattern.as_ref(), self.unit.as_ref()).map_err(|e| {
            SweepError::ConfigValidationError {
                field: format!("experiment[{}]", index),
                message: e.to_string(),
            }
        })?;
        let defaults = Sweep::default();

        Ok(ExperimentConfig {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("{}-{}", workload.name(), index)),
            mode: self.mode.unwrap_or_else(|| workload.default_mode()),
            workload,
            engine: self.engine.unwrap_or(Engine::Regex),
            sweep: Sweep {
                start: self.start.unwrap_or(defaults.start),
                end: self.end.unwrap_or(defaults.end),
                step: self.step.unwrap_or(defaults.step),
            },
            repetitions: self.repetitions.unwrap_or(DEFAULT_REPETITIONS),
            include_compile: self.include_compile.unwrap_or(false),
            budget: self.budget_ms.map(Duration::from_millis),
            backtrack_limit: self.backtrack_limit.unwrap_or(DEFAULT_BACKTRACK_LIMIT),
        })
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SweepError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SweepError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SWEEP_END})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| SweepError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.experiments.is_empty() {
            return Err(SweepError::MissingConfigError {
                field: "experiment".to_string(),
            });
        }

        for exp in self.experiments()? {
            exp.validate().map_err(|e| SweepError::ConfigValidationError {
                field: format!("experiment '{}'", exp.name),
                message: e.to_string(),
            })?;
        }

        if let Some(path) = &self.output.path {
            validate_output_path("output.path", path, self.output.format)?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn experiments(&self) -> Result<Vec<ExperimentConfig>> {
        self.experiments
            .iter()
            .enumerate()
            .map(|(i, table)| table.resolve(i))
            .collect()
    }

    fn output_format(&self) -> OutputFormat {
        self.output.format
    }

    fn output_path(&self) -> Option<&str> {
        self.output.path.as_deref()
    }

    fn quiet_matches(&self) -> bool {
        self.output.quiet_matches
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_experiments() {
        let toml_content = r#"
[output]
format = "csv"
path = "./sweep.csv"

[[experiment]]
name = "classic"

[[experiment]]
workload = "optional-repeat"
engine = "pikevm"
end = 50
step = 5
repetitions = 3
budget_ms = 100
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_format(), OutputFormat::Csv);

        let experiments = config.experiments().unwrap();
        assert_eq!(experiments.len(), 2);
        assert_eq!(experiments[0].name, "classic");
        assert_eq!(experiments[0].workload, Workload::StarStar);
        assert_eq!(experiments[0].sweep, Sweep::default());
        assert_eq!(experiments[1].name, "optional-repeat-1");
        assert_eq!(experiments[1].engine, Engine::Pikevm);
        assert_eq!(experiments[1].sweep.len(), 10);
        assert_eq!(experiments[1].budget, Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REGEX_SWEEP_TEST_END", "40");

        let toml_content = r#"
[[experiment]]
end = ${REGEX_SWEEP_TEST_END}
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.experiments().unwrap()[0].sweep.end, 40);

        std::env::remove_var("REGEX_SWEEP_TEST_END");
    }

    #[test]
    fn test_empty_config_is_invalid() {
        let config = TomlConfig::from_toml_str("[output]\nformat = \"json\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(SweepError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_custom_without_pattern_is_invalid() {
        let config = TomlConfig::from_toml_str("[[experiment]]\nworkload = \"custom\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_engine_fails_parsing() {
        let err = TomlConfig::from_toml_str("[[experiment]]\nengine = \"pcre\"\n").unwrap_err();
        assert!(matches!(err, SweepError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[monitoring]
enabled = true
log_level = "debug"

[[experiment]]
name = "file-test"
workload = "plus-plus"
engine = "fancy"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
        assert_eq!(config.experiments().unwrap()[0].name, "file-test");
    }
}
