use crate::core::grading::GradeThresholds;
use crate::core::SettingsProvider;
use crate::domain::catalog::GradeCatalog;
use crate::domain::model::DEFAULT_FULL_MARK;
use crate::utils::error::{Result, ScoreError};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "score-analyzer.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub grading: GradingConfig,
    pub grades: GradeCatalog,
    pub report: ReportConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub excellent: f64,
    pub good: f64,
    pub passing: f64,
    pub default_full_mark: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// TrueType font used for report and chart text (needed for CJK names).
    pub font_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            grading: GradingConfig::default(),
            grades: GradeCatalog::default(),
            report: ReportConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "scores.json".to_string(),
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        let thresholds = GradeThresholds::default();
        Self {
            excellent: thresholds.excellent,
            good: thresholds.good,
            passing: thresholds.passing,
            default_full_mark: DEFAULT_FULL_MARK,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given; otherwise the default file if present, else defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FONT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoreError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("storage.data_file", &self.storage.data_file)?;

        if !self.thresholds().is_ordered() {
            return Err(ScoreError::ConfigValidationError {
                field: "grading".to_string(),
                message: format!(
                    "thresholds must satisfy 0 < passing ({}) < good ({}) < excellent ({}) <= 1",
                    self.grading.passing, self.grading.good, self.grading.excellent
                ),
            });
        }
        validate_range("grading.default_full_mark", self.grading.default_full_mark, 1, 10_000)?;

        if self.grades.grades().is_empty() {
            return Err(ScoreError::MissingConfigError {
                field: "grades".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for grade in self.grades.grades() {
            validate_non_empty_string("grades.name", &grade.name)?;
            if !seen.insert(grade.name.as_str()) {
                return Err(ScoreError::InvalidConfigValueError {
                    field: "grades.name".to_string(),
                    value: grade.name.clone(),
                    reason: "Grade names must be unique".to_string(),
                });
            }
            for subject in &grade.subjects {
                validate_non_empty_string("grades.subjects", subject)?;
            }
        }

        if let Some(font_path) = &self.report.font_path {
            validate_path("report.font_path", font_path)?;
        }

        validate_range("chart.width", self.chart.width, 200, 4000)?;
        validate_range("chart.height", self.chart.height, 200, 4000)?;

        Ok(())
    }
}

impl SettingsProvider for AppConfig {
    fn data_file(&self) -> &str {
        &self.storage.data_file
    }

    fn catalog(&self) -> &GradeCatalog {
        &self.grades
    }

    fn thresholds(&self) -> GradeThresholds {
        GradeThresholds {
            excellent: self.grading.excellent,
            good: self.grading.good,
            passing: self.grading.passing,
        }
    }

    fn default_full_mark(&self) -> u32 {
        self.grading.default_full_mark
    }

    fn font_path(&self) -> Option<&str> {
        self.report.font_path.as_deref()
    }

    fn chart_size(&self) -> (u32, u32) {
        (self.chart.width, self.chart.height)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
