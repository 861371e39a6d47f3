use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No term selected")]
    NoTermSelected,

    #[error("Term not found: {0}")]
    TermNotFound(String),

    #[error("Unknown grade: {0}")]
    UnknownGrade(String),

    #[error("Subject '{subject}' is not offered for {grade}")]
    UnknownSubject { subject: String, grade: String },

    #[error("Subject '{subject}' already exists for {grade}")]
    DuplicateSubject { subject: String, grade: String },

    #[error("Invalid score '{input}': expected a non-negative number")]
    InvalidScore { input: String },

    #[error("Score {score} for {subject} exceeds the full mark {full_mark}")]
    ScoreExceedsFullMark {
        subject: String,
        score: f64,
        full_mark: u32,
    },

    #[error("Invalid full mark '{input}': expected a positive integer")]
    InvalidFullMark { input: String },

    #[error("Term '{0}' has no score data")]
    EmptyTerm(String),

    #[error("Data file format incorrect: {message}")]
    DataFormatError { message: String },

    #[error("Font error: {message}")]
    FontError { message: String },

    #[error("Chart rendering failed: {message}")]
    ChartError { message: String },

    #[error("Unsupported output format '{extension}', expected one of: {expected}")]
    UnsupportedFormat { extension: String, expected: String },
}

pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Configuration,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScoreError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoreError::NoTermSelected
            | ScoreError::TermNotFound(_)
            | ScoreError::UnknownGrade(_)
            | ScoreError::UnknownSubject { .. }
            | ScoreError::DuplicateSubject { .. }
            | ScoreError::InvalidScore { .. }
            | ScoreError::ScoreExceedsFullMark { .. }
            | ScoreError::InvalidFullMark { .. }
            | ScoreError::EmptyTerm(_)
            | ScoreError::ValidationError { .. } => ErrorCategory::Input,
            ScoreError::SerializationError(_)
            | ScoreError::CsvError(_)
            | ScoreError::DataFormatError { .. } => ErrorCategory::Data,
            ScoreError::ConfigError { .. }
            | ScoreError::ConfigValidationError { .. }
            | ScoreError::InvalidConfigValueError { .. }
            | ScoreError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScoreError::PdfError(_)
            | ScoreError::FontError { .. }
            | ScoreError::ChartError { .. }
            | ScoreError::UnsupportedFormat { .. } => ErrorCategory::Rendering,
            ScoreError::IoError(_) | ScoreError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 輸入錯誤只是提示，但仍以非零碼結束
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Data | ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

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
            ScoreError::NoTermSelected => {
                "Create a term with `term new` or pick one with `term select`".to_string()
            }
            ScoreError::TermNotFound(_) => "Run `term list` to see existing terms".to_string(),
            ScoreError::UnknownGrade(_) => {
                "Use one of the grades defined in the configuration".to_string()
            }
            ScoreError::UnknownSubject { grade, .. } => format!(
                "Run `subject list --grade {}` or add it with `subject add`",
                grade
            ),
            ScoreError::DuplicateSubject { .. } => "Choose a different subject name".to_string(),
            ScoreError::InvalidScore { .. } => "Enter the score as a number, e.g. 87.5".to_string(),
            ScoreError::ScoreExceedsFullMark { subject, .. } => format!(
                "Check the score or raise the full mark with `subject full-mark {} <mark>`",
                subject
            ),
            ScoreError::InvalidFullMark { .. } => "Enter the full mark as an integer, e.g. 150".to_string(),
            ScoreError::EmptyTerm(_) => "Add scores with `score add` first".to_string(),
            ScoreError::SerializationError(_) | ScoreError::DataFormatError { .. } => {
                "Make sure the file was written by this tool and is valid JSON".to_string()
            }
            ScoreError::FontError { .. } => {
                "Check [report] font_path in the configuration file".to_string()
            }
            ScoreError::UnsupportedFormat { expected, .. } => {
                format!("Use a file name ending in {}", expected)
            }
            ScoreError::ConfigError { .. }
            | ScoreError::ConfigValidationError { .. }
            | ScoreError::InvalidConfigValueError { .. }
            | ScoreError::MissingConfigError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            ScoreError::IoError(_) | ScoreError::ZipError(_) => {
                "Check that the path exists and is writable".to_string()
            }
            _ => "Check the input and try again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Data => format!("Could not read score data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Rendering => format!("Could not render output: {}", self),
            ErrorCategory::System => format!("File system error: {}", self),
        }
    }
}
