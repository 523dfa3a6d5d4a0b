use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompactError {
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

    #[error("Cannot parse '{input}' as a number: {reason}")]
    ParseError { input: String, reason: String },

    #[error("Unsupported value {value}: {reason}")]
    UnsupportedValueError { value: String, reason: String },

    #[error("Column '{column}' not found in input header")]
    MissingColumnError { column: String },

    #[error("Column '{column}' appears more than once in the output header")]
    DuplicateColumnError { column: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Input,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CompactError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompactError::IoError(_) => ErrorCategory::Io,
            CompactError::CsvError(_) | CompactError::SerializationError(_) => ErrorCategory::Data,
            CompactError::ConfigValidationError { .. }
            | CompactError::InvalidConfigValueError { .. }
            | CompactError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CompactError::ParseError { .. }
            | CompactError::UnsupportedValueError { .. }
            | CompactError::MissingColumnError { .. }
            | CompactError::DuplicateColumnError { .. } => ErrorCategory::Input,
            CompactError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CompactError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check that the input file exists and the path is correct".to_string()
            }
            CompactError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            CompactError::CsvError(_) => {
                "Make sure every row has the same number of fields and the delimiter is right"
                    .to_string()
            }
            CompactError::SerializationError(_) => {
                "Inspect the data for values that cannot be written as JSON".to_string()
            }
            CompactError::ConfigValidationError { field, .. }
            | CompactError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting and run again", field)
            }
            CompactError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            CompactError::ParseError { .. } => {
                "Use plain decimal numbers such as 1500 or 12.5".to_string()
            }
            CompactError::UnsupportedValueError { .. } => {
                "Drop --strict to format negative or non-finite values permissively".to_string()
            }
            CompactError::MissingColumnError { .. } => {
                "Column names are case-sensitive; compare them with the header row".to_string()
            }
            CompactError::DuplicateColumnError { .. } => {
                "Rename the repeated header, or drop --keep-original if it clashes with a <column>_compact header"
                    .to_string()
            }
            CompactError::ProcessingError { .. } => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Data => format!("Could not read or write data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }

    /// Process exit code for this error; never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompactError>;
