use crate::core::formatter::FormatMode;
use crate::core::ConfigProvider;
use crate::utils::error::{CompactError, Result};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_STEM: &str = "compacted";

/// Job file consumed by the `toml_compact` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub input: InputConfig,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub columns: Vec<String>,
    pub keep_original: Option<bool>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub stem: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CompactError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            CompactError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;

        let input_path = validation::validate_required_field("input.path", &self.input.path)?;
        validation::validate_path("input.path", input_path)?;
        if let Some(delimiter) = &self.input.delimiter {
            validation::validate_delimiter("input.delimiter", delimiter)?;
        }

        validation::validate_columns("transform.columns", &self.transform.columns)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;
        if let Some(stem) = &self.load.stem {
            validation::validate_non_empty_string("load.stem", stem)?;
        }

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level) {
                return Err(CompactError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        if let Some(format) = self.log_format() {
            if !matches!(format, "text" | "json") {
                return Err(CompactError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: text, json".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.format.as_deref())
    }

    pub fn is_strict(&self) -> bool {
        self.transform.strict.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.input.path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn columns(&self) -> &[String] {
        &self.transform.columns
    }

    fn delimiter(&self) -> u8 {
        // validate_config has already rejected malformed delimiters
        self.input
            .delimiter
            .as_deref()
            .and_then(|d| validation::validate_delimiter("input.delimiter", d).ok())
            .unwrap_or(b',')
    }

    fn keep_original(&self) -> bool {
        self.transform.keep_original.unwrap_or(false)
    }

    fn format_mode(&self) -> FormatMode {
        if self.is_strict() {
            FormatMode::Strict
        } else {
            FormatMode::Permissive
        }
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn output_stem(&self) -> &str {
        self.load.stem.as_deref().unwrap_or(DEFAULT_STEM)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
