use crate::utils::error::{CompactError, Result};
use std::collections::HashSet;

/// Output formats the pipeline knows how to write.
pub const SUPPORTED_OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CompactError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CompactError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CompactError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_columns(field_name: &str, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(CompactError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    let mut seen = HashSet::new();
    for column in columns {
        validate_non_empty_string(field_name, column)?;
        if !seen.insert(column.as_str()) {
            return Err(CompactError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: column.clone(),
                reason: "Column listed more than once".to_string(),
            });
        }
    }

    Ok(())
}

/// Parses a delimiter setting into the single byte the csv crate expects.
pub fn validate_delimiter(field_name: &str, value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'"' && *byte != b'\n' => Ok(*byte),
        _ if value == "\\t" => Ok(b'\t'),
        _ => Err(CompactError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Delimiter must be a single ASCII character other than a quote or newline"
                .to_string(),
        }),
    }
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(CompactError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !SUPPORTED_OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(CompactError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CompactError::MissingConfigError {
        field: field_name.to_string(),
    })
}
