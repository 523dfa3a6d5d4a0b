//! Formatting of free-standing values, as typed on the command line or piped in.

use crate::core::formatter::CompactNumberFormatter;
use crate::utils::error::{CompactError, Result};
use std::io::BufRead;

/// Parses one plain decimal value. Surrounding whitespace is ignored.
pub fn parse_value(input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| CompactError::ParseError {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

pub fn format_values<I, S>(inputs: I, formatter: &CompactNumberFormatter) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|input| parse_value(input.as_ref()).and_then(|value| formatter.apply(value)))
        .collect()
}

/// Collects the non-blank lines of `reader`.
pub fn read_values<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            values.push(line);
        }
    }
    Ok(values)
}
