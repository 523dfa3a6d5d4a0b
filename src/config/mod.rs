pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::formatter::FormatMode;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(name = "compactnum", version)]
#[command(about = "Shorten large numbers into compact labels such as 1.5k or 46k")]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        default_value = "text",
        value_parser = ["text", "json"],
        help = "Log output format"
    )]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Format values given as arguments, or one per line on stdin
    Format(FormatArgs),
    /// Compact numeric columns of a CSV file
    Csv(CsvArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    /// Values to format; read from stdin when omitted
    #[arg(allow_negative_numbers = true)]
    pub values: Vec<String>,

    #[arg(long, help = "Reject negative, NaN and infinite values")]
    pub strict: bool,
}

#[cfg(feature = "cli")]
impl FormatArgs {
    pub fn format_mode(&self) -> FormatMode {
        if self.strict {
            FormatMode::Strict
        } else {
            FormatMode::Permissive
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct CsvArgs {
    #[arg(short, long, help = "CSV file to read")]
    pub input: String,

    #[arg(short, long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    #[arg(short, long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    #[arg(long, help = "Keep source columns and add <column>_compact next to them")]
    pub keep_original: bool,

    #[arg(long, help = "Fail on non-numeric, negative or non-finite cells")]
    pub strict: bool,

    #[arg(long = "format", value_delimiter = ',', default_value = "csv")]
    pub output_formats: Vec<String>,

    #[arg(long, default_value = "compacted", help = "Output file name without extension")]
    pub stem: String,
}

#[cfg(feature = "cli")]
fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    validation::validate_delimiter("delimiter", value).map_err(|e| e.to_string())
}

#[cfg(feature = "cli")]
impl ConfigProvider for CsvArgs {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn keep_original(&self) -> bool {
        self.keep_original
    }

    fn format_mode(&self) -> FormatMode {
        if self.strict {
            FormatMode::Strict
        } else {
            FormatMode::Permissive
        }
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn output_stem(&self) -> &str {
        &self.stem
    }
}

#[cfg(feature = "cli")]
impl Validate for CsvArgs {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_columns("columns", &self.columns)?;
        validation::validate_output_formats("format", &self.output_formats)?;
        validation::validate_non_empty_string("stem", &self.stem)?;
        Ok(())
    }
}
