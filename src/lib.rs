pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command, CsvArgs, FormatArgs};

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::etl::{CompactEngine, RunReport};
pub use core::formatter::{format_compact_number, CompactNumberFormatter, FormatMode};
pub use core::pipeline::CsvCompactPipeline;
pub use utils::error::{CompactError, Result};
