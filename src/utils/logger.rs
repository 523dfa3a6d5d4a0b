use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Levels accepted for `[logging] level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Filter directives used when `RUST_LOG` is unset: our binaries at
/// `level`, dependencies at warn (or error when `level` is error).
pub fn filter_directives(level: &str) -> String {
    let dependencies = if level == "error" { "error" } else { "warn" };
    format!(
        "compactnum={0},toml_compact={0},{1}",
        level, dependencies
    )
}

/// Level implied by the `--verbose` flag.
pub fn level_for_verbosity(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
}

/// Human-readable logs on stderr; stdout is reserved for results.
pub fn init_cli_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

/// Installs the logger named by a `--log-format` value.
pub fn init_logger(format: &str, level: &str) {
    match format {
        "json" => init_json_logger(level),
        _ => init_cli_logger(level),
    }
}
