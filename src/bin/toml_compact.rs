use anyhow::Context;
use clap::Parser;
use compactnum::core::ConfigProvider;
use compactnum::utils::{logger, validation::Validate};
use compactnum::{CompactEngine, CsvCompactPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-compact")]
#[command(about = "Run a CSV compaction job described by a TOML file")]
struct Args {
    /// Path to TOML job file
    #[arg(short, long, default_value = "compact-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the input path from the job file
    #[arg(long)]
    input: Option<String>,

    /// Override strict mode from the job file
    #[arg(long)]
    strict: Option<bool>,

    /// Show what would be processed without reading or writing data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load job file '{}'", args.config))?;

    if let Some(input) = &args.input {
        config.input.path = Some(input.clone());
    }
    if let Some(strict) = args.strict {
        config.transform.strict = Some(strict);
    }

    // Validated before the logger exists, so the configured level is known-good
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    let level = if args.verbose {
        logger::level_for_verbosity(true)
    } else {
        config.log_level().unwrap_or("info")
    };
    logger::init_logger(config.log_format().unwrap_or("text"), level);

    tracing::info!("📁 Loaded job file: {}", args.config);
    if let Some(input) = &args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
    }
    if let Some(strict) = args.strict {
        tracing::info!("🔧 Strict mode overridden to: {}", strict);
    }
    tracing::info!("✅ Configuration validated");

    display_job_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be read or written");
        return Ok(());
    }

    let pipeline = CsvCompactPipeline::new(LocalStorage::default(), config);
    let engine = CompactEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Job completed in {:?}", report.elapsed);
            for path in &report.outputs {
                println!("{}", path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

fn display_job_summary(config: &TomlConfig) {
    tracing::info!("📋 Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("   Input: {}", config.input_path());
    tracing::info!("   Columns: {}", config.columns().join(", "));
    tracing::info!(
        "   Mode: {:?}, keep original: {}",
        config.format_mode(),
        config.keep_original()
    );
    tracing::info!(
        "   Output: {}/{}.{{{}}}",
        config.output_path(),
        config.output_stem(),
        config.output_formats().join(",")
    );
}
