use clap::Parser;
use compactnum::core::values;
use compactnum::utils::{logger, validation::Validate};
use compactnum::{
    Cli, Command, CompactEngine, CompactError, CompactNumberFormatter, CsvArgs,
    CsvCompactPipeline, FormatArgs, LocalStorage,
};
use std::io::Write;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_logger(&cli.log_format, logger::level_for_verbosity(cli.verbose));
    tracing::debug!("CLI arguments: {:?}", cli);

    let outcome = match cli.command {
        Command::Format(args) => run_format(args),
        Command::Csv(args) => run_csv(args).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }
}

fn run_format(args: FormatArgs) -> Result<(), CompactError> {
    let formatter = CompactNumberFormatter::new(args.format_mode());

    let inputs = if args.values.is_empty() {
        tracing::debug!("No values given, reading stdin");
        values::read_values(std::io::stdin().lock())?
    } else {
        args.values
    };

    let formatted = values::format_values(&inputs, &formatter)?;

    let mut stdout = std::io::stdout().lock();
    for line in formatted {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}

async fn run_csv(args: CsvArgs) -> Result<(), CompactError> {
    args.validate()?;

    let pipeline = CsvCompactPipeline::new(LocalStorage::default(), args);
    let engine = CompactEngine::new(pipeline);
    let report = engine.run().await?;

    tracing::info!(
        "✅ Compacted {} of {} rows' cells in {:?}",
        report.stats.compacted,
        report.stats.rows,
        report.elapsed
    );
    for path in &report.outputs {
        println!("{}", path);
    }
    Ok(())
}
