use crate::core::{CompactStats, Pipeline};
use crate::utils::error::Result;
use std::time::{Duration, Instant};

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outputs: Vec<String>,
    pub stats: CompactStats,
    pub elapsed: Duration,
}

pub struct CompactEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CompactEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("Starting compaction run");

        // Extract
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            rows = dataset.records.len(),
            columns = dataset.headers.len(),
            "Extracted records"
        );

        // Transform
        let result = self.pipeline.transform(dataset).await?;
        let stats = result.stats;
        tracing::info!(
            compacted = stats.compacted,
            skipped = stats.skipped,
            empty = stats.empty,
            "Transformed records"
        );
        if stats.skipped > 0 {
            tracing::warn!("{} cells were not numeric and were left unchanged", stats.skipped);
        }

        // Load
        let outputs = self.pipeline.load(result).await?;
        for path in &outputs {
            tracing::info!("Output saved to: {}", path);
        }

        let elapsed = started.elapsed();
        tracing::debug!("Run finished in {:?}", elapsed);

        Ok(RunReport {
            outputs,
            stats,
            elapsed,
        })
    }
}
