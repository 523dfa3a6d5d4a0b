use crate::core::formatter::{CompactNumberFormatter, FormatMode};
use crate::core::{
    CompactStats, ConfigProvider, Dataset, Pipeline, Record, Storage, TransformResult,
};
use crate::utils::error::{CompactError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Suffix of the extra column written when originals are kept.
pub const COMPACT_COLUMN_SUFFIX: &str = "_compact";

pub struct CsvCompactPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    formatter: CompactNumberFormatter,
}

impl<S: Storage, C: ConfigProvider> CsvCompactPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let formatter = CompactNumberFormatter::new(config.format_mode());
        Self {
            storage,
            config,
            formatter,
        }
    }

    fn resolve_columns(&self, headers: &[String]) -> Result<Vec<usize>> {
        self.config
            .columns()
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|header| header.trim() == column)
                    .ok_or_else(|| CompactError::MissingColumnError {
                        column: column.clone(),
                    })
            })
            .collect()
    }

    fn compact_cell(
        &self,
        cell: &str,
        row: usize,
        column: &str,
        stats: &mut CompactStats,
    ) -> Result<String> {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            stats.empty += 1;
            return Ok(cell.to_string());
        }

        let parsed = match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err("not a finite number".to_string()),
            Err(e) => Err(e.to_string()),
        };

        match (parsed, self.formatter.mode()) {
            (Ok(value), FormatMode::Strict) => {
                let compacted = self.formatter.try_format(value).map_err(|e| match e {
                    CompactError::UnsupportedValueError { value, reason } => {
                        CompactError::UnsupportedValueError {
                            value,
                            reason: format!("{} (row {}, column '{}')", reason, row, column),
                        }
                    }
                    other => other,
                })?;
                stats.compacted += 1;
                Ok(compacted)
            }
            (Ok(value), FormatMode::Permissive) => {
                stats.compacted += 1;
                Ok(self.formatter.format(value))
            }
            (Err(reason), FormatMode::Strict) => Err(CompactError::ParseError {
                input: cell.to_string(),
                reason: format!("{} (row {}, column '{}')", reason, row, column),
            }),
            (Err(_), FormatMode::Permissive) => {
                tracing::warn!(row, column, cell, "Leaving non-numeric cell unchanged");
                stats.skipped += 1;
                Ok(cell.to_string())
            }
        }
    }

    fn output_file(&self, format: &str) -> String {
        Path::new(self.config.output_path())
            .join(format!("{}.{}", self.config.output_stem(), format))
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvCompactPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading input from: {}", input_path);
        let bytes = self.storage.read_file(input_path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter())
            .has_headers(true)
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(Record::new(row.iter().map(str::to_string).collect()));
        }

        tracing::debug!("Parsed {} columns: {:?}", headers.len(), headers);
        Ok(Dataset { headers, records })
    }

    async fn transform(&self, data: Dataset) -> Result<TransformResult> {
        let Dataset {
            headers: source_headers,
            records,
        } = data;

        let targets = self.resolve_columns(&source_headers)?;
        let keep_original = self.config.keep_original();

        let mut headers = Vec::with_capacity(source_headers.len() + targets.len());
        for (index, header) in source_headers.iter().enumerate() {
            let header = header.trim();
            headers.push(header.to_string());
            if keep_original && targets.contains(&index) {
                headers.push(format!("{}{}", header, COMPACT_COLUMN_SUFFIX));
            }
        }

        // JSON records are keyed by header, so names must be unique
        let mut seen = HashSet::new();
        if let Some(duplicate) = headers.iter().find(|&header| !seen.insert(header.as_str())) {
            return Err(CompactError::DuplicateColumnError {
                column: duplicate.clone(),
            });
        }

        let mut stats = CompactStats {
            rows: records.len(),
            ..CompactStats::default()
        };
        let mut processed = Vec::with_capacity(records.len());

        for (row_index, record) in records.into_iter().enumerate() {
            let mut values = Vec::with_capacity(headers.len());
            for (index, cell) in record.values.into_iter().enumerate() {
                if !targets.contains(&index) {
                    values.push(cell);
                    continue;
                }

                let column = source_headers[index].trim();
                let compacted = self.compact_cell(&cell, row_index + 1, column, &mut stats)?;
                if keep_original {
                    values.push(cell);
                }
                values.push(compacted);
            }
            processed.push(Record::new(values));
        }

        Ok(TransformResult {
            headers,
            records: processed,
            stats,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let data = match format.as_str() {
                "csv" => write_delimited(&result, b',')?,
                "tsv" => write_delimited(&result, b'\t')?,
                "json" => write_json(&result)?,
                other => {
                    return Err(CompactError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            };

            let path = self.output_file(format);
            tracing::debug!("Writing {} bytes to {}", data.len(), path);
            self.storage.write_file(&path, &data).await?;
            written.push(path);
        }

        Ok(written)
    }
}

fn write_delimited(result: &TransformResult, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&result.headers)?;
    for record in &result.records {
        writer.write_record(&record.values)?;
    }

    writer
        .into_inner()
        .map_err(|e| CompactError::ProcessingError {
            message: format!("Failed to flush output: {}", e),
        })
}

#[derive(Serialize)]
struct JsonOutput {
    generated_at: DateTime<Utc>,
    stats: CompactStats,
    records: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn write_json(result: &TransformResult) -> Result<Vec<u8>> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = result
        .records
        .iter()
        .map(|record| {
            result
                .headers
                .iter()
                .zip(&record.values)
                .map(|(header, value)| (header.clone(), serde_json::Value::String(value.clone())))
                .collect()
        })
        .collect();

    let output = JsonOutput {
        generated_at: Utc::now(),
        stats: result.stats,
        records,
    };

    Ok(serde_json::to_vec_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CompactError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        columns: Vec<String>,
        delimiter: u8,
        keep_original: bool,
        mode: FormatMode,
        output_formats: Vec<String>,
    }

    impl MockConfig {
        fn new(columns: &[&str]) -> Self {
            Self {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                delimiter: b',',
                keep_original: false,
                mode: FormatMode::Permissive,
                output_formats: vec!["csv".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "input.csv"
        }

        fn output_path(&self) -> &str {
            "test_output"
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
            self.mode
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn output_stem(&self) -> &str {
            "compacted"
        }
    }

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            records: rows
                .iter()
                .map(|row| Record::new(row.iter().map(|c| c.to_string()).collect()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_extract_reads_headers_and_rows() {
        let storage = MockStorage::new();
        storage
            .put_file("input.csv", "title,views\nIntro,1500\nDeep dive,45600\n")
            .await;
        let pipeline = CsvCompactPipeline::new(storage, MockConfig::new(&["views"]));

        let data = pipeline.extract().await.unwrap();

        assert_eq!(data.headers, vec!["title", "views"]);
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[1].values, vec!["Deep dive", "45600"]);
    }

    #[tokio::test]
    async fn test_extract_with_custom_delimiter() {
        let storage = MockStorage::new();
        storage.put_file("input.csv", "title;views\nIntro;1500\n").await;
        let mut config = MockConfig::new(&["views"]);
        config.delimiter = b';';
        let pipeline = CsvCompactPipeline::new(storage, config);

        let data = pipeline.extract().await.unwrap();

        assert_eq!(data.records[0].values, vec!["Intro", "1500"]);
    }

    #[tokio::test]
    async fn test_extract_uneven_rows_is_csv_error() {
        let storage = MockStorage::new();
        storage.put_file("input.csv", "a,b\n1,2\n3\n").await;
        let pipeline = CsvCompactPipeline::new(storage, MockConfig::new(&["a"]));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, CompactError::CsvError(_)));
    }

    #[tokio::test]
    async fn test_extract_missing_input_is_io_error() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["a"]));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, CompactError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_replaces_cells_in_place() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["views"]));
        let data = dataset(
            &["title", "views"],
            &[&["a", "999"], &["b", "1500"], &["c", "999500"]],
        );

        let result = pipeline.transform(data).await.unwrap();

        assert_eq!(result.headers, vec!["title", "views"]);
        let views: Vec<&str> = result.records.iter().map(|r| r.values[1].as_str()).collect();
        assert_eq!(views, vec!["999", "1.5k", "1M"]);
        assert_eq!(
            result.stats,
            CompactStats {
                rows: 3,
                compacted: 3,
                skipped: 0,
                empty: 0
            }
        );
    }

    #[tokio::test]
    async fn test_transform_keep_original_inserts_compact_column() {
        let mut config = MockConfig::new(&["views", "likes"]);
        config.keep_original = true;
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), config);
        let data = dataset(&["views", "title", "likes"], &[&["45600", "x", "1200"]]);

        let result = pipeline.transform(data).await.unwrap();

        assert_eq!(
            result.headers,
            vec!["views", "views_compact", "title", "likes", "likes_compact"]
        );
        assert_eq!(
            result.records[0].values,
            vec!["45600", "46k", "x", "1200", "1.2k"]
        );
    }

    #[tokio::test]
    async fn test_transform_counts_empty_and_skipped_cells() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["views"]));
        let data = dataset(&["views"], &[&[""], &["n/a"], &["inf"], &[" 2500 "]]);

        let result = pipeline.transform(data).await.unwrap();

        let views: Vec<&str> = result.records.iter().map(|r| r.values[0].as_str()).collect();
        assert_eq!(views, vec!["", "n/a", "inf", "2.5k"]);
        assert_eq!(result.stats.empty, 1);
        assert_eq!(result.stats.skipped, 2);
        assert_eq!(result.stats.compacted, 1);
    }

    #[tokio::test]
    async fn test_transform_permissive_keeps_negative_values_plain() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["delta"]));
        let data = dataset(&["delta"], &[&["-1500"]]);

        let result = pipeline.transform(data).await.unwrap();
        assert_eq!(result.records[0].values, vec!["-1500"]);
    }

    #[tokio::test]
    async fn test_transform_strict_rejects_text_and_negatives() {
        let mut config = MockConfig::new(&["views"]);
        config.mode = FormatMode::Strict;
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), config);

        let err = pipeline
            .transform(dataset(&["views"], &[&["12"], &["n/a"]]))
            .await
            .unwrap_err();
        match err {
            CompactError::ParseError { input, reason } => {
                assert_eq!(input, "n/a");
                assert!(reason.contains("row 2"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = pipeline
            .transform(dataset(&["views"], &[&["-4"]]))
            .await
            .unwrap_err();
        assert!(matches!(err, CompactError::UnsupportedValueError { .. }));
    }

    #[tokio::test]
    async fn test_transform_strict_treats_non_finite_cells_as_parse_errors() {
        let mut config = MockConfig::new(&["v"]);
        config.mode = FormatMode::Strict;
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), config);

        for cell in ["inf", "NaN", "-infinity"] {
            let err = pipeline
                .transform(dataset(&["v"], &[&[cell]]))
                .await
                .unwrap_err();
            match err {
                CompactError::ParseError { input, reason } => {
                    assert_eq!(input, cell);
                    assert!(reason.contains("not a finite number"));
                    assert!(reason.contains("row 1, column 'v'"));
                }
                other => panic!("unexpected error for {}: {:?}", cell, other),
            }
        }
    }

    #[tokio::test]
    async fn test_transform_trims_headers_for_every_output_column() {
        let mut config = MockConfig::new(&["views"]);
        config.keep_original = true;
        config.output_formats = vec!["json".to_string()];
        let storage = MockStorage::new();
        let pipeline = CsvCompactPipeline::new(storage.clone(), config);

        let result = pipeline
            .transform(dataset(&[" title ", " views "], &[&["a", "1500"]]))
            .await
            .unwrap();
        assert_eq!(result.headers, vec!["title", "views", "views_compact"]);

        pipeline.load(result).await.unwrap();
        let json = storage.get_file("test_output/compacted.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["records"][0]["title"], "a");
        assert_eq!(value["records"][0]["views"], "1500");
        assert_eq!(value["records"][0]["views_compact"], "1.5k");
    }

    #[tokio::test]
    async fn test_transform_rejects_duplicate_output_headers() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["views"]));
        let err = pipeline
            .transform(dataset(&["views", "title", "title "], &[&["1", "a", "b"]]))
            .await
            .unwrap_err();
        assert!(matches!(err, CompactError::DuplicateColumnError { column } if column == "title"));

        let mut config = MockConfig::new(&["views"]);
        config.keep_original = true;
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), config);
        let err = pipeline
            .transform(dataset(&["views", "views_compact"], &[&["1", "x"]]))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CompactError::DuplicateColumnError { column } if column == "views_compact")
        );
    }

    #[tokio::test]
    async fn test_transform_unknown_column() {
        let pipeline = CsvCompactPipeline::new(MockStorage::new(), MockConfig::new(&["likes"]));

        let err = pipeline
            .transform(dataset(&["views"], &[&["1"]]))
            .await
            .unwrap_err();
        assert!(matches!(err, CompactError::MissingColumnError { column } if column == "likes"));
    }

    #[tokio::test]
    async fn test_load_writes_every_format() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(&["views"]);
        config.output_formats = vec!["csv".to_string(), "tsv".to_string(), "json".to_string()];
        let pipeline = CsvCompactPipeline::new(storage.clone(), config);

        let result = TransformResult {
            headers: vec!["title".to_string(), "views".to_string()],
            records: vec![Record::new(vec!["Intro, part 1".to_string(), "1.5k".to_string()])],
            stats: CompactStats {
                rows: 1,
                compacted: 1,
                skipped: 0,
                empty: 0,
            },
        };

        let written = pipeline.load(result).await.unwrap();
        assert_eq!(
            written,
            vec![
                "test_output/compacted.csv",
                "test_output/compacted.tsv",
                "test_output/compacted.json"
            ]
        );

        let csv = storage.get_file("test_output/compacted.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "title,views\n\"Intro, part 1\",1.5k\n"
        );

        let tsv = storage.get_file("test_output/compacted.tsv").await.unwrap();
        assert_eq!(
            String::from_utf8(tsv).unwrap(),
            "title\tviews\nIntro, part 1\t1.5k\n"
        );

        let json = storage.get_file("test_output/compacted.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["stats"]["compacted"], 1);
        assert_eq!(value["records"][0]["views"], "1.5k");
        assert!(value["generated_at"].is_string());
    }
}
