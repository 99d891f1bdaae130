//! High-level pipeline API: extract → transform → run summary.
//!
//! This module combines the extractor adapters and the transform engine
//! into single entry points used by the CLI and the HTTP server.
//!
//! # Example
//!
//! ```rust,ignore
//! use fincast::pipeline::{run_file, PipelineOptions};
//! use std::path::Path;
//!
//! let result = run_file(Path::new("financial_data_raw.json"), PipelineOptions::default())?;
//! println!("{} standard rows", result.standard.len());
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::extract::{extract_bytes_auto, extract_file_auto, ExtractOutput};
use crate::models::{CategoryTable, RawRecord, StandardTable};
use crate::transform::classify::TransformConfig;
use crate::transform::engine::{RunSummary, TransformEngine};

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Classification configuration; defaults are used when absent.
    pub config: Option<TransformConfig>,
}

impl PipelineOptions {
    pub fn with_config(config: TransformConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// The numeric feature table.
    pub standard: StandardTable,
    /// The qualitative classification table.
    pub category: CategoryTable,
    /// Per-run data-quality summary.
    pub summary: RunSummary,
    /// Source metadata.
    pub source: SourceInfo,
}

/// Source file information.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ExtractOutput> for SourceInfo {
    fn from(output: &ExtractOutput) -> Self {
        Self {
            encoding: output.encoding.clone(),
            delimiter: output.delimiter,
            headers: output.headers.clone(),
            row_count: output.records.len(),
        }
    }
}

/// Run the pipeline over a source file (CSV or JSON).
pub fn run_file(path: &Path, options: PipelineOptions) -> PipelineResult<PipelineOutput> {
    log_info(format!("Reading source file: {}", path.display()));
    let extracted = extract_file_auto(path)?;
    run_extracted(extracted, options)
}

/// Run the pipeline over raw source bytes.
pub fn run_bytes(bytes: &[u8], options: PipelineOptions) -> PipelineResult<PipelineOutput> {
    let extracted = extract_bytes_auto(bytes)?;
    run_extracted(extracted, options)
}

/// Run the pipeline over already-extracted records.
pub fn run_records(
    records: Vec<RawRecord>,
    options: PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    run_extracted(
        ExtractOutput {
            records,
            encoding: "utf-8".to_string(),
            delimiter: ',',
            headers: Vec::new(),
        },
        options,
    )
}

/// Internal: transform extracted records and narrate the run.
fn run_extracted(
    extracted: ExtractOutput,
    options: PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    let source = SourceInfo::from(&extracted);

    log_success(format!(
        "Extracted {} records (encoding: {})",
        extracted.records.len(),
        source.encoding
    ));

    let engine = TransformEngine::new(options.config.unwrap_or_default());

    log_info("Transforming records...");
    let output = engine.transform(&extracted.records)?;

    log_success(format!(
        "Standard table: {} rows, Category table: {} rows",
        output.standard.len(),
        output.category.len()
    ));

    report_summary(&output.summary);

    Ok(PipelineOutput {
        standard: output.standard,
        category: output.category,
        summary: output.summary,
        source,
    })
}

/// Narrate the data-quality summary: nulled fields are informational,
/// unmapped tickers are warnings.
fn report_summary(summary: &RunSummary) {
    if summary.total_nulled() > 0 {
        log_info(format!(
            "{} derived fields resolved to null across {} rows",
            summary.total_nulled(),
            summary.rows_in
        ));
        for (field, count) in &summary.nulled_fields {
            log_info(format!("  {}: {} null", field, count));
        }
    } else {
        log_success("All derived fields computed");
    }

    for ticker in &summary.unmapped_tickers {
        log_warning(format!(
            "Ticker '{}' not in sector lookup, using fallback sector",
            ticker
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrowthCategory;

    #[test]
    fn test_run_bytes_csv() {
        let csv = b"ticker,date,revenue,net_income,total_assets,total_liabilities\n\
AAPL,2022-09-30,100,20,200,120\n\
AAPL,2023-09-30,150,30,210,130\n";

        let out = run_bytes(csv, PipelineOptions::default()).unwrap();
        assert_eq!(out.standard.len(), 2);
        assert_eq!(out.category.len(), 2);
        assert_eq!(out.standard[1].revenue_growth, Some(0.5));
        assert_eq!(out.category[1].category, GrowthCategory::HighGrowth);
        assert_eq!(out.source.row_count, 2);
        assert_eq!(out.source.delimiter, ',');
    }

    #[test]
    fn test_run_bytes_json() {
        let json = br#"[
            {"symbol": "MSFT", "fiscalDateEnding": "2023-06-30", "totalRevenue": 211915000000.0}
        ]"#;

        let out = run_bytes(json, PipelineOptions::default()).unwrap();
        assert_eq!(out.standard.len(), 1);
        assert_eq!(out.category[0].sector, "Technology");
    }

    #[test]
    fn test_run_records_with_custom_config() {
        use crate::transform::classify::SectorMap;

        let mut config = TransformConfig::default();
        config.sectors = SectorMap::from_entries([("ZZZZ", "Utilities")]);

        let records = vec![crate::models::RawRecord::new("ZZZZ", "2023-12-31")];
        let out = run_records(records, PipelineOptions::with_config(config)).unwrap();

        assert_eq!(out.category[0].sector, "Utilities");
        assert!(out.summary.unmapped_tickers.is_empty());
    }

    #[test]
    fn test_empty_source_fails() {
        let err = run_bytes(b"", PipelineOptions::default()).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("empty"));
    }
}
