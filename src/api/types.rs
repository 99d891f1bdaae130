//! REST API types for pipeline clients.
//!
//! The upload response carries both derived tables plus the per-run
//! data-quality summary, ready for the Loader or a dashboard.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{CategoryRow, StandardRow};
use crate::transform::engine::RunSummary;
use crate::transform::pipeline::{PipelineOutput, SourceInfo};

/// Response sent after source upload and transformation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "warning" (unmapped tickers or nulled fields)
    pub status: String,

    /// Standard Table rows (numeric features)
    pub standard_table: Vec<StandardRow>,

    /// Category Table rows (qualitative classification)
    pub category_table: Vec<CategoryRow>,

    /// Metadata about the run
    pub metadata: ResponseMetadata,
}

/// Metadata about the transformation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Rows per table (both tables always match the input count)
    pub total_rows: usize,

    /// Source file info
    pub source: SourceMetadata,

    /// Data-quality summary
    pub summary: RunSummary,
}

/// Source file metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<SourceInfo> for SourceMetadata {
    fn from(info: SourceInfo) -> Self {
        Self {
            encoding: info.encoding,
            delimiter: info.delimiter.to_string(),
            row_count: info.row_count,
            columns: info.headers,
        }
    }
}

impl From<PipelineOutput> for UploadResponse {
    fn from(output: PipelineOutput) -> Self {
        let clean =
            output.summary.total_nulled() == 0 && output.summary.unmapped_tickers.is_empty();

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if clean { "ready" } else { "warning" }.to_string(),
            metadata: ResponseMetadata {
                total_rows: output.standard.len(),
                source: output.source.into(),
                summary: output.summary,
            },
            standard_table: output.standard,
            category_table: output.category,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "standardTable": [],
        "categoryTable": [],
        "metadata": {
            "totalRows": 0
        }
    })
}
