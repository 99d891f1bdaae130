//! # FinCast - financial report ETL feature engineering
//!
//! FinCast converts heterogeneous raw financial statement records
//! (CSV exports, JSON dumps, Alpha Vantage payloads) into two normalized,
//! analysis-ready tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │  Raw source │────▶│  Extractor  │────▶│  Transform   │────▶│ Standard Table   │
//! │ (CSV/JSON/  │     │ (auto-enc,  │     │   Engine     │     │ Category Table   │
//! │  API)       │     │  aliases)   │     │ (features +  │     │ (staged for the  │
//! └─────────────┘     └─────────────┘     │  buckets)    │     │  Loader)         │
//!                                         └──────────────┘     └──────────────────┘
//! ```
//!
//! The Transform Engine computes six derived features per record
//! (margins, growth rates, asset efficiency, leverage), classifies each
//! record into growth and risk buckets, and maps tickers to sectors.
//! Missing or non-finite inputs and zero denominators resolve to null
//! fields, never sentinels and never errors; only structurally malformed
//! input (empty sequence, record without ticker/date) rejects a run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fincast::pipeline::{run_file, PipelineOptions};
//! use std::path::Path;
//!
//! let result = run_file(Path::new("financial_data_raw.json"), PipelineOptions::default())?;
//! println!("{} rows per table", result.standard.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (RawRecord, StandardRow, CategoryRow)
//! - [`extract`] - Source parsing with auto-detection; Alpha Vantage client
//! - [`validation`] - Structural raw-record checks
//! - [`transform`] - Classification config, engine, and pipeline
//! - [`load`] - Staged outputs and persisted-schema DDL
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Extraction
pub mod extract;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Staged outputs
pub mod load;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ApiFetchError, ExtractError, LoadError, PipelineError, ServerError, TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CategoryRow, CategoryTable, GrowthCategory, RawRecord, RiskLevel, StandardRow, StandardTable,
};

// =============================================================================
// Re-exports - Extraction
// =============================================================================

pub use extract::{
    api::AlphaVantageClient, detect_delimiter, detect_encoding, extract_bytes_auto,
    extract_csv_bytes, extract_csv_file, extract_file_auto, extract_json_bytes, ExtractOutput,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_raw_record, validate_raw_record, validate_raw_records};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    classify::{SectorMap, ThresholdScale, TransformConfig},
    engine::{transform, RunSummary, TransformEngine, TransformOutput},
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub mod pipeline {
    pub use crate::transform::pipeline::{
        run_bytes, run_file, run_records, PipelineOptions, PipelineOutput, SourceInfo,
    };
}

// =============================================================================
// Re-exports - Load
// =============================================================================

pub use load::{
    schema_ddl, write_staged, StagedPaths, CATEGORY_TABLE_DDL, STANDARD_TABLE_DDL,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
