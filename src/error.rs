//! Error types for the FinCast ETL pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ExtractError`] - raw file parsing errors (CSV/JSON)
//! - [`ApiFetchError`] - Alpha Vantage retrieval errors
//! - [`TransformError`] - rejected-input errors from the transform engine
//! - [`LoadError`] - staged output errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Per-value data-quality issues (missing numerics, zero denominators,
//! unmapped tickers) are NOT errors: they degrade to null fields and
//! fallback categories, and are accounted for in the run summary.

use thiserror::Error;

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors during raw source parsing (CSV or JSON).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the detected encoding.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Source file contains no rows.
    #[error("Source file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// JSON input could not be parsed as a record array.
    #[error("Invalid JSON records: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// API Retrieval Errors
// =============================================================================

/// Errors from the Alpha Vantage client.
#[derive(Debug, Error)]
pub enum ApiFetchError {
    /// Missing API key.
    #[error("Missing ALPHAVANTAGE_API_KEY environment variable")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Response body was not the expected statement payload.
    #[error("Invalid API response for {symbol}: {message}")]
    InvalidResponse { symbol: String, message: String },

    /// API-side rejection (rate limit, bad symbol).
    #[error("API error: {0}")]
    ApiError(String),
}

// =============================================================================
// Transform Errors (rejected input)
// =============================================================================

/// Structural violations rejected by the transform engine.
///
/// These are the only fatal conditions: the engine never fails on
/// individual bad data points.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input sequence contains no records.
    #[error("No records to transform")]
    EmptyInput,

    /// A record is missing one of its identifying fields.
    #[error("Record {index} is missing required field '{field}'")]
    MissingIdentity { index: usize, field: &'static str },
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while writing staged outputs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error.
    #[error("Failed to write staged output: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON write error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction error.
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// API retrieval error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] ApiFetchError),

    /// Rejected input.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Staged output error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for API retrieval operations.
pub type ApiFetchResult<T> = Result<T, ApiFetchError>;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for staged output operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ExtractError -> PipelineError
        let extract_err = ExtractError::EmptyFile;
        let pipeline_err: PipelineError = extract_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // TransformError -> PipelineError
        let transform_err = TransformError::MissingIdentity {
            index: 3,
            field: "ticker",
        };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("ticker"));
        assert!(pipeline_err.to_string().contains('3'));
    }

    #[test]
    fn test_empty_input_message() {
        let err = TransformError::EmptyInput;
        assert_eq!(err.to_string(), "No records to transform");
    }
}
