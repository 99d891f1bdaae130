//! Source extraction: CSV/JSON into unified [`RawRecord`]s.
//!
//! Converts heterogeneous raw exports into the single record shape the
//! transform engine consumes. Encoding and delimiter are auto-detected for
//! CSV; header names are normalized through a static alias table so the
//! engine never needs per-source-format branching.

pub mod api;

use serde_json::Value;
use std::path::Path;

use crate::error::{ExtractError, ExtractResult};
use crate::models::RawRecord;

/// Result of extraction with source metadata.
#[derive(Debug, Clone)]
pub struct ExtractOutput {
    /// Unified records, in source order.
    pub records: Vec<RawRecord>,
    /// Detected or assumed encoding.
    pub encoding: String,
    /// Detected delimiter (CSV only; ',' for JSON sources).
    pub delimiter: char,
    /// Original column headers (CSV only; empty for JSON sources).
    pub headers: Vec<String>,
}

// =============================================================================
// Header normalization
// =============================================================================

/// Map a source column header to its canonical field name.
///
/// Covers the canonical names plus the Alpha Vantage and legacy export
/// spellings. Unknown columns are ignored by the extractor.
pub fn canonical_field(header: &str) -> Option<&'static str> {
    let normalized = header.trim().to_lowercase().replace([' ', '-'], "_");
    match normalized.as_str() {
        "ticker" | "symbol" => Some("ticker"),
        "date" | "fiscal_period" | "fiscaldateending" | "fiscal_date_ending" => Some("date"),
        "revenue" | "total_revenue" | "totalrevenue" => Some("revenue"),
        "operating_income" | "operatingincome" => Some("operating_income"),
        "net_income" | "netincome" | "profit" => Some("net_income"),
        "operating_cashflow" | "operatingcashflow" => Some("operating_cashflow"),
        "total_assets" | "totalassets" => Some("total_assets"),
        "total_liabilities" | "totalliabilities" => Some("total_liabilities"),
        _ => None,
    }
}

/// Parse a raw cell into an optional numeric value.
///
/// Empty cells and the usual textual null markers become `None`, as do
/// unparseable or non-finite values. Nulls are the unavailable-value
/// representation throughout the pipeline; sentinels are never inserted.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_lowercase().as_str() {
        "none" | "null" | "nan" | "n/a" | "na" | "-" => return None,
        _ => {}
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Encoding and delimiter detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ExtractResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// CSV extraction
// =============================================================================

/// Parse CSV content with an explicit delimiter into raw records.
///
/// Headers are normalized through [`canonical_field`]; unknown columns are
/// ignored. Rows lacking both identity cells are still emitted (with empty
/// identity) and rejected later by the transform engine, so a malformed row
/// is reported against its record index rather than silently dropped.
pub fn parse_csv(content: &str, delimiter: char) -> ExtractResult<(Vec<RawRecord>, Vec<String>)> {
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(ExtractError::EmptyFile)?;

    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ExtractError::NoHeaders);
    }

    let fields: Vec<Option<&'static str>> =
        headers.iter().map(|h| canonical_field(h)).collect();

    let mut records = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(delimiter).collect();
        let mut record = RawRecord::new("", "");

        for (i, field) in fields.iter().enumerate() {
            let raw = values.get(i).map(|s| s.trim().trim_matches('"')).unwrap_or("");
            match field {
                Some("ticker") => record.ticker = raw.to_string(),
                Some("date") => record.date = raw.to_string(),
                Some("revenue") => record.revenue = parse_numeric(raw),
                Some("operating_income") => record.operating_income = parse_numeric(raw),
                Some("net_income") => record.net_income = parse_numeric(raw),
                Some("operating_cashflow") => record.operating_cashflow = parse_numeric(raw),
                Some("total_assets") => record.total_assets = parse_numeric(raw),
                Some("total_liabilities") => record.total_liabilities = parse_numeric(raw),
                _ => {}
            }
        }

        records.push(record);
    }

    Ok((records, headers))
}

/// Extract CSV bytes with auto-detection of encoding and delimiter.
pub fn extract_csv_bytes(bytes: &[u8]) -> ExtractResult<ExtractOutput> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let (records, headers) = parse_csv(&content, delimiter)?;

    Ok(ExtractOutput {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Extract a CSV file with auto-detection.
pub fn extract_csv_file<P: AsRef<Path>>(path: P) -> ExtractResult<ExtractOutput> {
    let bytes = std::fs::read(path.as_ref())?;
    extract_csv_bytes(&bytes)
}

// =============================================================================
// JSON extraction
// =============================================================================

/// Extract a JSON array of records.
///
/// Serde aliases on [`RawRecord`] handle the upstream field spellings;
/// numeric values that arrive as strings are coerced through
/// [`parse_numeric`].
pub fn extract_json_bytes(bytes: &[u8]) -> ExtractResult<ExtractOutput> {
    let values: Vec<Value> = serde_json::from_slice(bytes)?;

    if values.is_empty() {
        return Err(ExtractError::EmptyFile);
    }

    let records = values
        .into_iter()
        .map(|v| record_from_json(coerce_string_numerics(v)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExtractOutput {
        records,
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers: Vec::new(),
    })
}

/// Extract a JSON file.
pub fn extract_json_file<P: AsRef<Path>>(path: P) -> ExtractResult<ExtractOutput> {
    let bytes = std::fs::read(path.as_ref())?;
    extract_json_bytes(&bytes)
}

fn record_from_json(value: Value) -> ExtractResult<RawRecord> {
    Ok(serde_json::from_value(value)?)
}

/// API payloads sometimes quote numerics ("383285000000"). Rewrite string
/// values of known numeric fields into numbers (or null) before typed
/// deserialization.
fn coerce_string_numerics(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        for (key, v) in map.iter_mut() {
            let numeric_field = matches!(
                canonical_field(key),
                Some(
                    "revenue"
                        | "operating_income"
                        | "net_income"
                        | "operating_cashflow"
                        | "total_assets"
                        | "total_liabilities"
                )
            );
            if numeric_field {
                if let Value::String(s) = v {
                    *v = match parse_numeric(s) {
                        Some(n) => serde_json::json!(n),
                        None => Value::Null,
                    };
                }
            }
        }
    }
    value
}

/// Extract bytes, dispatching on content: JSON arrays start with '[',
/// everything else is treated as CSV.
pub fn extract_bytes_auto(bytes: &[u8]) -> ExtractResult<ExtractOutput> {
    let looks_like_json = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|&b| b == b'[')
        .unwrap_or(false);

    if looks_like_json {
        extract_json_bytes(bytes)
    } else {
        extract_csv_bytes(bytes)
    }
}

/// Extract a file, dispatching on extension (`.json` vs CSV), falling back
/// to content sniffing.
pub fn extract_file_auto<P: AsRef<Path>>(path: P) -> ExtractResult<ExtractOutput> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => extract_json_file(path),
        Some("csv") | Some("tsv") | Some("txt") => extract_csv_file(path),
        _ => {
            let bytes = std::fs::read(path)?;
            extract_bytes_auto(&bytes)
        }
    }
}
