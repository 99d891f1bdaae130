//! Structural validation for raw records.
//!
//! The transform engine rejects an invocation only on structural
//! violations: an empty input sequence, or a record missing its identifying
//! fields (`ticker`, `date`). Everything else — missing numerics, zero
//! denominators, unmapped tickers — degrades to null fields or fallback
//! categories and never aborts the run.

use crate::error::{TransformError, TransformResult};
use crate::models::RawRecord;

/// Validate a single record's identity fields.
pub fn validate_raw_record(record: &RawRecord, index: usize) -> TransformResult<()> {
    if record.ticker.trim().is_empty() {
        return Err(TransformError::MissingIdentity {
            index,
            field: "ticker",
        });
    }
    if record.date.trim().is_empty() {
        return Err(TransformError::MissingIdentity {
            index,
            field: "date",
        });
    }
    Ok(())
}

/// Validate a full input sequence: non-empty, every record identified.
///
/// Returns the first violation; the pipeline aborts the whole run on it,
/// per the rejected-input policy.
pub fn validate_raw_records(records: &[RawRecord]) -> TransformResult<()> {
    if records.is_empty() {
        return Err(TransformError::EmptyInput);
    }
    for (index, record) in records.iter().enumerate() {
        validate_raw_record(record, index)?;
    }
    Ok(())
}

/// Quick boolean check for a single record.
pub fn is_valid_raw_record(record: &RawRecord) -> bool {
    validate_raw_record(record, 0).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record() {
        let record = RawRecord::new("AAPL", "2023-09-30");
        assert!(validate_raw_record(&record, 0).is_ok());
        assert!(is_valid_raw_record(&record));
    }

    #[test]
    fn test_missing_ticker() {
        let record = RawRecord::new("  ", "2023-09-30");
        let err = validate_raw_record(&record, 4).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingIdentity { index: 4, field: "ticker" }
        ));
    }

    #[test]
    fn test_missing_date() {
        let record = RawRecord::new("AAPL", "");
        let err = validate_raw_record(&record, 0).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingIdentity { field: "date", .. }
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            validate_raw_records(&[]),
            Err(TransformError::EmptyInput)
        ));
    }

    #[test]
    fn test_first_violation_reported() {
        let records = vec![
            RawRecord::new("AAPL", "2022-09-30"),
            RawRecord::new("", "2023-09-30"),
            RawRecord::new("MSFT", ""),
        ];
        let err = validate_raw_records(&records).unwrap_err();
        assert!(matches!(err, TransformError::MissingIdentity { index: 1, .. }));
    }
}
