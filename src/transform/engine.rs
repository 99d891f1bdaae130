//! The Transform Engine.
//!
//! Consumes a sequence of [`RawRecord`]s and produces the Standard Table
//! and the Category Table, plus a per-run data-quality summary.
//!
//! # Contract
//!
//! - Records are partitioned by ticker and ordered by date ascending;
//!   growth for period `t` always references `t-1` within the same ticker
//!   partition, never across tickers.
//! - Any numeric input that is null or non-finite, and any ratio with a
//!   zero/unavailable denominator, resolves to a null output field. Fields
//!   are independent: one unavailable field never nulls its siblings.
//! - The first chronological record of each ticker has null growth fields
//!   by definition.
//! - Output ordering is ticker-then-date ascending regardless of input
//!   order, and both tables have exactly one row per input record.
//!
//! The engine is a pure function over in-memory data: no I/O, no clock, no
//! hash-iteration dependence. The same input always yields bit-identical
//! output.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CategoryRow, CategoryTable, RawRecord, StandardRow, StandardTable};
use crate::transform::classify::TransformConfig;
use crate::validation::validate_raw_records;
use crate::error::TransformResult;

// =============================================================================
// Null-safe arithmetic
// =============================================================================

/// Treat non-finite values as unavailable.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Null-safe division: unavailable numerator/denominator, zero denominator
/// and non-finite results all become `None`. Never panics, never emits
/// ±Inf or NaN.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let n = finite(numerator)?;
    let d = finite(denominator)?;
    if d == 0.0 {
        return None;
    }
    finite(Some(n / d))
}

/// Relative change from `previous` to `current`.
fn relative_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let c = finite(current)?;
    let p = finite(previous)?;
    if p == 0.0 {
        return None;
    }
    finite(Some((c - p) / p))
}

// =============================================================================
// Run Summary
// =============================================================================

/// Per-run data-quality report: how many derived fields resolved to null,
/// per column, and which tickers fell back to the default sector.
///
/// Uses ordered collections so the report serializes identically across
/// runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of input records.
    pub rows_in: usize,
    /// Null counts per derived column.
    pub nulled_fields: BTreeMap<String, usize>,
    /// Tickers absent from the sector lookup.
    pub unmapped_tickers: BTreeSet<String>,
}

impl RunSummary {
    fn count_null(&mut self, field: &str, value: Option<f64>) {
        if value.is_none() {
            *self.nulled_fields.entry(field.to_string()).or_insert(0) += 1;
        }
    }

    /// Total nulled derived fields across all columns.
    pub fn total_nulled(&self) -> usize {
        self.nulled_fields.values().sum()
    }
}

// =============================================================================
// Transform Engine
// =============================================================================

/// Output of one transform invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub standard: StandardTable,
    pub category: CategoryTable,
    pub summary: RunSummary,
}

/// The transform engine, parameterized by an injected classification
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    config: TransformConfig,
}

impl TransformEngine {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transform raw records into the Standard and Category tables.
    ///
    /// Fails only on structural violations (empty input, record missing
    /// ticker or date); every per-value issue degrades to null or a
    /// fallback category and is accounted for in the summary.
    pub fn transform(&self, records: &[RawRecord]) -> TransformResult<TransformOutput> {
        validate_raw_records(records)?;

        // Partition by ticker; order each partition by date ascending.
        // BTreeMap keeps ticker iteration deterministic.
        let mut partitions: BTreeMap<&str, Vec<&RawRecord>> = BTreeMap::new();
        for record in records {
            partitions.entry(&record.ticker).or_default().push(record);
        }
        for partition in partitions.values_mut() {
            partition.sort_by(|a, b| a.date.cmp(&b.date));
        }

        let mut standard = Vec::with_capacity(records.len());
        let mut category = Vec::with_capacity(records.len());
        let mut summary = RunSummary {
            rows_in: records.len(),
            ..RunSummary::default()
        };

        for (ticker, partition) in &partitions {
            let (sector, mapped) = self.config.sectors.resolve(ticker);
            if !mapped {
                summary.unmapped_tickers.insert((*ticker).to_string());
            }
            let sector = sector.to_string();

            let mut previous: Option<&RawRecord> = None;
            for &record in partition {
                let row = self.derive_row(record, previous, &mut summary);

                category.push(CategoryRow {
                    ticker: row.ticker.clone(),
                    date: row.date.clone(),
                    sector: sector.clone(),
                    category: self.config.growth.classify(row.revenue_growth),
                    risk_level: self.config.risk.classify(row.debt_to_asset),
                    revenue: row.revenue,
                    operating_income: row.operating_income,
                    net_income: row.net_income,
                });
                standard.push(row);

                previous = Some(record);
            }
        }

        Ok(TransformOutput {
            standard,
            category,
            summary,
        })
    }

    /// Compute one StandardRow from a record and its chronological
    /// predecessor within the same ticker partition.
    fn derive_row(
        &self,
        record: &RawRecord,
        previous: Option<&RawRecord>,
        summary: &mut RunSummary,
    ) -> StandardRow {
        let profit_margin = ratio(record.net_income, record.revenue);
        let operating_margin = ratio(record.operating_income, record.revenue);
        let asset_efficiency = ratio(record.revenue, record.total_assets);
        let debt_to_asset = ratio(record.total_liabilities, record.total_assets);

        // First period of a ticker has no predecessor: growth is null by
        // definition, not an error.
        let revenue_growth =
            previous.and_then(|p| relative_change(record.revenue, p.revenue));
        let net_income_growth =
            previous.and_then(|p| relative_change(record.net_income, p.net_income));

        summary.count_null("profit_margin", profit_margin);
        summary.count_null("operating_margin", operating_margin);
        summary.count_null("revenue_growth", revenue_growth);
        summary.count_null("net_income_growth", net_income_growth);
        summary.count_null("asset_efficiency", asset_efficiency);
        summary.count_null("debt_to_asset", debt_to_asset);

        StandardRow {
            ticker: record.ticker.clone(),
            date: record.date.clone(),
            revenue: finite(record.revenue),
            operating_income: finite(record.operating_income),
            net_income: finite(record.net_income),
            operating_cashflow: finite(record.operating_cashflow),
            total_assets: finite(record.total_assets),
            total_liabilities: finite(record.total_liabilities),
            profit_margin,
            operating_margin,
            revenue_growth,
            net_income_growth,
            asset_efficiency,
            debt_to_asset,
        }
    }
}

/// Transform with the default configuration.
pub fn transform(records: &[RawRecord]) -> TransformResult<TransformOutput> {
    TransformEngine::default().transform(records)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::models::{GrowthCategory, RiskLevel};

    fn record(
        ticker: &str,
        date: &str,
        revenue: Option<f64>,
        net_income: Option<f64>,
    ) -> RawRecord {
        RawRecord {
            revenue,
            net_income,
            ..RawRecord::new(ticker, date)
        }
    }

    fn full_record(ticker: &str, date: &str) -> RawRecord {
        RawRecord {
            ticker: ticker.into(),
            date: date.into(),
            revenue: Some(100.0),
            operating_income: Some(25.0),
            net_income: Some(20.0),
            operating_cashflow: Some(30.0),
            total_assets: Some(200.0),
            total_liabilities: Some(120.0),
        }
    }

    #[test]
    fn test_row_counts_match_input() {
        let records = vec![
            full_record("AAPL", "2021-09-30"),
            full_record("AAPL", "2022-09-30"),
            full_record("MSFT", "2022-06-30"),
        ];

        let out = transform(&records).unwrap();
        assert_eq!(out.standard.len(), 3);
        assert_eq!(out.category.len(), 3);
        assert_eq!(out.summary.rows_in, 3);
    }

    #[test]
    fn test_revenue_growth_scenario() {
        // Two periods for AAPL, revenue 100 -> 150: growth of period 2 is 0.5
        let records = vec![
            record("AAPL", "2022-09-30", Some(100.0), Some(10.0)),
            record("AAPL", "2023-09-30", Some(150.0), Some(20.0)),
        ];

        let out = transform(&records).unwrap();
        assert_eq!(out.standard[0].revenue_growth, None);
        assert_eq!(out.standard[1].revenue_growth, Some(0.5));
        assert_eq!(out.standard[1].net_income_growth, Some(1.0));
    }

    #[test]
    fn test_first_row_growth_null_per_ticker() {
        let records = vec![
            full_record("MSFT", "2021-06-30"),
            full_record("MSFT", "2022-06-30"),
            full_record("AAPL", "2021-09-30"),
            full_record("AAPL", "2022-09-30"),
        ];

        let out = transform(&records).unwrap();
        // Output is ticker-then-date ordered: AAPL first.
        assert_eq!(out.standard[0].ticker, "AAPL");
        assert!(out.standard[0].revenue_growth.is_none());
        assert!(out.standard[0].net_income_growth.is_none());
        assert_eq!(out.standard[2].ticker, "MSFT");
        assert!(out.standard[2].revenue_growth.is_none());
        // Growth never crosses the ticker boundary.
        assert!(out.standard[1].revenue_growth.is_some());
        assert!(out.standard[3].revenue_growth.is_some());
    }

    #[test]
    fn test_zero_total_assets_yields_nulls() {
        let mut rec = full_record("AAPL", "2023-09-30");
        rec.total_assets = Some(0.0);

        let out = transform(&[rec]).unwrap();
        assert!(out.standard[0].asset_efficiency.is_none());
        assert!(out.standard[0].debt_to_asset.is_none());
        assert_eq!(out.category[0].risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_null_revenue_nulls_margins_only() {
        let mut rec = full_record("AAPL", "2023-09-30");
        rec.revenue = None;

        let out = transform(&[rec]).unwrap();
        let row = &out.standard[0];
        assert!(row.profit_margin.is_none());
        assert!(row.operating_margin.is_none());
        assert!(row.asset_efficiency.is_none());
        // Independent fields survive.
        assert_eq!(row.debt_to_asset, Some(0.6));
        assert_eq!(row.net_income, Some(20.0));
    }

    #[test]
    fn test_non_finite_inputs_sanitized() {
        let mut rec = full_record("AAPL", "2023-09-30");
        rec.revenue = Some(f64::NAN);
        rec.total_liabilities = Some(f64::INFINITY);

        let out = transform(&[rec]).unwrap();
        let row = &out.standard[0];
        assert!(row.revenue.is_none());
        assert!(row.total_liabilities.is_none());
        assert!(row.profit_margin.is_none());
        assert!(row.debt_to_asset.is_none());
        // No ±Inf ever reaches the output.
        for v in [row.operating_margin, row.asset_efficiency] {
            if let Some(v) = v {
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn test_single_record_neutral_buckets() {
        let rec = record("AAPL", "2023-09-30", Some(100.0), Some(20.0));

        let out = transform(&[rec]).unwrap();
        assert_eq!(out.standard.len(), 1);
        assert_eq!(out.category.len(), 1);
        assert!(out.standard[0].revenue_growth.is_none());
        assert!(out.standard[0].net_income_growth.is_none());
        assert_eq!(out.category[0].category, GrowthCategory::Unclassified);
        assert_eq!(out.category[0].risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_unmapped_ticker_falls_back() {
        let rec = full_record("ZZZZ", "2023-09-30");

        let out = transform(&[rec]).unwrap();
        assert_eq!(out.category[0].sector, "Other");
        assert!(out.summary.unmapped_tickers.contains("ZZZZ"));
    }

    #[test]
    fn test_input_order_independence() {
        let a = vec![
            full_record("MSFT", "2022-06-30"),
            record("AAPL", "2023-09-30", Some(150.0), Some(30.0)),
            record("AAPL", "2022-09-30", Some(100.0), Some(20.0)),
        ];
        let mut b = a.clone();
        b.reverse();

        let out_a = transform(&a).unwrap();
        let out_b = transform(&b).unwrap();

        assert_eq!(out_a.standard, out_b.standard);
        assert_eq!(out_a.category, out_b.category);
        // Internal ordering is ticker+date regardless of input order.
        assert_eq!(out_a.standard[0].date, "2022-09-30");
        assert_eq!(out_a.standard[1].revenue_growth, Some(0.5));
    }

    #[test]
    fn test_idempotence() {
        let records = vec![
            full_record("AAPL", "2021-09-30"),
            full_record("AAPL", "2022-09-30"),
            full_record("TSLA", "2022-12-31"),
        ];

        let first = transform(&records).unwrap();
        let second = transform(&records).unwrap();

        assert_eq!(first.standard, second.standard);
        assert_eq!(first.category, second.category);
        assert_eq!(
            serde_json::to_string(&first.summary).unwrap(),
            serde_json::to_string(&second.summary).unwrap()
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(transform(&[]), Err(TransformError::EmptyInput)));
    }

    #[test]
    fn test_record_missing_identity_rejected() {
        let records = vec![full_record("AAPL", "2022-09-30"), RawRecord::new("", "2023-09-30")];
        assert!(matches!(
            transform(&records),
            Err(TransformError::MissingIdentity { index: 1, .. })
        ));
    }

    #[test]
    fn test_classification_buckets() {
        let records = vec![
            record("AAPL", "2021-09-30", Some(100.0), Some(10.0)),
            record("AAPL", "2022-09-30", Some(130.0), Some(12.0)), // +30% -> High Growth
            record("AAPL", "2023-09-30", Some(140.0), Some(12.0)), // +7.7% -> Moderate
            record("AAPL", "2024-09-30", Some(141.0), Some(12.0)), // +0.7% -> Stable
        ];

        let out = transform(&records).unwrap();
        assert_eq!(out.category[0].category, GrowthCategory::Unclassified);
        assert_eq!(out.category[1].category, GrowthCategory::HighGrowth);
        assert_eq!(out.category[2].category, GrowthCategory::ModerateGrowth);
        assert_eq!(out.category[3].category, GrowthCategory::Stable);
    }

    #[test]
    fn test_risk_buckets_from_leverage() {
        let mut low = full_record("AAPL", "2021-09-30");
        low.total_liabilities = Some(20.0); // 0.1
        let mut medium = full_record("AAPL", "2022-09-30");
        medium.total_liabilities = Some(100.0); // 0.5
        let mut high = full_record("AAPL", "2023-09-30");
        high.total_liabilities = Some(160.0); // 0.8

        let out = transform(&[low, medium, high]).unwrap();
        assert_eq!(out.category[0].risk_level, RiskLevel::Low);
        assert_eq!(out.category[1].risk_level, RiskLevel::Medium);
        assert_eq!(out.category[2].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_summary_null_accounting() {
        let records = vec![
            record("AAPL", "2022-09-30", Some(100.0), None),
            record("AAPL", "2023-09-30", Some(150.0), Some(30.0)),
        ];

        let out = transform(&records).unwrap();
        let nulls = &out.summary.nulled_fields;
        // profit_margin null in row 1; growth fields null in row 1;
        // net_income_growth also null in row 2 (no previous value).
        assert_eq!(nulls.get("profit_margin"), Some(&1));
        assert_eq!(nulls.get("revenue_growth"), Some(&1));
        assert_eq!(nulls.get("net_income_growth"), Some(&2));
        // No assets in either record.
        assert_eq!(nulls.get("asset_efficiency"), Some(&2));
        assert!(out.summary.total_nulled() >= 6);
    }

    #[test]
    fn test_tables_ticker_aligned() {
        let records = vec![
            full_record("TSLA", "2022-12-31"),
            full_record("AAPL", "2022-09-30"),
        ];

        let out = transform(&records).unwrap();
        for (s, c) in out.standard.iter().zip(&out.category) {
            assert_eq!(s.ticker, c.ticker);
            assert_eq!(s.date, c.date);
            assert_eq!(s.revenue, c.revenue);
        }
    }
}
