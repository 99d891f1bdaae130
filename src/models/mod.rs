//! Domain models for the FinCast ETL pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RawRecord`] - one company-period observation as extracted from a source
//! - [`StandardRow`] - one row of the Standard Table (numeric ML features)
//! - [`CategoryRow`] - one row of the Category Table (qualitative buckets)
//! - [`GrowthCategory`] - revenue-growth bucket labels
//! - [`RiskLevel`] - leverage-based risk bucket labels

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Record
// =============================================================================

/// One company-period financial statement observation.
///
/// The extractor normalizes every source format (CSV, JSON, API) into this
/// single shape. Serde aliases accept the upstream field names used by the
/// Alpha Vantage payloads and legacy exports, so downstream code never
/// branches per source format.
///
/// Numeric fields are optional: a missing value stays missing and is
/// resolved to null features by the transform engine, never to a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Company identifier (e.g. "AAPL").
    ///
    /// Defaults to empty when absent so a malformed record reaches the
    /// engine's rejected-input check instead of failing deserialization.
    #[serde(default, alias = "symbol")]
    pub ticker: String,

    /// Fiscal period end, sortable text (ISO `YYYY-MM-DD`).
    /// Unique per (ticker, date).
    #[serde(default, alias = "fiscal_period", alias = "fiscalDateEnding")]
    pub date: String,

    #[serde(default, alias = "totalRevenue", alias = "total_revenue")]
    pub revenue: Option<f64>,

    #[serde(default, alias = "operatingIncome")]
    pub operating_income: Option<f64>,

    #[serde(default, alias = "netIncome", alias = "profit")]
    pub net_income: Option<f64>,

    #[serde(default, alias = "operatingCashflow")]
    pub operating_cashflow: Option<f64>,

    #[serde(default, alias = "totalAssets")]
    pub total_assets: Option<f64>,

    #[serde(default, alias = "totalLiabilities")]
    pub total_liabilities: Option<f64>,
}

impl RawRecord {
    /// Create a record with identity fields only; numerics start missing.
    pub fn new(ticker: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            date: date.into(),
            revenue: None,
            operating_income: None,
            net_income: None,
            operating_cashflow: None,
            total_assets: None,
            total_liabilities: None,
        }
    }
}

// =============================================================================
// Standard Table
// =============================================================================

/// One row of the Standard Table: the six raw numerics plus six derived
/// features, all nullable.
///
/// `id` and `created_at` are database-side columns (see [`crate::load`]
/// for the DDL); the in-memory row carries the value-bearing columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRow {
    pub ticker: String,
    pub date: String,

    // Raw numerics (sanitized: never NaN/Inf)
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub operating_cashflow: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,

    // Derived features
    /// net_income / revenue
    pub profit_margin: Option<f64>,
    /// operating_income / revenue
    pub operating_margin: Option<f64>,
    /// (revenue_t - revenue_{t-1}) / revenue_{t-1}; null on a ticker's first period
    pub revenue_growth: Option<f64>,
    /// (net_income_t - net_income_{t-1}) / net_income_{t-1}; null on first period
    pub net_income_growth: Option<f64>,
    /// revenue / total_assets
    pub asset_efficiency: Option<f64>,
    /// total_liabilities / total_assets
    pub debt_to_asset: Option<f64>,
}

/// The numeric, ML-ready feature table. One row per input record,
/// ordered ticker-then-date ascending.
pub type StandardTable = Vec<StandardRow>;

// =============================================================================
// Growth Category
// =============================================================================

/// Revenue-growth bucket for the Category Table.
///
/// Buckets are assigned by an ordered threshold scale
/// (see [`crate::transform::classify`]); null growth maps to
/// [`GrowthCategory::Unclassified`], never to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthCategory {
    #[serde(rename = "High Growth")]
    HighGrowth,
    #[serde(rename = "Moderate Growth")]
    ModerateGrowth,
    Stable,
    /// Neutral bucket for records with no computable growth
    /// (first period of a ticker, or unavailable revenue).
    Unclassified,
}

impl GrowthCategory {
    /// Display label, as persisted in the `category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighGrowth => "High Growth",
            Self::ModerateGrowth => "Moderate Growth",
            Self::Stable => "Stable",
            Self::Unclassified => "Unclassified",
        }
    }

    /// Parse a persisted label back into a bucket.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "High Growth" => Some(Self::HighGrowth),
            "Moderate Growth" => Some(Self::ModerateGrowth),
            "Stable" => Some(Self::Stable),
            "Unclassified" => Some(Self::Unclassified),
            _ => None,
        }
    }
}

// =============================================================================
// Risk Level
// =============================================================================

/// Leverage-based risk bucket for the Category Table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// Bucket for records whose debt-to-asset ratio is unavailable.
    Unknown,
}

impl RiskLevel {
    /// Display label, as persisted in the `risk_level` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a persisted label back into a bucket.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

// =============================================================================
// Category Table
// =============================================================================

/// One row of the Category Table: qualitative classification consumed by
/// narrative-recommendation generation. Ticker-and-date aligned with the
/// corresponding [`StandardRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub ticker: String,
    pub date: String,
    /// Sector from the static ticker lookup; "Other" when unmapped.
    pub sector: String,
    pub category: GrowthCategory,
    pub risk_level: RiskLevel,
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
}

/// The qualitative classification table. One row per input record,
/// ordered ticker-then-date ascending.
pub type CategoryTable = Vec<CategoryRow>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_aliases() {
        // Alpha Vantage style field names must deserialize into the
        // unified shape.
        let record: RawRecord = serde_json::from_value(json!({
            "symbol": "AAPL",
            "fiscalDateEnding": "2023-09-30",
            "totalRevenue": 383285000000.0,
            "netIncome": 96995000000.0
        }))
        .unwrap();

        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.date, "2023-09-30");
        assert_eq!(record.revenue, Some(383285000000.0));
        assert_eq!(record.net_income, Some(96995000000.0));
        assert!(record.total_assets.is_none());
    }

    #[test]
    fn test_raw_record_canonical_names() {
        let record: RawRecord = serde_json::from_value(json!({
            "ticker": "MSFT",
            "date": "2023-06-30",
            "revenue": 211915000000.0,
            "total_liabilities": 205753000000.0
        }))
        .unwrap();

        assert_eq!(record.ticker, "MSFT");
        assert_eq!(record.total_liabilities, Some(205753000000.0));
    }

    #[test]
    fn test_growth_category_roundtrip() {
        for cat in [
            GrowthCategory::HighGrowth,
            GrowthCategory::ModerateGrowth,
            GrowthCategory::Stable,
            GrowthCategory::Unclassified,
        ] {
            assert_eq!(GrowthCategory::from_label(cat.as_str()), Some(cat));
        }
        assert_eq!(GrowthCategory::from_label("Hyper Growth"), None);
    }

    #[test]
    fn test_risk_level_roundtrip() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Unknown,
        ] {
            assert_eq!(RiskLevel::from_label(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_category_serialization_labels() {
        let row = CategoryRow {
            ticker: "AAPL".into(),
            date: "2023-09-30".into(),
            sector: "Technology".into(),
            category: GrowthCategory::HighGrowth,
            risk_level: RiskLevel::Medium,
            revenue: Some(1.0),
            operating_income: None,
            net_income: None,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["category"], "High Growth");
        assert_eq!(json["risk_level"], "Medium");
        assert_eq!(json["operating_income"], serde_json::Value::Null);
    }
}
