//! Classification configuration: sector lookup and threshold scales.
//!
//! Thresholds are data, not code: each scale is an ordered list of
//! `(threshold, label)` pairs evaluated top-down, so buckets can be
//! re-tuned (or loaded from a JSON file) without touching transform logic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{GrowthCategory, RiskLevel};

// =============================================================================
// Threshold Scale
// =============================================================================

/// An ordered classification scale.
///
/// `classify` walks the pairs in order and returns the first label whose
/// threshold the value meets (`value >= threshold`); values below every
/// threshold get `floor`, and a null value gets `unclassified` — never an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdScale<L> {
    /// `(threshold, label)` pairs, highest threshold first.
    pub buckets: Vec<(f64, L)>,
    /// Label for values below every threshold.
    pub floor: L,
    /// Label for unavailable values.
    pub unclassified: L,
}

impl<L: Copy> ThresholdScale<L> {
    pub fn new(buckets: Vec<(f64, L)>, floor: L, unclassified: L) -> Self {
        Self {
            buckets,
            floor,
            unclassified,
        }
    }

    /// Bucket a nullable value.
    pub fn classify(&self, value: Option<f64>) -> L {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return self.unclassified;
        };
        for &(threshold, label) in &self.buckets {
            if v >= threshold {
                return label;
            }
        }
        self.floor
    }
}

// =============================================================================
// Sector Map
// =============================================================================

/// Static ticker-to-sector lookup.
///
/// Injectable so new tickers and sectors are configuration, not code.
/// Unmapped tickers resolve to the fallback sector ("Other") instead of
/// failing; the engine counts them in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorMap {
    entries: BTreeMap<String, String>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    "Other".to_string()
}

impl SectorMap {
    /// Empty map with the standard fallback.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: default_fallback(),
        }
    }

    /// Build from `(ticker, sector)` pairs.
    pub fn from_entries<I, S1, S2>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(t, s)| (t.into(), s.into()))
                .collect(),
            fallback: default_fallback(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, ticker: impl Into<String>, sector: impl Into<String>) {
        self.entries.insert(ticker.into(), sector.into());
    }

    /// Look up a ticker; `None` means unmapped.
    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.entries.get(ticker).map(String::as_str)
    }

    /// Resolve a ticker, falling back for unmapped ones.
    pub fn resolve(&self, ticker: &str) -> (&str, bool) {
        match self.get(ticker) {
            Some(sector) => (sector, true),
            None => (&self.fallback, false),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SectorMap {
    /// Sectors for the default retrieval symbols.
    fn default() -> Self {
        Self::from_entries([
            ("AAPL", "Technology"),
            ("MSFT", "Technology"),
            ("GOOGL", "Technology"),
            ("AMZN", "Consumer Discretionary"),
            ("TSLA", "Automotive"),
        ])
    }
}

// =============================================================================
// Transform Config
// =============================================================================

/// Complete classification configuration, injected into the engine at
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Ticker-to-sector lookup.
    pub sectors: SectorMap,
    /// Revenue-growth scale (fractions: 0.20 = +20% year over year).
    pub growth: ThresholdScale<GrowthCategory>,
    /// Debt-to-asset risk scale.
    pub risk: ThresholdScale<RiskLevel>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            sectors: SectorMap::default(),
            growth: ThresholdScale::new(
                vec![
                    (0.20, GrowthCategory::HighGrowth),
                    (0.05, GrowthCategory::ModerateGrowth),
                ],
                GrowthCategory::Stable,
                GrowthCategory::Unclassified,
            ),
            risk: ThresholdScale::new(
                vec![(0.70, RiskLevel::High), (0.40, RiskLevel::Medium)],
                RiskLevel::Low,
                RiskLevel::Unknown,
            ),
        }
    }
}

impl TransformConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_scale_defaults() {
        let scale = TransformConfig::default().growth;

        assert_eq!(scale.classify(Some(0.50)), GrowthCategory::HighGrowth);
        assert_eq!(scale.classify(Some(0.20)), GrowthCategory::HighGrowth);
        assert_eq!(scale.classify(Some(0.10)), GrowthCategory::ModerateGrowth);
        assert_eq!(scale.classify(Some(0.0)), GrowthCategory::Stable);
        assert_eq!(scale.classify(Some(-0.30)), GrowthCategory::Stable);
        assert_eq!(scale.classify(None), GrowthCategory::Unclassified);
    }

    #[test]
    fn test_risk_scale_defaults() {
        let scale = TransformConfig::default().risk;

        assert_eq!(scale.classify(Some(0.85)), RiskLevel::High);
        assert_eq!(scale.classify(Some(0.70)), RiskLevel::High);
        assert_eq!(scale.classify(Some(0.55)), RiskLevel::Medium);
        assert_eq!(scale.classify(Some(0.10)), RiskLevel::Low);
        assert_eq!(scale.classify(None), RiskLevel::Unknown);
    }

    #[test]
    fn test_non_finite_value_is_unclassified() {
        let scale = TransformConfig::default().growth;
        assert_eq!(scale.classify(Some(f64::NAN)), GrowthCategory::Unclassified);
        assert_eq!(
            scale.classify(Some(f64::INFINITY)),
            GrowthCategory::Unclassified
        );
    }

    #[test]
    fn test_sector_map_resolve() {
        let sectors = SectorMap::default();

        assert_eq!(sectors.resolve("AAPL"), ("Technology", true));
        assert_eq!(sectors.resolve("TSLA"), ("Automotive", true));
        assert_eq!(sectors.resolve("ZZZZ"), ("Other", false));
    }

    #[test]
    fn test_sector_map_insert() {
        let mut sectors = SectorMap::empty();
        assert!(sectors.is_empty());

        sectors.insert("NVDA", "Semiconductors");
        assert_eq!(sectors.get("NVDA"), Some("Semiconductors"));
        assert_eq!(sectors.len(), 1);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = TransformConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TransformConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.growth.buckets.len(), 2);
        assert_eq!(parsed.sectors.resolve("MSFT"), ("Technology", true));
        assert_eq!(parsed.risk.classify(Some(0.9)), RiskLevel::High);
    }
}
