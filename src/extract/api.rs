//! Alpha Vantage statement retrieval.
//!
//! Fetches INCOME_STATEMENT, BALANCE_SHEET and CASH_FLOW reports per symbol
//! and merges them into unified [`RawRecord`]s, one per fiscal period that
//! appears in all three statements.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fincast::extract::api::AlphaVantageClient;
//!
//! let client = AlphaVantageClient::from_env()?;
//! let records = client.fetch_symbols(&["AAPL", "MSFT"]).await?;
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::env;

use crate::api::logs::{log_info, log_warning};
use crate::error::{ApiFetchError, ApiFetchResult};
use crate::extract::parse_numeric;
use crate::models::RawRecord;

/// Default base URL for the Alpha Vantage query endpoint.
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Default symbols fetched when none are specified.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Alpha Vantage API client.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Statement payload shape: annual and quarterly report arrays.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "annualReports", default)]
    annual_reports: Vec<Value>,
    #[serde(rename = "quarterlyReports", default)]
    quarterly_reports: Vec<Value>,
    /// Present on throttle/error responses.
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

impl AlphaVantageClient {
    /// Create a client with an explicit API key and the default base URL.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from ALPHAVANTAGE_API_KEY (and optionally
    /// ALPHAVANTAGE_BASE_URL) environment variables.
    pub fn from_env() -> ApiFetchResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let api_key =
            env::var("ALPHAVANTAGE_API_KEY").map_err(|_| ApiFetchError::MissingApiKey)?;

        let mut client = Self::new(api_key);
        if let Ok(url) = env::var("ALPHAVANTAGE_BASE_URL") {
            client.base_url = url;
        }
        Ok(client)
    }

    /// Override the base URL (useful for tests against a local stub).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Fetch one statement function for a symbol, deduplicated by fiscal
    /// period (annual reports win over quarterly duplicates).
    async fn fetch_statement(
        &self,
        symbol: &str,
        function: &str,
    ) -> ApiFetchResult<Vec<Value>> {
        let url = format!(
            "{}?function={}&symbol={}&apikey={}",
            self.base_url, function, symbol, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiFetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiFetchError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiFetchError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let payload: StatementResponse =
            serde_json::from_str(&body).map_err(|e| ApiFetchError::InvalidResponse {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })?;

        if let Some(note) = payload.note {
            return Err(ApiFetchError::ApiError(note));
        }
        if let Some(msg) = payload.error_message {
            return Err(ApiFetchError::ApiError(msg));
        }

        let mut seen = BTreeSet::new();
        let mut unique = Vec::new();
        for report in payload
            .annual_reports
            .into_iter()
            .chain(payload.quarterly_reports)
        {
            if let Some(date) = report.get("fiscalDateEnding").and_then(|v| v.as_str()) {
                if seen.insert(date.to_string()) {
                    unique.push(report);
                }
            }
        }

        Ok(unique)
    }

    /// Fetch and merge the three statements for one symbol.
    ///
    /// Only fiscal periods present in all three statements are emitted,
    /// ordered by date ascending.
    pub async fn fetch_symbol(&self, symbol: &str) -> ApiFetchResult<Vec<RawRecord>> {
        let income = self.fetch_statement(symbol, "INCOME_STATEMENT").await?;
        let balance = self.fetch_statement(symbol, "BALANCE_SHEET").await?;
        let cashflow = self.fetch_statement(symbol, "CASH_FLOW").await?;

        let income_map = index_by_period(&income);
        let balance_map = index_by_period(&balance);
        let cashflow_map = index_by_period(&cashflow);

        let mut records = Vec::new();
        for (date, inc) in &income_map {
            let (Some(bal), Some(cf)) = (balance_map.get(date), cashflow_map.get(date)) else {
                continue;
            };

            records.push(RawRecord {
                ticker: symbol.to_string(),
                date: date.clone(),
                revenue: field(inc, "totalRevenue"),
                operating_income: field(inc, "operatingIncome"),
                net_income: field(inc, "netIncome"),
                total_assets: field(bal, "totalAssets"),
                total_liabilities: field(bal, "totalLiabilities"),
                operating_cashflow: field(cf, "operatingCashflow"),
            });
        }

        Ok(records)
    }

    /// Fetch records for a list of symbols.
    ///
    /// A symbol that fails is logged as a warning and skipped; the call
    /// fails only when every symbol failed.
    pub async fn fetch_symbols(&self, symbols: &[&str]) -> ApiFetchResult<Vec<RawRecord>> {
        let mut all = Vec::new();
        let mut last_error = None;

        for symbol in symbols {
            log_info(format!("Fetching financials for {}...", symbol));
            match self.fetch_symbol(symbol).await {
                Ok(records) => {
                    log_info(format!("{}: {} periods", symbol, records.len()));
                    all.extend(records);
                }
                Err(e) => {
                    log_warning(format!("Error fetching {}: {}", symbol, e));
                    last_error = Some(e);
                }
            }
        }

        if all.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| ApiFetchError::ApiError("No symbols requested".to_string())));
        }

        Ok(all)
    }
}

/// Index statement reports by fiscal period end date.
fn index_by_period(reports: &[Value]) -> BTreeMap<String, &Value> {
    reports
        .iter()
        .filter_map(|r| {
            r.get("fiscalDateEnding")
                .and_then(|v| v.as_str())
                .map(|d| (d.to_string(), r))
        })
        .collect()
}

/// Read a numeric field from a statement report.
///
/// Alpha Vantage serializes numbers as strings and missing values as the
/// literal "None"; both go through [`parse_numeric`].
fn field(report: &Value, name: &str) -> Option<f64> {
    match report.get(name) {
        Some(Value::String(s)) => parse_numeric(s),
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_parsing() {
        let report = json!({
            "totalRevenue": "383285000000",
            "netIncome": "None",
            "operatingIncome": 114301000000.0
        });

        assert_eq!(field(&report, "totalRevenue"), Some(383285000000.0));
        assert_eq!(field(&report, "netIncome"), None);
        assert_eq!(field(&report, "operatingIncome"), Some(114301000000.0));
        assert_eq!(field(&report, "missing"), None);
    }

    #[test]
    fn test_index_by_period() {
        let reports = vec![
            json!({"fiscalDateEnding": "2023-09-30", "totalRevenue": "1"}),
            json!({"fiscalDateEnding": "2022-09-30", "totalRevenue": "2"}),
            json!({"noDate": true}),
        ];

        let index = index_by_period(&reports);
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("2022-09-30"));
    }

    #[test]
    fn test_statement_dedup_shape() {
        // Annual and quarterly lists may repeat a fiscal period; the
        // deserialized shape keeps them separate for fetch_statement to
        // dedupe in order.
        let payload: StatementResponse = serde_json::from_value(json!({
            "annualReports": [{"fiscalDateEnding": "2023-09-30"}],
            "quarterlyReports": [{"fiscalDateEnding": "2023-09-30"}]
        }))
        .unwrap();

        assert_eq!(payload.annual_reports.len(), 1);
        assert_eq!(payload.quarterly_reports.len(), 1);
        assert!(payload.note.is_none());
    }
}
