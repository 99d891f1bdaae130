//! Staged outputs for the Loader stage.
//!
//! The relational upload itself is an external collaborator; this module
//! stops at its interface: staged CSV/JSON files with well-defined column
//! sets, and the `CREATE TABLE IF NOT EXISTS` DDL for the persisted schema.
//!
//! Null discipline: unavailable values are written as empty CSV cells /
//! JSON `null`. The engine guarantees no non-finite number ever reaches a
//! row, so JSON-based transports that reject NaN/Infinity are always safe.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LoadResult;
use crate::models::{CategoryRow, StandardRow};

/// Staged file names, matching the original pipeline layout.
pub const STANDARD_TABLE_FILE: &str = "standard_table";
pub const CATEGORY_TABLE_FILE: &str = "category_table";

// =============================================================================
// DDL
// =============================================================================

/// DDL for the Standard Table (value columns plus DB-side id/created_at).
pub const STANDARD_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS standard_table (
    id BIGSERIAL PRIMARY KEY,
    date TEXT,
    ticker TEXT,
    revenue FLOAT,
    operating_income FLOAT,
    net_income FLOAT,
    operating_cashflow FLOAT,
    total_assets FLOAT,
    total_liabilities FLOAT,
    profit_margin FLOAT,
    operating_margin FLOAT,
    revenue_growth FLOAT,
    net_income_growth FLOAT,
    asset_efficiency FLOAT,
    debt_to_asset FLOAT,
    created_at TIMESTAMP DEFAULT NOW()
);";

/// DDL for the Category Table (value columns plus DB-side id/created_at).
pub const CATEGORY_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS category_table (
    id BIGSERIAL PRIMARY KEY,
    ticker TEXT,
    date TEXT,
    sector TEXT,
    category TEXT,
    risk_level TEXT,
    revenue FLOAT,
    operating_income FLOAT,
    net_income FLOAT,
    created_at TIMESTAMP DEFAULT NOW()
);";

/// Both DDL statements, ready to hand to a SQL runner.
pub fn schema_ddl() -> String {
    format!("{}\n\n{}", STANDARD_TABLE_DDL, CATEGORY_TABLE_DDL)
}

// =============================================================================
// Staged CSV
// =============================================================================

/// Paths of the staged table files written by [`write_staged`].
#[derive(Debug, Clone)]
pub struct StagedPaths {
    pub standard: PathBuf,
    pub category: PathBuf,
}

fn opt_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Write the Standard Table as a staged CSV file.
pub fn write_standard_csv(rows: &[StandardRow], path: &Path) -> LoadResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "ticker",
        "date",
        "revenue",
        "operating_income",
        "net_income",
        "operating_cashflow",
        "total_assets",
        "total_liabilities",
        "profit_margin",
        "operating_margin",
        "revenue_growth",
        "net_income_growth",
        "asset_efficiency",
        "debt_to_asset",
    ])?;

    for row in rows {
        writer.write_record([
            row.ticker.clone(),
            row.date.clone(),
            opt_cell(row.revenue),
            opt_cell(row.operating_income),
            opt_cell(row.net_income),
            opt_cell(row.operating_cashflow),
            opt_cell(row.total_assets),
            opt_cell(row.total_liabilities),
            opt_cell(row.profit_margin),
            opt_cell(row.operating_margin),
            opt_cell(row.revenue_growth),
            opt_cell(row.net_income_growth),
            opt_cell(row.asset_efficiency),
            opt_cell(row.debt_to_asset),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the Category Table as a staged CSV file.
pub fn write_category_csv(rows: &[CategoryRow], path: &Path) -> LoadResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "ticker",
        "date",
        "sector",
        "category",
        "risk_level",
        "revenue",
        "operating_income",
        "net_income",
    ])?;

    for row in rows {
        writer.write_record([
            row.ticker.clone(),
            row.date.clone(),
            row.sector.clone(),
            row.category.as_str().to_string(),
            row.risk_level.as_str().to_string(),
            opt_cell(row.revenue),
            opt_cell(row.operating_income),
            opt_cell(row.net_income),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

// =============================================================================
// Staged JSON
// =============================================================================

/// Write rows as a pretty JSON array; unavailable values become `null`.
pub fn write_json<T: Serialize>(rows: &[T], path: &Path) -> LoadResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json)?;
    Ok(())
}

/// Run metadata written alongside the staged tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub standard_rows: usize,
    pub category_rows: usize,
}

/// Write both tables into a staged directory, creating it if needed.
///
/// Emits `standard_table.{csv,json}`, `category_table.{csv,json}` and
/// `run_metadata.json`; returns the CSV paths (the Loader's insert
/// format). The metadata file is bookkeeping only; the tables themselves
/// stay deterministic.
pub fn write_staged(
    standard: &[StandardRow],
    category: &[CategoryRow],
    staged_dir: &Path,
) -> LoadResult<StagedPaths> {
    fs::create_dir_all(staged_dir)?;

    let standard_csv = staged_dir.join(format!("{}.csv", STANDARD_TABLE_FILE));
    let category_csv = staged_dir.join(format!("{}.csv", CATEGORY_TABLE_FILE));

    write_standard_csv(standard, &standard_csv)?;
    write_category_csv(category, &category_csv)?;
    write_json(standard, &staged_dir.join(format!("{}.json", STANDARD_TABLE_FILE)))?;
    write_json(category, &staged_dir.join(format!("{}.json", CATEGORY_TABLE_FILE)))?;

    let metadata = RunMetadata {
        generated_at: chrono::Utc::now(),
        standard_rows: standard.len(),
        category_rows: category.len(),
    };
    fs::write(
        staged_dir.join("run_metadata.json"),
        serde_json::to_string_pretty(&metadata)?,
    )?;

    Ok(StagedPaths {
        standard: standard_csv,
        category: category_csv,
    })
}
