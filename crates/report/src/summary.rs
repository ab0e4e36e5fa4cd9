//! Per-state source data summaries.

use chrono::NaiveDate;
use nexus_core::SalesRecord;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate sales metrics for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSalesSummary {
    /// State code.
    pub state: String,
    /// Number of sales days.
    pub days: usize,
    /// Sum of signed gross sales.
    pub gross_sales: f64,
    /// Smallest daily gross sales.
    pub min_daily_sales: f64,
    /// Largest daily gross sales.
    pub max_daily_sales: f64,
    /// Sum of nexus sales.
    pub nexus_sales: f64,
    /// Sum of transactions.
    pub transaction_count: u64,
    /// Sum of marketplace sales.
    pub marketplace_sales: f64,
    /// First sales date.
    pub first_date: NaiveDate,
    /// Last sales date.
    pub last_date: NaiveDate,
}

/// Summarize records per state, ascending by state code.
pub fn summarize_by_state(records: &[SalesRecord]) -> Vec<StateSalesSummary> {
    let mut by_state: BTreeMap<&str, Vec<&SalesRecord>> = BTreeMap::new();
    for record in records {
        by_state.entry(record.state.as_str()).or_default().push(record);
    }

    by_state
        .into_iter()
        .filter_map(|(state, rows)| summarize(state, &rows))
        .collect()
}

fn summarize(state: &str, rows: &[&SalesRecord]) -> Option<StateSalesSummary> {
    let first_date = rows.iter().map(|r| r.date).min()?;
    let last_date = rows.iter().map(|r| r.date).max()?;
    let min_daily_sales = rows.iter().map(|r| OrderedFloat(r.gross_sales)).min()?.0;
    let max_daily_sales = rows.iter().map(|r| OrderedFloat(r.gross_sales)).max()?.0;

    Some(StateSalesSummary {
        state: state.to_string(),
        days: rows.len(),
        gross_sales: round_cents(rows.iter().map(|r| r.gross_sales).sum()),
        min_daily_sales: round_cents(min_daily_sales),
        max_daily_sales: round_cents(max_daily_sales),
        nexus_sales: round_cents(rows.iter().map(|r| r.nexus_sales).sum()),
        transaction_count: rows.iter().map(|r| r.transaction_count).sum(),
        marketplace_sales: round_cents(rows.iter().map(|r| r.marketplace_sales).sum()),
        first_date,
        last_date,
    })
}

/// Round to two decimal places.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
