//! Sales data cleaning.
//!
//! Turns loosely typed export rows into one [`SalesRecord`] per (state, date).

use crate::source::{RawField, RawSalesRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nexus_core::{normalize_state, Result, SalesRecord};
use std::collections::BTreeMap;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Statistics about a cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    /// Rows received.
    pub input_rows: usize,
    /// Rows dropped because the date could not be parsed.
    pub invalid_date_rows: usize,
    /// Rows dropped because the state code was empty.
    pub missing_state_rows: usize,
    /// Rows folded into an earlier row with the same state and date.
    pub duplicate_rows_merged: usize,
    /// Rows whose gross sales were negative before clipping.
    pub negative_sales_rows: usize,
}

impl CleaningStats {
    /// Rows that survived parsing (before duplicate aggregation).
    pub fn kept_rows(&self) -> usize {
        self.input_rows - self.invalid_date_rows - self.missing_state_rows
    }
}

/// Output of [`DataCleaner::clean`].
#[derive(Debug, Clone, Default)]
pub struct CleanedData {
    /// Records sorted by (state, date), unique per pair.
    pub records: Vec<SalesRecord>,
    /// What happened along the way.
    pub stats: CleaningStats,
}

impl CleanedData {
    /// Distinct states, ascending.
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self.records.iter().map(|r| r.state.clone()).collect();
        states.dedup();
        states
    }

    /// Records of one state (contiguous because of the sort order).
    pub fn records_for(&self, state: &str) -> &[SalesRecord] {
        let start = self.records.partition_point(|r| r.state.as_str() < state);
        let end = self.records.partition_point(|r| r.state.as_str() <= state);
        &self.records[start..end]
    }
}

/// Running totals for one (state, date) key.
#[derive(Debug, Clone, Default)]
struct DayTotals {
    gross_sales: f64,
    nexus_sales: f64,
    marketplace_sales: f64,
    transaction_count: u64,
    rows: usize,
}

/// Cleans raw sales rows.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean raw rows into sorted, deduplicated sales records.
    pub fn clean(rows: Vec<RawSalesRow>) -> Result<CleanedData> {
        let mut stats = CleaningStats {
            input_rows: rows.len(),
            ..Default::default()
        };
        let mut days: BTreeMap<(String, NaiveDate), DayTotals> = BTreeMap::new();

        for row in rows {
            let Some(date) = row.date.as_ref().and_then(parse_date) else {
                stats.invalid_date_rows += 1;
                continue;
            };

            let state = row
                .state
                .as_ref()
                .map(|s| normalize_state(&s.as_text()))
                .unwrap_or_default();
            if state.is_empty() {
                stats.missing_state_rows += 1;
                continue;
            }

            let gross_sales = coerce_amount(row.gross_sales.as_ref());
            if gross_sales < 0.0 {
                stats.negative_sales_rows += 1;
            }
            let marketplace_sales = coerce_amount(row.marketplace_sales.as_ref()).max(0.0);
            let transaction_count = coerce_count(row.transaction_count.as_ref());

            let day = days.entry((state, date)).or_default();
            day.gross_sales += gross_sales;
            day.nexus_sales += gross_sales.max(0.0);
            day.marketplace_sales += marketplace_sales;
            day.transaction_count += transaction_count;
            day.rows += 1;
        }

        if stats.invalid_date_rows > 0 {
            tracing::warn!(rows = stats.invalid_date_rows, "dropping rows with invalid dates");
        }
        if stats.missing_state_rows > 0 {
            tracing::warn!(rows = stats.missing_state_rows, "dropping rows without a state code");
        }

        stats.duplicate_rows_merged = days.values().map(|d| d.rows - 1).sum();
        if stats.duplicate_rows_merged > 0 {
            tracing::warn!(
                rows = stats.duplicate_rows_merged,
                "found duplicate state/date entries; aggregating"
            );
        }

        let records: Vec<SalesRecord> = days
            .into_iter()
            .map(|((state, date), day)| SalesRecord {
                date,
                state,
                gross_sales: day.gross_sales,
                nexus_sales: day.nexus_sales,
                marketplace_sales: day.marketplace_sales,
                transaction_count: day.transaction_count,
            })
            .collect();

        tracing::debug!(
            input = stats.input_rows,
            output = records.len(),
            "cleaned sales data"
        );

        Ok(CleanedData { records, stats })
    }
}

/// Parse a date cell, dropping any time component.
fn parse_date(field: &RawField) -> Option<NaiveDate> {
    let RawField::Text(text) = field else {
        return None;
    };
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Non-numeric or missing amounts count as zero.
fn coerce_amount(field: Option<&RawField>) -> f64 {
    field.and_then(RawField::as_number).unwrap_or(0.0)
}

/// Counts are rounded half-to-even and clipped at zero.
fn coerce_count(field: Option<&RawField>) -> u64 {
    let value = coerce_amount(field).round_ties_even();
    if value > 0.0 {
        value as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(
        date: &str,
        state: &str,
        gross: RawField,
        count: Option<RawField>,
        marketplace: Option<RawField>,
    ) -> RawSalesRow {
        RawSalesRow {
            date: Some(date.into()),
            state: Some(state.into()),
            gross_sales: Some(gross),
            transaction_count: count,
            marketplace_sales: marketplace,
        }
    }

    #[test]
    fn test_dirty_data() {
        let rows = vec![
            row("2023-01-01", "ca", 1000.0.into(), Some(1.0.into()), Some(100.0.into())),
            row("2023-01-01", "CA", "2000".into(), Some(2.5.into()), None),
            row("invalid_date", " TX ", "not_a_number".into(), None, Some(200.0.into())),
            row("2023-01-03", "ny", (-500.0).into(), Some(3.0.into()), Some(300.0.into())),
        ];

        let cleaned = DataCleaner::clean(rows).unwrap();

        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.states(), vec!["CA".to_string(), "NY".to_string()]);
        assert_eq!(cleaned.stats.invalid_date_rows, 1);
        assert_eq!(cleaned.stats.duplicate_rows_merged, 1);
        assert_eq!(cleaned.stats.negative_sales_rows, 1);

        let ca = &cleaned.records_for("CA")[0];
        assert_relative_eq!(ca.gross_sales, 3000.0);
        assert_relative_eq!(ca.nexus_sales, 3000.0);
        assert_relative_eq!(ca.marketplace_sales, 100.0);
        // 1 + round_half_even(2.5) = 1 + 2
        assert_eq!(ca.transaction_count, 3);

        let ny = &cleaned.records_for("NY")[0];
        assert_relative_eq!(ny.gross_sales, -500.0);
        assert_relative_eq!(ny.nexus_sales, 0.0);
        assert_eq!(ny.transaction_count, 3);
    }

    #[test]
    fn test_duplicates_keep_distinct_dates() {
        let rows = vec![
            row("2023-01-01", "CA", 1000.0.into(), Some(1.0.into()), None),
            row("2023-01-01", "CA", 2000.0.into(), Some(2.0.into()), None),
            row("2023-01-02", "CA", 3000.0.into(), Some(3.0.into()), None),
        ];

        let cleaned = DataCleaner::clean(rows).unwrap();
        let ca = cleaned.records_for("CA");

        assert_eq!(ca.len(), 2);
        assert_eq!(ca[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_relative_eq!(ca[0].gross_sales, 3000.0);
        assert_eq!(ca[0].transaction_count, 3);
        assert_relative_eq!(ca[0].marketplace_sales, 0.0);
        assert_relative_eq!(ca[1].gross_sales, 3000.0);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4);
        assert_eq!(parse_date(&"2023-07-04".into()), expected);
        assert_eq!(parse_date(&"2023/07/04".into()), expected);
        assert_eq!(parse_date(&"07/04/2023".into()), expected);
        assert_eq!(parse_date(&"2023-07-04 13:45:00".into()), expected);
        assert_eq!(parse_date(&"2023-07-04T13:45:00Z".into()), expected);
        assert_eq!(parse_date(&"2023-02-30".into()), None);
        assert_eq!(parse_date(&RawField::Number(20230704.0)), None);
    }

    #[test]
    fn test_missing_state_dropped() {
        let rows = vec![
            row("2023-01-01", "  ", 10.0.into(), None, None),
            row("2023-01-01", "WA", 10.0.into(), None, None),
        ];
        let cleaned = DataCleaner::clean(rows).unwrap();
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.stats.missing_state_rows, 1);
        assert_eq!(cleaned.stats.kept_rows(), 1);
    }

    #[test]
    fn test_negative_counts_and_marketplace_clipped() {
        let rows = vec![row("2023-01-01", "OH", 10.0.into(), Some((-4.0).into()), Some((-9.0).into()))];
        let cleaned = DataCleaner::clean(rows).unwrap();
        assert_eq!(cleaned.records[0].transaction_count, 0);
        assert_relative_eq!(cleaned.records[0].marketplace_sales, 0.0);
    }

    #[test]
    fn test_records_for_absent_state() {
        let rows = vec![row("2023-01-01", "CA", 10.0.into(), None, None)];
        let cleaned = DataCleaner::clean(rows).unwrap();
        assert!(cleaned.records_for("TX").is_empty());
    }
}
