//! Calendar-year aggregation.
//!
//! A year whose totals cross a threshold is treated as a nexus year from its
//! first day, regardless of when in the year the threshold was reached.

use chrono::{Datelike, NaiveDate};
use nexus_core::{
    BreachResult, BreachType, Error, LookbackRule, Result, RuleRecord, SalesRecord,
};
use std::collections::BTreeMap;

/// Sales totals for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnnualTotals {
    /// Calendar year.
    pub year: i32,
    /// Sum of nexus sales.
    pub nexus_sales: f64,
    /// Sum of marketplace sales.
    pub marketplace_sales: f64,
    /// Sum of transactions.
    pub transaction_count: u64,
}

impl AnnualTotals {
    /// Sales compared against the sales threshold.
    pub fn threshold_sales(&self, include_marketplace: bool) -> f64 {
        if include_marketplace {
            self.nexus_sales + self.marketplace_sales
        } else {
            self.nexus_sales
        }
    }

    /// January 1 of the year.
    pub fn year_start(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, 1, 1)
            .ok_or_else(|| Error::data(format!("year {} is out of range", self.year)))
    }
}

/// Accumulates sales records into per-year totals.
#[derive(Debug, Default)]
pub struct AnnualAggregator {
    years: BTreeMap<i32, AnnualTotals>,
}

impl AnnualAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record to its year.
    pub fn add(&mut self, record: &SalesRecord) {
        let year = record.date.year();
        let totals = self.years.entry(year).or_insert_with(|| AnnualTotals {
            year,
            ..Default::default()
        });
        totals.nexus_sales += record.nexus_sales;
        totals.marketplace_sales += record.marketplace_sales;
        totals.transaction_count += record.transaction_count;
    }

    /// Add multiple records.
    pub fn add_all(&mut self, records: &[SalesRecord]) {
        for record in records {
            self.add(record);
        }
    }

    /// Totals in ascending year order.
    pub fn totals(&self) -> impl Iterator<Item = &AnnualTotals> {
        self.years.values()
    }

    /// Number of years seen.
    pub fn year_count(&self) -> usize {
        self.years.len()
    }
}

/// Evaluate one state's records under calendar_prev_curr.
///
/// Years are scanned ascending; within a year sales is checked before
/// transactions, and the first hit wins.
pub fn evaluate_calendar(
    state: &str,
    records: &[SalesRecord],
    rule: &RuleRecord,
) -> Result<BreachResult> {
    let mut aggregator = AnnualAggregator::new();
    aggregator.add_all(records);

    let sales_threshold = rule.active_sales_threshold();
    let transaction_threshold = rule.active_transaction_threshold();

    for totals in aggregator.totals() {
        let sales = totals.threshold_sales(rule.marketplace_threshold_inclusion);
        if sales_threshold.is_some_and(|t| sales >= t) {
            return Ok(BreachResult::breach(
                state,
                LookbackRule::CalendarPrevCurr,
                BreachType::Sales,
                totals.year_start()?,
                sales,
            ));
        }

        if transaction_threshold.is_some_and(|t| totals.transaction_count >= t) {
            return Ok(BreachResult::breach(
                state,
                LookbackRule::CalendarPrevCurr,
                BreachType::Transactions,
                totals.year_start()?,
                totals.transaction_count as f64,
            ));
        }
    }

    Ok(BreachResult::no_nexus_under(state, LookbackRule::CalendarPrevCurr))
}
