//! Trailing calendar-day window sums.
//!
//! The window ending at date D covers `[D - (days - 1), D]`, so gaps in the
//! data never stretch or shrink it.

use chrono::{Duration, NaiveDate};
use nexus_core::{BreachResult, BreachType, LookbackRule, RuleRecord, SalesRecord};
use std::collections::VecDeque;

/// Length of the rolling_12m window in days.
pub const ROLLING_12M_DAYS: i64 = 365;

/// Window totals as of one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingPoint {
    /// Last day of the window.
    pub date: NaiveDate,
    /// Threshold sales inside the window.
    pub sales: f64,
    /// Transactions inside the window.
    pub transactions: u64,
}

/// Rolling sums over a trailing calendar-day window.
///
/// Observations must be pushed in ascending date order.
pub struct RollingWindow {
    /// Window length in days.
    days: i64,
    /// Observations still inside the window.
    entries: VecDeque<(NaiveDate, f64, u64)>,
    /// Running sales sum.
    sales: f64,
    /// Running transaction sum.
    transactions: u64,
}

impl RollingWindow {
    /// Create a window spanning `days` calendar days.
    pub fn new(days: i64) -> Self {
        Self {
            days,
            entries: VecDeque::new(),
            sales: 0.0,
            transactions: 0,
        }
    }

    /// Add an observation and return the window totals ending at its date.
    pub fn push(&mut self, date: NaiveDate, sales: f64, transactions: u64) -> RollingPoint {
        let window_start = date - Duration::days(self.days - 1);

        while let Some(&(oldest, old_sales, old_transactions)) = self.entries.front() {
            if oldest >= window_start {
                break;
            }
            self.entries.pop_front();
            self.sales -= old_sales;
            self.transactions -= old_transactions;
        }

        // Re-anchor once the window empties so float residue cannot build up.
        if self.entries.is_empty() {
            self.sales = 0.0;
            self.transactions = 0;
        }

        self.entries.push_back((date, sales, transactions));
        self.sales += sales;
        self.transactions += transactions;

        RollingPoint {
            date,
            sales: self.sales,
            transactions: self.transactions,
        }
    }

    /// Number of observations inside the window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window holds no observations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sales = 0.0;
        self.transactions = 0;
    }
}

/// Window totals at every record date, ascending.
pub fn rolling_series(
    records: &[SalesRecord],
    include_marketplace: bool,
    days: i64,
) -> Vec<RollingPoint> {
    let mut sorted: Vec<&SalesRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut window = RollingWindow::new(days);
    sorted
        .into_iter()
        .map(|r| window.push(r.date, r.threshold_sales(include_marketplace), r.transaction_count))
        .collect()
}

/// Evaluate one state's records under rolling_12m.
pub fn evaluate_rolling(state: &str, records: &[SalesRecord], rule: &RuleRecord) -> BreachResult {
    let series = rolling_series(records, rule.marketplace_threshold_inclusion, ROLLING_12M_DAYS);

    if let Some(threshold) = rule.active_sales_threshold() {
        if let Some(point) = series.iter().find(|p| p.sales >= threshold) {
            return BreachResult::breach(
                state,
                LookbackRule::RollingTwelveMonth,
                BreachType::Sales,
                point.date,
                point.sales,
            );
        }
    }

    if let Some(threshold) = rule.active_transaction_threshold() {
        if let Some(point) = series.iter().find(|p| p.transactions >= threshold) {
            return BreachResult::breach(
                state,
                LookbackRule::RollingTwelveMonth,
                BreachType::Transactions,
                point.date,
                point.transactions as f64,
            );
        }
    }

    BreachResult::no_nexus_under(state, LookbackRule::RollingTwelveMonth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(offset)
    }

    fn record(offset: i64, nexus: f64, marketplace: f64, transactions: u64) -> SalesRecord {
        SalesRecord {
            date: day(offset),
            state: "CA".to_string(),
            gross_sales: nexus,
            nexus_sales: nexus,
            marketplace_sales: marketplace,
            transaction_count: transactions,
        }
    }

    fn rule(sales: Option<f64>, transactions: Option<u64>, include: bool) -> RuleRecord {
        RuleRecord {
            lookback_rule: LookbackRule::RollingTwelveMonth,
            sales_threshold: sales,
            transaction_threshold: transactions,
            marketplace_threshold_inclusion: include,
        }
    }

    #[test]
    fn test_window_is_inclusive_365_days() {
        let mut window = RollingWindow::new(365);
        window.push(day(0), 100.0, 1);

        // Day 364 still sees day 0.
        let p = window.push(day(364), 10.0, 1);
        assert_relative_eq!(p.sales, 110.0);
        assert_eq!(p.transactions, 2);

        // Day 365 no longer does.
        let p = window.push(day(365), 1.0, 1);
        assert_relative_eq!(p.sales, 11.0);
        assert_eq!(p.transactions, 2);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_sparse_dates_do_not_distort_window() {
        let mut window = RollingWindow::new(365);
        window.push(day(0), 5.0, 1);
        window.push(day(200), 5.0, 1);

        // A long gap evicts both.
        let p = window.push(day(800), 7.0, 1);
        assert_relative_eq!(p.sales, 7.0);
        assert_eq!(p.transactions, 1);
    }

    #[test]
    fn test_series_sorts_input() {
        let records = vec![record(2, 3.0, 0.0, 1), record(0, 1.0, 0.0, 1), record(1, 2.0, 0.0, 1)];
        let series = rolling_series(&records, false, 365);
        let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(0), day(1), day(2)]);
        assert_relative_eq!(series[2].sales, 6.0);
    }

    #[test]
    fn test_daily_sales_breach_closed_form() {
        // $1,500/day: cumulative sum first reaches $500,000 on day ceil(500000/1500) = 334.
        let records: Vec<SalesRecord> = (0..365).map(|i| record(i, 1500.0, 0.0, 1)).collect();
        let result = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, false));

        let expected_index = (500_000.0_f64 / 1500.0).ceil() as i64 - 1;
        assert!(result.has_nexus);
        assert_eq!(result.breach_type, Some(BreachType::Sales));
        assert_eq!(result.breach_date, Some(day(expected_index)));
        assert_eq!(expected_index, 333);
        assert_relative_eq!(result.breach_amount.unwrap(), 501_000.0);
    }

    #[test]
    fn test_breach_after_sales_stop() {
        // $2,500/day for 200 days reaches exactly $500,000 on day index 199.
        let records: Vec<SalesRecord> = (0..365)
            .map(|i| record(i, if i < 200 { 2500.0 } else { 0.0 }, 0.0, 1))
            .collect();
        let result = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, false));

        assert_eq!(result.breach_date, Some(day(199)));
        assert!(result.breach_amount.unwrap() >= 500_000.0);
    }

    #[test]
    fn test_transaction_breach() {
        let records: Vec<SalesRecord> = (0..150).map(|i| record(i, 100.0, 0.0, 1)).collect();
        let result = evaluate_rolling("NY", &records, &rule(Some(500_000.0), Some(100), true));

        assert!(result.has_nexus);
        assert_eq!(result.state, "NY");
        assert_eq!(result.breach_type, Some(BreachType::Transactions));
        assert_eq!(result.breach_date, Some(day(99)));
        assert_relative_eq!(result.breach_amount.unwrap(), 100.0);
    }

    #[test]
    fn test_sales_priority_even_when_transactions_breach_first() {
        // Transactions cross on day 9; sales only on day 49.
        let records: Vec<SalesRecord> = (0..60).map(|i| record(i, 1000.0, 0.0, 10)).collect();
        let result = evaluate_rolling("CA", &records, &rule(Some(50_000.0), Some(100), false));

        assert_eq!(result.breach_type, Some(BreachType::Sales));
        assert_eq!(result.breach_date, Some(day(49)));
    }

    #[test]
    fn test_marketplace_inclusion_toggle() {
        // $400,000 direct + $150,000 marketplace over 200 days.
        let records: Vec<SalesRecord> = (0..200).map(|i| record(i, 2000.0, 750.0, 1)).collect();

        let excluded = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, false));
        assert!(!excluded.has_nexus);
        assert_eq!(excluded.breach_date, None);

        // Combined $2,750/day reaches $500,000 on day ceil(500000/2750) = 182.
        let included = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, true));
        assert!(included.has_nexus);
        assert_eq!(included.breach_date, Some(day(181)));
        assert_relative_eq!(included.breach_amount.unwrap(), 500_500.0);
    }

    #[test]
    fn test_window_forgets_old_sales() {
        // $300,000 twice, 400 days apart: never $500,000 inside one window.
        let records = vec![record(0, 300_000.0, 0.0, 1), record(400, 300_000.0, 0.0, 1)];
        let result = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, false));
        assert!(!result.has_nexus);
        assert_eq!(result.lookback_rule, Some(LookbackRule::RollingTwelveMonth));

        // 364 days apart they share a window.
        let records = vec![record(0, 300_000.0, 0.0, 1), record(364, 300_000.0, 0.0, 1)];
        let result = evaluate_rolling("CA", &records, &rule(Some(500_000.0), None, false));
        assert_eq!(result.breach_date, Some(day(364)));
    }

    #[test]
    fn test_no_thresholds_never_breach() {
        let records: Vec<SalesRecord> = (0..10).map(|i| record(i, 1e9, 0.0, 1000)).collect();
        let result = evaluate_rolling("CA", &records, &rule(None, Some(0), true));
        assert!(!result.has_nexus);
    }
}
