//! Core data types for the nexus analyzer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Monetary amount in the reporting currency.
pub type Amount = f64;

/// Per-state rule records keyed by normalized state code.
pub type RuleSet = BTreeMap<String, RuleRecord>;

/// Normalize a jurisdiction code (trimmed, uppercase).
#[inline]
pub fn normalize_state(code: &str) -> String {
    code.trim().to_uppercase()
}

/// One cleaned day of sales for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the sales.
    pub date: NaiveDate,
    /// Normalized state code.
    pub state: String,
    /// Signed gross sales as reported (returns may make this negative).
    pub gross_sales: Amount,
    /// Sales counted toward thresholds (gross sales clipped at zero).
    pub nexus_sales: Amount,
    /// Marketplace-facilitated sales.
    pub marketplace_sales: Amount,
    /// Number of transactions.
    pub transaction_count: u64,
}

impl SalesRecord {
    /// Sales compared against the sales threshold.
    #[inline]
    pub fn threshold_sales(&self, include_marketplace: bool) -> Amount {
        if include_marketplace {
            self.nexus_sales + self.marketplace_sales
        } else {
            self.nexus_sales
        }
    }
}

/// Look-back policy deciding which window's totals are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LookbackRule {
    /// Trailing 365 calendar days ending at each sale date.
    RollingTwelveMonth,
    /// Any single calendar year (previous or current).
    CalendarPrevCurr,
    /// A recognized policy that is not computed yet.
    Unimplemented(String),
}

impl LookbackRule {
    pub const ROLLING_12M: &'static str = "rolling_12m";
    pub const CALENDAR_PREV_CURR: &'static str = "calendar_prev_curr";

    /// Every look-back name accepted by the configuration.
    pub const KNOWN: [&'static str; 4] = [
        Self::CALENDAR_PREV_CURR,
        Self::ROLLING_12M,
        "calendar_prev",
        "rolling_4q",
    ];

    /// Parse a look-back name. Unknown names map to `Unimplemented`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            Self::ROLLING_12M => LookbackRule::RollingTwelveMonth,
            Self::CALENDAR_PREV_CURR => LookbackRule::CalendarPrevCurr,
            other => LookbackRule::Unimplemented(other.to_string()),
        }
    }

    /// Configuration name of the rule.
    pub fn as_str(&self) -> &str {
        match self {
            LookbackRule::RollingTwelveMonth => Self::ROLLING_12M,
            LookbackRule::CalendarPrevCurr => Self::CALENDAR_PREV_CURR,
            LookbackRule::Unimplemented(name) => name,
        }
    }

    /// Whether the evaluator computes this rule.
    pub fn is_implemented(&self) -> bool {
        !matches!(self, LookbackRule::Unimplemented(_))
    }

    /// Whether the name is one the configuration accepts.
    pub fn is_recognized(&self) -> bool {
        Self::KNOWN.contains(&self.as_str())
    }
}

impl From<String> for LookbackRule {
    fn from(name: String) -> Self {
        LookbackRule::from_name(&name)
    }
}

impl From<LookbackRule> for String {
    fn from(rule: LookbackRule) -> Self {
        rule.as_str().to_string()
    }
}

impl fmt::Display for LookbackRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved threshold rule for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Look-back policy.
    pub lookback_rule: LookbackRule,
    /// Sales threshold (absent or zero: not evaluated).
    pub sales_threshold: Option<Amount>,
    /// Transaction count threshold (absent or zero: not evaluated).
    pub transaction_threshold: Option<u64>,
    /// Add marketplace sales to nexus sales before comparing.
    pub marketplace_threshold_inclusion: bool,
}

impl RuleRecord {
    /// Sales threshold if it participates in evaluation.
    pub fn active_sales_threshold(&self) -> Option<Amount> {
        self.sales_threshold.filter(|t| *t > 0.0)
    }

    /// Transaction threshold if it participates in evaluation.
    pub fn active_transaction_threshold(&self) -> Option<u64> {
        self.transaction_threshold.filter(|t| *t > 0)
    }
}

/// Metric that crossed its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachType {
    Sales,
    Transactions,
}

impl BreachType {
    pub fn as_str(self) -> &'static str {
        match self {
            BreachType::Sales => "sales",
            BreachType::Transactions => "transactions",
        }
    }
}

impl fmt::Display for BreachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachResult {
    /// State code.
    pub state: String,
    /// Whether a threshold was crossed.
    pub has_nexus: bool,
    /// First date the threshold was met.
    pub breach_date: Option<NaiveDate>,
    /// Metric that crossed.
    pub breach_type: Option<BreachType>,
    /// Observed metric value at the breach (not the threshold).
    pub breach_amount: Option<f64>,
    /// Policy used, or the unimplemented policy, or none when no rule applied.
    pub lookback_rule: Option<LookbackRule>,
}

impl BreachResult {
    /// No nexus and no rule recorded.
    pub fn no_nexus(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            has_nexus: false,
            breach_date: None,
            breach_type: None,
            breach_amount: None,
            lookback_rule: None,
        }
    }

    /// No nexus under the given rule.
    pub fn no_nexus_under(state: impl Into<String>, rule: LookbackRule) -> Self {
        Self {
            lookback_rule: Some(rule),
            ..Self::no_nexus(state)
        }
    }

    /// A breach of `breach_type` on `date` with the observed `amount`.
    pub fn breach(
        state: impl Into<String>,
        rule: LookbackRule,
        breach_type: BreachType,
        date: NaiveDate,
        amount: f64,
    ) -> Self {
        Self {
            state: state.into(),
            has_nexus: true,
            breach_date: Some(date),
            breach_type: Some(breach_type),
            breach_amount: Some(amount),
            lookback_rule: Some(rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nexus: f64, marketplace: f64) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            state: "CA".to_string(),
            gross_sales: nexus,
            nexus_sales: nexus,
            marketplace_sales: marketplace,
            transaction_count: 1,
        }
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state(" tx "), "TX");
        assert_eq!(normalize_state("Ca"), "CA");
    }

    #[test]
    fn test_threshold_sales_inclusion() {
        let r = record(100.0, 25.0);
        assert!((r.threshold_sales(true) - 125.0).abs() < 1e-10);
        assert!((r.threshold_sales(false) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_lookback_rule_names() {
        assert_eq!(LookbackRule::from_name("rolling_12m"), LookbackRule::RollingTwelveMonth);
        assert_eq!(LookbackRule::from_name("calendar_prev_curr"), LookbackRule::CalendarPrevCurr);

        let q = LookbackRule::from_name("rolling_4q");
        assert!(!q.is_implemented());
        assert!(q.is_recognized());
        assert_eq!(q.as_str(), "rolling_4q");

        assert!(!LookbackRule::from_name("weekly").is_recognized());
    }

    #[test]
    fn test_lookback_rule_serde() {
        let json = serde_json::to_string(&LookbackRule::CalendarPrevCurr).unwrap();
        assert_eq!(json, "\"calendar_prev_curr\"");

        let rule: LookbackRule = serde_json::from_str("\"calendar_prev\"").unwrap();
        assert_eq!(rule, LookbackRule::Unimplemented("calendar_prev".to_string()));
    }

    #[test]
    fn test_zero_thresholds_inactive() {
        let rule = RuleRecord {
            lookback_rule: LookbackRule::RollingTwelveMonth,
            sales_threshold: Some(0.0),
            transaction_threshold: Some(0),
            marketplace_threshold_inclusion: true,
        };
        assert!(rule.active_sales_threshold().is_none());
        assert!(rule.active_transaction_threshold().is_none());
    }

    #[test]
    fn test_breach_result_serializes_type() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let result = BreachResult::breach(
            "CA",
            LookbackRule::CalendarPrevCurr,
            BreachType::Transactions,
            date,
            200.0,
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["breach_type"], "transactions");
        assert_eq!(value["breach_date"], "2023-01-01");
        assert_eq!(value["lookback_rule"], "calendar_prev_curr");
    }
}
