//! Per-state breach evaluation.

use crate::calendar::evaluate_calendar;
use crate::rolling::evaluate_rolling;
use nexus_core::{BreachResult, Error, LookbackRule, Result, RuleRecord, SalesRecord};

/// Determine whether and when `state` crossed a nexus threshold.
///
/// `records` must all belong to `state`; anything else is a caller bug and
/// returns [`Error::ContractViolation`]. Missing data, a missing rule and an
/// unimplemented look-back rule all yield `has_nexus == false`.
pub fn evaluate(
    state: &str,
    records: &[SalesRecord],
    rule: Option<&RuleRecord>,
) -> Result<BreachResult> {
    if let Some(foreign) = records.iter().find(|r| r.state != state) {
        return Err(Error::contract(format!(
            "record for {} on {} passed to evaluation of {}",
            foreign.state, foreign.date, state
        )));
    }

    if records.is_empty() {
        return Ok(BreachResult::no_nexus(state));
    }

    let Some(rule) = rule else {
        tracing::debug!(state, "no rule configured");
        return Ok(BreachResult::no_nexus(state));
    };

    let result = match &rule.lookback_rule {
        LookbackRule::RollingTwelveMonth => evaluate_rolling(state, records, rule),
        LookbackRule::CalendarPrevCurr => evaluate_calendar(state, records, rule)?,
        LookbackRule::Unimplemented(name) => {
            tracing::debug!(state, rule = %name, "lookback rule not yet supported");
            BreachResult::no_nexus_under(state, rule.lookback_rule.clone())
        }
    };

    tracing::debug!(
        state,
        records = records.len(),
        has_nexus = result.has_nexus,
        breach_date = ?result.breach_date,
        "evaluated state"
    );

    Ok(result)
}
