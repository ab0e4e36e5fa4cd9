//! Batch evaluation across configured states.
//!
//! Rules are always passed in explicitly. Results are ordered with nexus
//! states first, then alphabetically by state code.

use crate::evaluator::evaluate;
use nexus_core::{BreachResult, Error, Result, RuleRecord, RuleSet, SalesRecord};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Evaluate every configured state.
///
/// States with no records get a `has_nexus == false` result that carries the
/// configured look-back rule without being evaluated.
pub fn evaluate_all(rules: &RuleSet, records: &[SalesRecord]) -> Result<Vec<BreachResult>> {
    let sorted = sorted_by_state(records);
    let groups = group_by_state(&sorted);

    let mut results = Vec::with_capacity(rules.len());
    for (state, rule) in rules {
        let result = match groups.get(state.as_str()) {
            Some(state_records) => evaluate(state, state_records, Some(rule))?,
            None => BreachResult::no_nexus_under(state.as_str(), rule.lookback_rule.clone()),
        };
        results.push(result);
    }

    sort_results(&mut results);
    log_summary(&results);
    Ok(results)
}

/// Evaluate only states that are both configured and present in the data.
pub fn evaluate_present(rules: &RuleSet, records: &[SalesRecord]) -> Result<Vec<BreachResult>> {
    let sorted = sorted_by_state(records);

    let mut results = Vec::new();
    for (state, state_records) in group_by_state(&sorted) {
        match rules.get(state) {
            Some(rule) => results.push(evaluate(state, state_records, Some(rule))?),
            None => tracing::debug!(state, "state in data but not configured; skipping"),
        }
    }

    sort_results(&mut results);
    log_summary(&results);
    Ok(results)
}

/// Order results: nexus first, then ascending state code.
pub fn sort_results(results: &mut [BreachResult]) {
    results.sort_by(report_order);
}

fn report_order(a: &BreachResult, b: &BreachResult) -> Ordering {
    b.has_nexus
        .cmp(&a.has_nexus)
        .then_with(|| a.state.cmp(&b.state))
}

fn sorted_by_state(records: &[SalesRecord]) -> Vec<SalesRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.state.cmp(&b.state).then(a.date.cmp(&b.date)));
    sorted
}

/// Split state-sorted records into per-state slices.
fn group_by_state(sorted: &[SalesRecord]) -> BTreeMap<&str, &[SalesRecord]> {
    sorted
        .chunk_by(|a, b| a.state == b.state)
        .map(|chunk| (chunk[0].state.as_str(), chunk))
        .collect()
}

fn log_summary(results: &[BreachResult]) {
    let with_nexus = results.iter().filter(|r| r.has_nexus).count();
    tracing::info!(states = results.len(), with_nexus, "nexus analysis complete");
}

/// Nexus calculator bound to one rule set.
pub struct NexusCalculator {
    rules: RuleSet,
}

impl NexusCalculator {
    /// Create a calculator for the given rules.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// The rules in use.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Strict rule lookup; an unconfigured state is an error.
    pub fn rule_for(&self, state: &str) -> Result<&RuleRecord> {
        self.rules
            .get(state)
            .ok_or_else(|| Error::unknown_state(state))
    }

    /// Evaluate one state from a mixed-state record set.
    pub fn analyze_state(&self, state: &str, records: &[SalesRecord]) -> Result<BreachResult> {
        let state_records: Vec<SalesRecord> =
            records.iter().filter(|r| r.state == state).cloned().collect();
        evaluate(state, &state_records, self.rules.get(state))
    }

    /// See [`evaluate_all`].
    pub fn analyze_all_states(&self, records: &[SalesRecord]) -> Result<Vec<BreachResult>> {
        evaluate_all(&self.rules, records)
    }

    /// See [`evaluate_present`].
    pub fn analyze_present_states(&self, records: &[SalesRecord]) -> Result<Vec<BreachResult>> {
        evaluate_present(&self.rules, records)
    }
}
