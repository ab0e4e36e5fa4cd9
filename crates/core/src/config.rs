//! State rule configuration for the nexus analyzer.
//!
//! States are loaded from a YAML mapping of state code to [`StateConfig`].
//! A `DEFAULT` entry is allowed in the file and ignored.

use crate::error::{Error, Result};
use crate::types::{normalize_state, LookbackRule, RuleRecord, RuleSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Key of the template entry skipped on load.
const DEFAULT_KEY: &str = "DEFAULT";

/// Highest plausible state tax rate.
const MAX_TAX_RATE: f64 = 0.15;

/// Sales thresholds seen in practice; anything else is logged.
const COMMON_SALES_THRESHOLDS: [f64; 4] = [100_000.0, 200_000.0, 250_000.0, 500_000.0];

/// Full configuration: every configured state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NexusConfig {
    /// State configurations keyed by normalized state code.
    pub states: BTreeMap<String, StateConfig>,
}

/// Configuration for a single state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Economic nexus sales threshold.
    pub sales_threshold: Option<f64>,
    /// Economic nexus transaction count threshold.
    pub transaction_threshold: Option<u64>,
    /// Look-back rule name (e.g. "rolling_12m").
    pub lookback_rule: String,
    /// Free-form parameters for the look-back rule.
    #[serde(default)]
    pub lookback_details: BTreeMap<String, serde_yaml::Value>,
    /// Whether marketplace-facilitated sales count toward the threshold.
    #[serde(default = "default_true")]
    pub marketplace_threshold_inclusion: bool,
    /// Combined state sales tax rate.
    pub tax_rate: f64,
    /// Voluntary disclosure look-back cap in years.
    #[serde(default)]
    pub vda_lookback_cap: Option<u32>,
    /// Whether penalties are waived under voluntary disclosure.
    #[serde(default)]
    pub vda_penalty_waived: Option<bool>,
    /// Interest treatment under voluntary disclosure.
    #[serde(default)]
    pub vda_interest_rule: Option<String>,
    /// Standard penalty rate for late collection.
    #[serde(default = "default_penalty_rate")]
    pub standard_penalty_rate: f64,
    /// Annual interest rate on unpaid tax.
    #[serde(default)]
    pub interest_rate: Option<f64>,
    /// Date the current thresholds took effect.
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    /// Analyst notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// State-specific quirks.
    #[serde(default)]
    pub quirk_flags: BTreeMap<String, serde_yaml::Value>,
}

fn default_true() -> bool {
    true
}

fn default_penalty_rate() -> f64 {
    0.10
}

impl StateConfig {
    /// Resolve into the rule record consumed by the calculator.
    pub fn rule_record(&self) -> RuleRecord {
        RuleRecord {
            lookback_rule: LookbackRule::from_name(&self.lookback_rule),
            sales_threshold: self.sales_threshold,
            transaction_threshold: self.transaction_threshold,
            marketplace_threshold_inclusion: self.marketplace_threshold_inclusion,
        }
    }

    /// Validate a single state's values.
    pub fn validate(&self, state: &str) -> Result<()> {
        if !(0.0..=MAX_TAX_RATE).contains(&self.tax_rate) {
            return Err(Error::config(format!(
                "{state}: tax rate {} seems incorrect",
                self.tax_rate
            )));
        }

        if let Some(threshold) = self.sales_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::config(format!(
                    "{state}: sales threshold {threshold} must be a non-negative amount"
                )));
            }
            if threshold > 0.0 && !COMMON_SALES_THRESHOLDS.contains(&threshold) {
                tracing::warn!(state, threshold, "unusual sales threshold");
            }
        }

        if !LookbackRule::from_name(&self.lookback_rule).is_recognized() {
            return Err(Error::config(format!(
                "{state}: unknown lookback_rule '{}' (expected one of {})",
                self.lookback_rule,
                LookbackRule::KNOWN.join(", ")
            )));
        }

        Ok(())
    }
}

/// Counts reported by the `states` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSummary {
    pub total_states: usize,
    pub states_with_sales_threshold: usize,
    pub states_with_transaction_threshold: usize,
}

impl NexusConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), states = config.states.len(), "loaded state config");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(text)?;
        if raw.is_empty() {
            return Err(Error::config("configuration contains no states"));
        }

        let mut states = BTreeMap::new();
        for (key, value) in raw {
            if key == DEFAULT_KEY {
                continue;
            }
            let state = normalize_state(&key);
            let cfg: StateConfig = serde_yaml::from_value(value)
                .map_err(|e| Error::config(format!("{state}: {e}")))?;
            cfg.validate(&state)?;
            if states.insert(state.clone(), cfg).is_some() {
                return Err(Error::config(format!("{state} is configured twice")));
            }
        }

        Ok(Self { states })
    }

    /// Resolve every state into calculator rule records.
    pub fn rule_set(&self) -> RuleSet {
        self.states
            .iter()
            .map(|(state, cfg)| (state.clone(), cfg.rule_record()))
            .collect()
    }

    /// Look up a state, normalizing the code.
    pub fn state(&self, code: &str) -> Result<&StateConfig> {
        let state = normalize_state(code);
        self.states
            .get(&state)
            .ok_or_else(|| Error::unknown_state(state))
    }

    /// Threshold coverage counts.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            total_states: self.states.len(),
            states_with_sales_threshold: self
                .states
                .values()
                .filter(|c| c.sales_threshold.is_some_and(|t| t > 0.0))
                .count(),
            states_with_transaction_threshold: self
                .states
                .values()
                .filter(|c| c.transaction_threshold.is_some_and(|t| t > 0))
                .count(),
        }
    }
}
