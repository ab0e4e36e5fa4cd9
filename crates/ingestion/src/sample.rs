//! Synthetic e-commerce sales data for demos and tests.

use crate::source::RawSalesRow;
use chrono::{Datelike, NaiveDate};
use nexus_core::{normalize_state, Error, Result};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{LogNormal, Poisson};

/// States generated when none are requested.
pub const DEFAULT_STATES: [&str; 8] = ["CA", "TX", "NY", "FL", "IL", "PA", "OH", "WA"];

/// Probability that a state has any sales on a given day.
const ACTIVE_DAY_PROB: f64 = 0.7;
const RETURN_PROB: f64 = 0.1;
const MARKETPLACE_PROB: f64 = 0.3;
const MARKETPLACE_SHARE: f64 = 0.3;

/// Injected sale that crosses every common threshold.
const FORCED_BREACH_SALES: f64 = 600_000.0;
const FORCED_BREACH_TRANSACTIONS: f64 = 250.0;

/// Sample generation parameters.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// First generated date.
    pub start: NaiveDate,
    /// Last generated date (inclusive).
    pub end: NaiveDate,
    /// State codes to generate.
    pub states: Vec<String>,
    /// RNG seed.
    pub seed: u64,
    /// Add one oversized sale per state.
    pub force_breach: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            states: DEFAULT_STATES.iter().map(|s| s.to_string()).collect(),
            seed: 42,
            force_breach: false,
        }
    }
}

/// Seeded generator of realistic daily sales rows.
pub struct SampleDataGenerator {
    config: SampleConfig,
    rng: StdRng,
    basket: LogNormal,
}

impl SampleDataGenerator {
    /// Create a generator.
    pub fn new(config: SampleConfig) -> Result<Self> {
        if config.start > config.end {
            return Err(Error::config(format!(
                "start date {} is after end date {}",
                config.start, config.end
            )));
        }
        if config.states.is_empty() {
            return Err(Error::config("no states requested"));
        }

        let basket = LogNormal::new(3.5, 1.2).map_err(|e| Error::config(e.to_string()))?;
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self { config, rng, basket })
    }

    /// Generate rows ordered by date, then by the requested state order.
    pub fn generate(&mut self) -> Result<Vec<RawSalesRow>> {
        let states: Vec<String> = self.config.states.iter().map(|s| normalize_state(s)).collect();
        let volumes = states
            .iter()
            .map(|s| Poisson::new(5.0 * state_factor(s)).map_err(|e| Error::config(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::new();
        let end = self.config.end;

        for date in self.config.start.iter_days().take_while(|d| *d <= end) {
            let seasonal = seasonal_factor(date.month());

            for (state, volume) in states.iter().zip(&volumes) {
                if self.rng.gen::<f64>() > ACTIVE_DAY_PROB {
                    continue;
                }

                let transactions: f64 = Distribution::<f64>::sample(volume, &mut self.rng);
                let baskets: f64 = (0..transactions as u64)
                    .map(|_| self.basket.sample(&mut self.rng))
                    .sum();
                let mut gross_sales = baskets * seasonal * state_factor(state);

                if self.rng.gen::<f64>() < RETURN_PROB {
                    gross_sales -= self.rng.gen_range(50.0..200.0);
                }

                let marketplace_sales = if self.rng.gen::<f64>() < MARKETPLACE_PROB {
                    gross_sales * MARKETPLACE_SHARE
                } else {
                    0.0
                };

                rows.push(RawSalesRow {
                    date: Some(date.format("%Y-%m-%d").to_string().into()),
                    state: Some(state.as_str().into()),
                    gross_sales: Some(round_cents(gross_sales).into()),
                    transaction_count: Some(transactions.into()),
                    marketplace_sales: Some(round_cents(marketplace_sales).into()),
                });
            }
        }

        if self.config.force_breach {
            let date = self.config.start.format("%Y-%m-%d").to_string();
            for state in &states {
                rows.push(RawSalesRow {
                    date: Some(date.clone().into()),
                    state: Some(state.as_str().into()),
                    gross_sales: Some(FORCED_BREACH_SALES.into()),
                    transaction_count: Some(FORCED_BREACH_TRANSACTIONS.into()),
                    marketplace_sales: Some(0.0.into()),
                });
            }
        }

        tracing::info!(rows = rows.len(), states = states.len(), "generated sample data");
        Ok(rows)
    }
}

/// Relative sales volume per state.
fn state_factor(state: &str) -> f64 {
    match state {
        "CA" => 2.0,
        "TX" => 1.8,
        "NY" => 1.5,
        "FL" => 1.2,
        "IL" => 1.0,
        "PA" => 0.9,
        "OH" => 0.8,
        "WA" => 1.1,
        _ => 1.0,
    }
}

/// Holiday and summer uplift.
fn seasonal_factor(month: u32) -> f64 {
    match month {
        11 | 12 => 1.5,
        6..=8 => 1.2,
        _ => 1.0,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;

    fn small_config(seed: u64) -> SampleConfig {
        SampleConfig {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            states: vec!["ca".to_string(), "TX".to_string()],
            seed,
            force_breach: false,
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = SampleDataGenerator::new(small_config(7)).unwrap().generate().unwrap();
        let b = SampleDataGenerator::new(small_config(7)).unwrap().generate().unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_rows_clean_without_loss() {
        let rows = SampleDataGenerator::new(small_config(1)).unwrap().generate().unwrap();
        let count = rows.len();
        let cleaned = DataCleaner::clean(rows).unwrap();

        assert_eq!(cleaned.stats.invalid_date_rows, 0);
        assert_eq!(cleaned.records.len(), count);
        assert_eq!(cleaned.states(), vec!["CA".to_string(), "TX".to_string()]);
    }

    #[test]
    fn test_force_breach_injects_large_sale() {
        let mut config = small_config(3);
        config.force_breach = true;
        let rows = SampleDataGenerator::new(config).unwrap().generate().unwrap();
        let cleaned = DataCleaner::clean(rows).unwrap();

        for state in ["CA", "TX"] {
            let first = &cleaned.records_for(state)[0];
            assert!(first.nexus_sales >= FORCED_BREACH_SALES);
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = small_config(3);
        config.end = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(SampleDataGenerator::new(config).is_err());
    }

    #[test]
    fn test_seasonal_factor() {
        assert_eq!(seasonal_factor(12), 1.5);
        assert_eq!(seasonal_factor(7), 1.2);
        assert_eq!(seasonal_factor(3), 1.0);
    }
}
