//! Nexus breach detection for the nexus analyzer.
//!
//! This crate handles:
//! - Trailing 365-day window sums (rolling_12m)
//! - Calendar-year aggregation (calendar_prev_curr)
//! - Per-state breach evaluation with sales-before-transactions priority
//! - Batch evaluation across configured states with deterministic ordering

pub mod calendar;
pub mod evaluator;
pub mod orchestrator;
pub mod rolling;

pub use calendar::{AnnualAggregator, AnnualTotals};
pub use evaluator::evaluate;
pub use orchestrator::{evaluate_all, evaluate_present, sort_results, NexusCalculator};
pub use rolling::{RollingPoint, RollingWindow};
