//! Reporting for the nexus analyzer.
//!
//! This crate provides:
//! - Per-state source data summaries
//! - Analysis report assembly (summary metrics, state details)
//! - JSON report export

pub mod export;
pub mod summary;

pub use export::{AnalysisReport, ReportMetrics, ReportRow};
pub use summary::{summarize_by_state, StateSalesSummary};
