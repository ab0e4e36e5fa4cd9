//! Data ingestion and normalization for the nexus analyzer.
//!
//! This crate handles:
//! - Reading raw sales rows (JSON)
//! - Cleaning: date parsing, numeric coercion, state normalization
//! - Duplicate (state, date) aggregation
//! - Data-quality reporting
//! - Synthetic sample data generation

pub mod cleaner;
pub mod quality;
pub mod sample;
pub mod source;

pub use cleaner::{CleanedData, CleaningStats, DataCleaner};
pub use quality::DataQualityReport;
pub use sample::{SampleConfig, SampleDataGenerator};
pub use source::{load_rows, parse_rows, write_rows, RawField, RawSalesRow};
