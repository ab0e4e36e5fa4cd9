//! Lightweight data-quality scoring of cleaned sales data.

use crate::cleaner::CleanedData;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Share of negative-sales rows above which the score is penalized.
const NEGATIVE_ROWS_TOLERANCE: f64 = 0.10;

/// Data-quality summary shown before analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// Cleaned records.
    pub total_rows: usize,
    /// Earliest and latest dates.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Distinct states, ascending.
    pub states_found: Vec<String>,
    /// Records whose gross sales are negative.
    pub negative_sales_rows: usize,
    /// Rows dropped for unparseable dates.
    pub invalid_date_rows: usize,
    /// Score out of 100.
    pub data_quality_score: f64,
}

impl DataQualityReport {
    /// Score cleaned data.
    pub fn from_cleaned(data: &CleanedData) -> Self {
        let total_rows = data.records.len();
        let date_range = data
            .records
            .iter()
            .map(|r| r.date)
            .min()
            .zip(data.records.iter().map(|r| r.date).max());
        let negative_sales_rows = data.records.iter().filter(|r| r.gross_sales < 0.0).count();
        let invalid_date_rows = data.stats.invalid_date_rows;

        let mut score = 100.0;
        if invalid_date_rows > 0 {
            score -= 20.0;
        }
        if negative_sales_rows as f64 > total_rows as f64 * NEGATIVE_ROWS_TOLERANCE {
            score -= 10.0;
        }

        Self {
            total_rows,
            date_range,
            states_found: data.states(),
            negative_sales_rows,
            invalid_date_rows,
            data_quality_score: score,
        }
    }
}
