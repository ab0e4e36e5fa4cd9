//! Analysis report assembly and JSON export.

use crate::summary::{round_cents, summarize_by_state, StateSalesSummary};
use chrono::NaiveDate;
use nexus_core::{BreachResult, Result, SalesRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One state's result as written to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub state: String,
    pub has_nexus: bool,
    /// `YYYY-MM-DD`.
    pub breach_date: Option<String>,
    pub breach_type: Option<String>,
    /// Rounded to cents.
    pub breach_amount: Option<f64>,
    pub lookback_rule: Option<String>,
}

impl From<&BreachResult> for ReportRow {
    fn from(result: &BreachResult) -> Self {
        Self {
            state: result.state.clone(),
            has_nexus: result.has_nexus,
            breach_date: result.breach_date.map(|d| d.format("%Y-%m-%d").to_string()),
            breach_type: result.breach_type.map(|t| t.as_str().to_string()),
            breach_amount: result.breach_amount.map(round_cents),
            lookback_rule: result.lookback_rule.as_ref().map(|r| r.as_str().to_string()),
        }
    }
}

/// Headline numbers of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub client: String,
    pub analysis_date: NaiveDate,
    pub states_analyzed: usize,
    pub states_with_nexus: usize,
    pub earliest_breach: Option<NaiveDate>,
}

/// Complete analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Summary metrics.
    pub summary: ReportMetrics,
    /// Per-state results in report order.
    pub state_details: Vec<ReportRow>,
    /// Per-state summary of the source data.
    pub source_data: Vec<StateSalesSummary>,
}

impl AnalysisReport {
    /// Assemble a report from ordered results and the cleaned records.
    pub fn new(
        client: impl Into<String>,
        analysis_date: NaiveDate,
        results: &[BreachResult],
        records: &[SalesRecord],
    ) -> Self {
        let earliest_breach = results
            .iter()
            .filter(|r| r.has_nexus)
            .filter_map(|r| r.breach_date)
            .min();

        Self {
            summary: ReportMetrics {
                client: client.into(),
                analysis_date,
                states_analyzed: results.len(),
                states_with_nexus: results.iter().filter(|r| r.has_nexus).count(),
                earliest_breach,
            },
            state_details: results.iter().map(ReportRow::from).collect(),
            source_data: summarize_by_state(records),
        }
    }

    /// Rows for states with nexus.
    pub fn nexus_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.state_details.iter().filter(|r| r.has_nexus)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), states = self.state_details.len(), "report written");
        Ok(())
    }
}
