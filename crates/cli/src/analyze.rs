//! `nexus analyze`: clean sales data, evaluate nexus, write the report.

use crate::format::{currency_or_dash, group_thousands};
use crate::DEFAULT_CONFIG_PATH;
use anyhow::Context;
use chrono::Local;
use clap::Args;
use nexus_calculator::{evaluate_all, evaluate_present};
use nexus_core::{BreachResult, BreachType, NexusConfig};
use nexus_ingestion::{load_rows, DataCleaner, DataQualityReport};
use nexus_report::AnalysisReport;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for `nexus analyze`.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Sales data file (JSON array of rows).
    pub input: PathBuf,
    /// Report output path.
    #[arg(short, long, default_value = "nexus_analysis.json")]
    pub output: PathBuf,
    /// State config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Client name for the report.
    #[arg(long, default_value = "Client")]
    pub client: String,
    /// Analyze every configured state, including states absent from the data.
    #[arg(long)]
    pub force_all: bool,
}

/// Run the analysis.
pub fn run(args: &AnalyzeArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    tracing::debug!(input = %args.input.display(), force_all = args.force_all, "starting analysis");
    let config = NexusConfig::from_yaml(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    writeln!(out, "✓ Loaded config for {} states", config.states.len())?;

    let rows = load_rows(&args.input)
        .with_context(|| format!("loading sales data {}", args.input.display()))?;
    writeln!(out, "✓ Loaded {} rows", rows.len())?;

    let cleaned = DataCleaner::clean(rows).context("cleaning sales data")?;
    let quality = DataQualityReport::from_cleaned(&cleaned);
    writeln!(out, "✓ Data quality score: {:.0}%", quality.data_quality_score)?;

    let rules = config.rule_set();
    let results = if args.force_all {
        evaluate_all(&rules, &cleaned.records)?
    } else {
        evaluate_present(&rules, &cleaned.records)?
    };
    writeln!(out, "✓ Analyzed {} states", results.len())?;

    write_nexus_summary(&results, out)?;

    let report = AnalysisReport::new(
        args.client.clone(),
        Local::now().date_naive(),
        &results,
        &cleaned.records,
    );
    report
        .write_json(&args.output)
        .with_context(|| format!("writing report {}", args.output.display()))?;
    writeln!(out, "\n✓ Report saved to: {}", args.output.display())?;

    writeln!(out, "\nAnalysis complete!")?;
    Ok(())
}

/// List breached states, or say there are none.
pub fn write_nexus_summary(results: &[BreachResult], out: &mut dyn Write) -> anyhow::Result<()> {
    let nexus: Vec<&BreachResult> = results.iter().filter(|r| r.has_nexus).collect();
    if nexus.is_empty() {
        writeln!(out, "\n✓ No nexus obligations detected")?;
        return Ok(());
    }

    writeln!(out, "\n⚠️  Nexus detected in {} state(s):", nexus.len())?;
    for result in nexus {
        let breach_type = result.breach_type.map(|t| t.as_str()).unwrap_or("—");
        let breach_date = result
            .breach_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());
        writeln!(
            out,
            "  • {}: {} threshold breached on {}",
            result.state, breach_type, breach_date
        )?;
    }
    Ok(())
}

/// Results table used by `nexus demo`.
pub fn write_results_table(results: &[BreachResult], out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "{:<6} {:<10} {:<12} {:<13} {:>12}",
        "State", "Has Nexus", "Breach Date", "Type", "Amount"
    )?;
    for r in results {
        let amount = match (r.breach_type, r.breach_amount) {
            (Some(BreachType::Transactions), Some(count)) => group_thousands(count.round() as u64),
            (_, amount) => currency_or_dash(amount),
        };
        writeln!(
            out,
            "{:<6} {:<10} {:<12} {:<13} {:>12}",
            r.state,
            if r.has_nexus { "Yes" } else { "No" },
            r.breach_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "—".to_string()),
            r.breach_type.map(|t| t.as_str()).unwrap_or("—"),
            amount,
        )?;
    }
    Ok(())
}
