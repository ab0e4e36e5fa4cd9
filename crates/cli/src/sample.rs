//! `nexus generate-sample` and `nexus demo`.

use crate::analyze::write_results_table;
use crate::DEFAULT_CONFIG_PATH;
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use nexus_calculator::evaluate_all;
use nexus_core::NexusConfig;
use nexus_ingestion::{write_rows, DataCleaner, SampleConfig, SampleDataGenerator};
use std::io::Write;
use std::path::PathBuf;

/// States used by `nexus demo`.
const DEMO_STATES: [&str; 3] = ["CA", "TX", "FL"];

/// Arguments for `nexus generate-sample`.
#[derive(Args, Debug, Clone)]
pub struct GenerateSampleArgs {
    /// Output file path.
    #[arg(short, long, default_value = "sample_sales_data.json")]
    pub output: PathBuf,
    /// Start date (YYYY-MM-DD).
    #[arg(long, default_value = "2022-01-01")]
    pub start_date: NaiveDate,
    /// End date (YYYY-MM-DD).
    #[arg(long, default_value = "2023-12-31")]
    pub end_date: NaiveDate,
    /// Comma-separated state codes (default: CA,TX,NY,FL,IL,PA,OH,WA).
    #[arg(long)]
    pub states: Option<String>,
    /// Inject data to force nexus breaches.
    #[arg(long)]
    pub force_breach: bool,
    /// Random seed for reproducibility.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl GenerateSampleArgs {
    fn sample_config(&self) -> SampleConfig {
        let mut config = SampleConfig {
            start: self.start_date,
            end: self.end_date,
            seed: self.seed,
            force_breach: self.force_breach,
            ..SampleConfig::default()
        };
        if let Some(states) = &self.states {
            config.states = states
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        config
    }
}

/// Generate a sample data file.
pub fn run_generate(args: &GenerateSampleArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = args.sample_config();
    let rows = SampleDataGenerator::new(config.clone())?.generate()?;

    write_rows(&args.output, &rows)
        .with_context(|| format!("writing sample data {}", args.output.display()))?;

    writeln!(out, "✓ Generated {} rows", rows.len())?;
    writeln!(out, "✓ Date range: {} to {}", args.start_date, args.end_date)?;
    writeln!(out, "✓ States: {}", config.states.join(", "))?;
    if args.force_breach {
        writeln!(out, "⚠️  Forced breach data injected")?;
    }
    writeln!(out, "✓ Saved to: {}", args.output.display())?;
    Ok(())
}

/// Arguments for `nexus demo`.
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// State config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Run a quick analysis over generated data.
pub fn run_demo(args: &DemoArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "Running quick nexus analysis test...\n")?;

    let sample = SampleConfig {
        start: NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid demo start date")?,
        end: NaiveDate::from_ymd_opt(2023, 12, 31).context("invalid demo end date")?,
        states: DEMO_STATES.iter().map(|s| s.to_string()).collect(),
        force_breach: true,
        ..SampleConfig::default()
    };
    let rows = SampleDataGenerator::new(sample)?.generate()?;
    writeln!(out, "✓ Generated {} rows of test data", rows.len())?;

    let cleaned = DataCleaner::clean(rows)?;
    let config = NexusConfig::from_yaml(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let results = evaluate_all(&config.rule_set(), &cleaned.records)?;

    writeln!(out)?;
    write_results_table(&results, out)?;
    writeln!(out, "\nTest complete!")?;
    Ok(())
}
