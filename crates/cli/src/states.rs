//! `nexus states` and `nexus state-info`.

use crate::format::{currency, group_thousands, percent};
use crate::DEFAULT_CONFIG_PATH;
use anyhow::Context;
use clap::Args;
use nexus_core::{normalize_state, NexusConfig, StateConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments for `nexus states`.
#[derive(Args, Debug, Clone)]
pub struct StatesArgs {
    /// State config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Show tax rate and marketplace treatment.
    #[arg(long)]
    pub verbose: bool,
}

/// Arguments for `nexus state-info`.
#[derive(Args, Debug, Clone)]
pub struct StateInfoArgs {
    /// State code.
    pub state: String,
    /// State config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

fn load(path: &Path) -> anyhow::Result<NexusConfig> {
    NexusConfig::from_yaml(path).with_context(|| format!("loading config {}", path.display()))
}

fn sales_cell(cfg: &StateConfig) -> String {
    match cfg.sales_threshold {
        Some(t) if t > 0.0 => currency(t),
        _ => "—".to_string(),
    }
}

fn transactions_cell(cfg: &StateConfig) -> String {
    match cfg.transaction_threshold {
        Some(t) if t > 0 => group_thousands(t),
        _ => "—".to_string(),
    }
}

/// List configured states and their thresholds.
pub fn run_list(args: &StatesArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load(&args.config)?;

    writeln!(out, "Configured States")?;
    write!(
        out,
        "{:<8} {:>16} {:>22}  {:<20}",
        "State", "Sales Threshold", "Transaction Threshold", "Lookback Rule"
    )?;
    if args.verbose {
        write!(out, " {:>9}  {:<11}", "Tax Rate", "Marketplace")?;
    }
    writeln!(out)?;

    for (state, cfg) in &config.states {
        write!(
            out,
            "{:<8} {:>16} {:>22}  {:<20}",
            state,
            sales_cell(cfg),
            transactions_cell(cfg),
            cfg.lookback_rule
        )?;
        if args.verbose {
            let marketplace = if cfg.marketplace_threshold_inclusion { "✓" } else { "✗" };
            write!(out, " {:>9}  {:<11}", percent(cfg.tax_rate, 2), marketplace)?;
        }
        writeln!(out)?;
    }

    let summary = config.summary();
    writeln!(out, "\nSummary:")?;
    writeln!(out, "  • Total states: {}", summary.total_states)?;
    writeln!(out, "  • With sales threshold: {}", summary.states_with_sales_threshold)?;
    writeln!(
        out,
        "  • With transaction threshold: {}",
        summary.states_with_transaction_threshold
    )?;
    Ok(())
}

/// Show one state's configuration.
pub fn run_info(args: &StateInfoArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load(&args.config)?;
    let state = normalize_state(&args.state);

    let cfg = config.state(&state).with_context(|| {
        let available: Vec<&str> = config.states.keys().map(String::as_str).collect();
        format!("Available states: {}", available.join(", "))
    })?;

    writeln!(out, "\n{state} - Nexus Configuration")?;
    writeln!(out, "{}", "=".repeat(40))?;

    writeln!(out, "\nThresholds:")?;
    match cfg.sales_threshold {
        Some(t) if t > 0.0 => writeln!(out, "  • Sales: {}", currency(t))?,
        _ => writeln!(out, "  • Sales: Not applicable")?,
    }
    match cfg.transaction_threshold {
        Some(t) if t > 0 => writeln!(out, "  • Transactions: {}", group_thousands(t))?,
        _ => writeln!(out, "  • Transactions: Not applicable")?,
    }

    writeln!(out, "\nRules:")?;
    writeln!(out, "  • Lookback: {}", cfg.lookback_rule)?;
    writeln!(
        out,
        "  • Include marketplace sales: {}",
        if cfg.marketplace_threshold_inclusion { "Yes" } else { "No" }
    )?;

    writeln!(out, "\nTax Information:")?;
    writeln!(out, "  • Tax rate: {}", percent(cfg.tax_rate, 2))?;
    writeln!(out, "  • Standard penalty: {}", percent(cfg.standard_penalty_rate, 0))?;
    if let Some(rate) = cfg.interest_rate {
        writeln!(out, "  • Interest rate: {} annually", percent(rate, 1))?;
    }
    if let Some(cap) = cfg.vda_lookback_cap {
        writeln!(out, "  • VDA look-back cap: {cap} years")?;
    }

    if let Some(date) = cfg.effective_date {
        writeln!(out, "\nEffective: {date}")?;
    }
    if let Some(notes) = &cfg.notes {
        writeln!(out, "\nNotes: {notes}")?;
    }
    Ok(())
}
