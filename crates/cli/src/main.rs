//! # nexus CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Nexus Analyzer - automated sales tax nexus detection.
///
/// Analyzes sales data to determine where you have economic nexus
/// obligations based on state thresholds.
#[derive(Parser, Debug)]
#[command(name = "nexus", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze sales data for nexus determination.
    Analyze(nexus_cli::analyze::AnalyzeArgs),
    /// Generate sample sales data for testing.
    GenerateSample(nexus_cli::sample::GenerateSampleArgs),
    /// List configured states and their thresholds.
    States(nexus_cli::states::StatesArgs),
    /// Show detailed information for a specific state.
    StateInfo(nexus_cli::states::StateInfoArgs),
    /// Run a quick analysis over generated data.
    Demo(nexus_cli::sample::DemoArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = match &cli.command {
        Commands::Analyze(args) => nexus_cli::analyze::run(args, &mut out),
        Commands::GenerateSample(args) => nexus_cli::sample::run_generate(args, &mut out),
        Commands::States(args) => nexus_cli::states::run_list(args, &mut out),
        Commands::StateInfo(args) => nexus_cli::states::run_info(args, &mut out),
        Commands::Demo(args) => nexus_cli::sample::run_demo(args, &mut out),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = out.flush();
            eprintln!("✗ Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
