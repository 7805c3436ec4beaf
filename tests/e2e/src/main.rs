//! End-to-End Test Runner for Strata

use anyhow::{bail, Result};
use clap::Parser;
use e2e_tests::{run_all, scenarios, TestResult};
use std::path::PathBuf;
use strata_config::{init_tracing, EngineConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to run
    #[arg(short, long, default_value = "all")]
    scenario: String,

    /// Write results as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = r#"
[chains.local]
chain_id = 31337
core = "0x0000000000000000000000000000000000000001"
"#;

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    init_tracing(&config.logging)?;

    info!("Starting Strata E2E Test Suite");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let selected: Vec<_> = scenarios::all()
        .into_iter()
        .filter(|scenario| args.scenario == "all" || scenario.name() == args.scenario)
        .collect();
    if selected.is_empty() {
        bail!("Unknown scenario: {}", args.scenario);
    }

    let results = run_all(&config, &selected)?;
    print_summary(&results);

    if let Some(output) = &args.output {
        std::fs::write(output, serde_json::to_string_pretty(&results)?)?;
        info!("Results written to {}", output.display());
    }

    let failed = results.iter().filter(|result| !result.passed).count();
    if failed > 0 {
        error!("{} of {} scenarios failed", failed, results.len());
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(results: &[TestResult]) {
    println!("\n=== Strata E2E Results ===");
    for result in results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!(
            "[{}] {} ({} checks, {:?})",
            status,
            result.scenario,
            result.checks.len(),
            result.duration
        );
        if let Some(err) = &result.error {
            println!("       {}", err);
        }
    }
}
