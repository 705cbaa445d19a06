use std::path::PathBuf;

use clap::Parser;

use onecard_bench::config::{AnalysisConfig, ResolvedOutputs, SimulationConfig};
use onecard_bench::logging::init_logging;
use onecard_bench::runner::AnalysisRunner;

/// Exact equilibrium analysis of one-card trick bidding.
#[derive(Debug, Parser)]
#[command(
    name = "onecard-bench",
    author,
    version,
    about = "Equilibrium thresholds and expected scores for one-card bidding"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/onecard.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the table sizes to analyse, e.g. `--players 2,3,4`.
    #[arg(long, value_name = "N", value_delimiter = ',')]
    players: Option<Vec<usize>>,

    /// Override the number of simulated deals (enables simulation when absent from config).
    #[arg(long, value_name = "DEALS")]
    deals: Option<usize>,

    /// Override the RNG seed for simulated deals.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (nothing is solved).
    #[arg(long)]
    validate_only: bool,

    /// Record one telemetry event per solved bid history.
    #[arg(long)]
    log_solver_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AnalysisConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(players) = cli.players {
        config.players = players;
    }

    if let Some(deals) = cli.deals {
        config
            .simulation
            .get_or_insert(SimulationConfig { deals, seed: None })
            .deals = deals;
    }

    if let Some(seed) = cli.seed {
        let Some(simulation) = config.simulation.as_mut() else {
            anyhow::bail!(
                "--seed needs a simulation block in {} or --deals",
                cli.config.display()
            );
        };
        simulation.seed = Some(seed);
    }

    if cli.log_solver_details {
        config.logging.solver_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let counts = config
        .players
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let deals = config.simulation.as_ref().map_or(0, |sim| sim.deals);

    println!(
        "Loaded configuration '{run_id}' for {counts} players ({deals} simulated deals each)"
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = AnalysisRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: analysis skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Analysis complete for '{run_id}': {} table sizes, {} deals simulated → {} rows at {}",
        summary.player_counts.len(),
        summary.deals_simulated,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Solver: {} histories solved, {} unreachable",
            outputs.summary.solver.solved, outputs.summary.solver.unreachable
        );
    }

    Ok(())
}
