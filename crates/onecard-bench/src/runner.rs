use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use onecard_core::{
    ScoreReport, SimulationSummary, Simulator, SolverError, ThresholdSolver, ThresholdTable,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalysisSummary, AnalyticsError, PlayerSection};
use crate::config::{AnalysisConfig, ResolvedOutputs};
use crate::logging::{TELEMETRY_FILE, telemetry_dir};
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

/// Solves, scores and optionally simulates every configured table size.
pub struct AnalysisRunner {
    config: AnalysisConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub player_counts: Vec<usize>,
    pub rows_written: usize,
    pub deals_simulated: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum AnalysisRow<'a> {
    Threshold {
        run_id: &'a str,
        players: usize,
        history: String,
        threshold: u8,
        reachable: bool,
    },
    Score {
        run_id: &'a str,
        players: usize,
        seat: usize,
        expected: String,
        expected_value: f64,
        total_weight: String,
    },
    Simulation {
        run_id: &'a str,
        players: usize,
        seat: usize,
        seed: u64,
        deals_scored: usize,
        deals_discarded: usize,
        mean: f64,
        std_error: f64,
        exact: f64,
        p_value: f64,
    },
}

impl AnalysisRunner {
    pub fn new(config: AnalysisConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.players.is_empty() {
            return Err(RunnerError::NoPlayerCounts);
        }
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Run every player count, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut solver = ThresholdSolver::new();
        let mut summary = AnalysisSummary::new(self.config.run_id.clone());
        let mut rows_written = 0usize;
        let mut deals_simulated = 0usize;

        for &players in &self.config.players {
            let table = solver.table(players)?;
            let report = solver.expected_scores(players)?;
            let simulation = self.config.simulation.as_ref().map(|sim| {
                Simulator::new(&table, sim.seed.unwrap_or(0)).run(sim.deals)
            });
            if let Some(sim) = simulation.as_ref() {
                deals_simulated += sim.deals_requested;
            }

            let section = PlayerSection {
                table,
                report,
                simulation,
            };
            let rows = write_section_rows(&mut writer, &self.config.run_id, &section)?;
            rows_written += rows;

            if tracing::enabled!(Level::INFO) {
                let stats = solver.stats();
                event!(
                    target: "onecard_bench::runner",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    players,
                    rows,
                    cache_entries = stats.entries,
                    cache_hits = stats.hits,
                    cache_misses = stats.misses,
                );
            }
            summary.push(section);
        }

        writer.flush()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_dir = telemetry_dir(&self.outputs);
        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_dir.join(TELEMETRY_FILE));

        let telemetry_outputs = match telemetry_path.as_ref() {
            Some(path) => write_summary_outputs(path, &telemetry_dir)?,
            None => None,
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            player_counts: self.config.players.clone(),
            rows_written,
            deals_simulated,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_row(writer: &mut BufWriter<File>, row: &AnalysisRow<'_>) -> Result<(), RunnerError> {
    serde_json::to_writer(&mut *writer, row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn write_section_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    section: &PlayerSection,
) -> Result<usize, RunnerError> {
    let mut rows_written = threshold_rows(writer, run_id, &section.table)?;
    rows_written += score_rows(writer, run_id, &section.report)?;
    if let Some(simulation) = section.simulation.as_ref() {
        rows_written += simulation_rows(writer, run_id, section, simulation)?;
    }
    Ok(rows_written)
}

fn threshold_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    table: &ThresholdTable,
) -> Result<usize, RunnerError> {
    for entry in table.entries() {
        write_row(
            writer,
            &AnalysisRow::Threshold {
                run_id,
                players: table.players(),
                history: entry.history.to_string(),
                threshold: entry.threshold,
                reachable: entry.reachable,
            },
        )?;
    }
    Ok(table.len())
}

fn score_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    report: &ScoreReport,
) -> Result<usize, RunnerError> {
    for (seat, score) in report.scores.iter().enumerate() {
        write_row(
            writer,
            &AnalysisRow::Score {
                run_id,
                players: report.players,
                seat,
                expected: score.to_string(),
                expected_value: score.as_f64(),
                total_weight: report.total_weight.to_string(),
            },
        )?;
    }
    Ok(report.scores.len())
}

fn simulation_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    section: &PlayerSection,
    simulation: &SimulationSummary,
) -> Result<usize, RunnerError> {
    let comparisons = section.comparisons();
    for cmp in &comparisons {
        write_row(
            writer,
            &AnalysisRow::Simulation {
                run_id,
                players: simulation.players,
                seat: cmp.seat,
                seed: simulation.seed,
                deals_scored: simulation.deals_scored,
                deals_discarded: simulation.deals_discarded,
                mean: cmp.simulated,
                std_error: cmp.std_error,
                exact: cmp.exact,
                p_value: cmp.p_value,
            },
        )?;
    }
    Ok(comparisons.len())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration lists no player counts")]
    NoPlayerCounts,
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
