use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const SOLVER_TARGET: &str = "onecard_core::solver";
const SCORES_TARGET: &str = "onecard_core::scores";
const SIMULATE_TARGET: &str = "onecard_core::simulate";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub solver: SolverTelemetrySummary,
    pub scores: Vec<ScoreTelemetry>,
    pub simulations: Vec<SimulationTelemetry>,
}

/// Per-history solve events, keyed by player count.
#[derive(Debug, Default, Serialize)]
pub struct SolverTelemetrySummary {
    pub solved: usize,
    pub unreachable: usize,
    pub solved_by_players: BTreeMap<u64, usize>,
}

#[derive(Debug, Serialize)]
pub struct ScoreTelemetry {
    pub players: u64,
    pub scored: u64,
    pub skipped_unreachable: u64,
    pub skipped_illegal: u64,
}

#[derive(Debug, Serialize)]
pub struct SimulationTelemetry {
    pub players: u64,
    pub deals: u64,
    pub discarded: u64,
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Aggregate the `onecard_core` events captured in a JSON-lines telemetry log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut summary = TelemetrySummary::default();
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|source| TelemetryError::Io {
                context: "reading telemetry line",
                source,
            })?;
        // The appender may still be writing the last line.
        if read == 0 || !line.ends_with('\n') {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            SOLVER_TARGET => {
                summary.solver.solved += 1;
                if field_u64(&fields, "threshold") == Some(0) {
                    summary.solver.unreachable += 1;
                }
                if let Some(players) = field_u64(&fields, "players") {
                    *summary.solver.solved_by_players.entry(players).or_insert(0) += 1;
                }
            }
            SCORES_TARGET => summary.scores.push(ScoreTelemetry {
                players: field_u64(&fields, "players").unwrap_or_default(),
                scored: field_u64(&fields, "scored").unwrap_or_default(),
                skipped_unreachable: field_u64(&fields, "skipped_unreachable")
                    .unwrap_or_default(),
                skipped_illegal: field_u64(&fields, "skipped_illegal").unwrap_or_default(),
            }),
            SIMULATE_TARGET => summary.simulations.push(SimulationTelemetry {
                players: field_u64(&fields, "players").unwrap_or_default(),
                deals: field_u64(&fields, "deals").unwrap_or_default(),
                discarded: field_u64(&fields, "discarded").unwrap_or_default(),
            }),
            _ => {}
        }
    }

    Ok(summary)
}

// Display-formatted fields arrive as strings.
fn field_u64(fields: &Map<String, Value>, name: &str) -> Option<u64> {
    let value = fields.get(name)?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(&json_path, serde_json::to_vec_pretty(&summary)?).map_err(|source| {
        TelemetryError::Io {
            context: "writing telemetry summary json",
            source,
        }
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let summary = &outputs.summary;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!(
        "- Histories solved: {} ({} unreachable)\n",
        summary.solver.solved, summary.solver.unreachable
    ));
    for score in &summary.scores {
        section.push_str(&format!(
            "- {} players: {} sequences scored\n",
            score.players, score.scored
        ));
    }
    for sim in &summary.simulations {
        section.push_str(&format!(
            "- {} players: {} deals simulated, {} discarded\n",
            sim.players, sim.deals, sim.discarded
        ));
    }

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Solver\n");
    output.push_str(&format!("- Histories solved: {}\n", summary.solver.solved));
    output.push_str(&format!("- Unreachable: {}\n", summary.solver.unreachable));
    for (players, count) in &summary.solver.solved_by_players {
        output.push_str(&format!("  - {players} players: {count}\n"));
    }
    output.push('\n');

    output.push_str("## Scores\n");
    if summary.scores.is_empty() {
        output.push_str("- <none>\n");
    }
    for score in &summary.scores {
        output.push_str(&format!(
            "- {} players: {} scored, {} unreachable, {} illegal\n",
            score.players, score.scored, score.skipped_unreachable, score.skipped_illegal
        ));
    }
    output.push('\n');

    output.push_str("## Simulations\n");
    if summary.simulations.is_empty() {
        output.push_str("- <none>\n");
    }
    for sim in &summary.simulations {
        output.push_str(&format!(
            "- {} players: {} deals, {} discarded\n",
            sim.players, sim.deals, sim.discarded
        ));
    }
    output
}
