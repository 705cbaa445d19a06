use std::fs;
use std::path::Path;

use onecard_core::{ScoreReport, SimulationSummary, ThresholdTable};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Everything computed for one table size.
#[derive(Debug, Clone)]
pub struct PlayerSection {
    pub table: ThresholdTable,
    pub report: ScoreReport,
    pub simulation: Option<SimulationSummary>,
}

impl PlayerSection {
    pub fn players(&self) -> usize {
        self.report.players
    }

    /// Simulated seat means tested against the exact expectation.
    pub fn comparisons(&self) -> Vec<SeatComparison> {
        let Some(simulation) = self.simulation.as_ref() else {
            return Vec::new();
        };
        self.report
            .scores
            .iter()
            .zip(&simulation.seats)
            .enumerate()
            .map(|(seat, (exact, stats))| {
                let exact = exact.as_f64();
                let (z, p_value) = two_sided_p_value(stats.mean - exact, stats.std_error);
                SeatComparison {
                    seat,
                    exact,
                    simulated: stats.mean,
                    std_error: stats.std_error,
                    z,
                    p_value,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeatComparison {
    pub seat: usize,
    pub exact: f64,
    pub simulated: f64,
    pub std_error: f64,
    pub z: f64,
    pub p_value: f64,
}

/// Normal-approximation test of `delta = 0` given its standard error.
pub fn two_sided_p_value(delta: f64, std_error: f64) -> (f64, f64) {
    if std_error <= 0.0 || !std_error.is_finite() {
        let p = if delta.abs() < f64::EPSILON { 1.0 } else { 0.0 };
        return (0.0, p);
    }
    let z = delta / std_error;
    let p = Normal::new(0.0, 1.0)
        .map(|normal| 2.0 * (1.0 - normal.cdf(z.abs())))
        .unwrap_or(1.0);
    (z, p.clamp(0.0, 1.0))
}

#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub run_id: String,
    pub sections: Vec<PlayerSection>,
}

impl AnalysisSummary {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: PlayerSection) {
        self.sections.push(section);
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Equilibrium Summary\n\n");
        out.push_str(&format!("Run: `{}`\n", self.run_id));

        for section in &self.sections {
            let report = &section.report;
            out.push_str(&format!("\n## {} players\n\n", section.players()));
            out.push_str(&format!(
                "Total weight {} over {} scored sequences ({} unreachable, {} illegal).\n\n",
                report.total_weight,
                report.sequences.len(),
                report.skipped_unreachable,
                report.skipped_illegal
            ));

            out.push_str("| History | Threshold | Reachable |\n");
            out.push_str("|---------|-----------|-----------|\n");
            for entry in section.table.entries() {
                out.push_str(&format!(
                    "| `{}` | {} | {} |\n",
                    entry.history,
                    entry.threshold,
                    if entry.reachable { "Yes" } else { "No" }
                ));
            }
            out.push('\n');

            let comparisons = section.comparisons();
            if comparisons.is_empty() {
                out.push_str("| Seat | Expected score | Decimal |\n");
                out.push_str("|------|----------------|---------|\n");
                for (seat, score) in report.scores.iter().enumerate() {
                    out.push_str(&format!(
                        "| {seat} | {score} | {value:.4} |\n",
                        value = score.as_f64()
                    ));
                }
            } else {
                out.push_str(
                    "| Seat | Expected score | Decimal | Simulated | Std. error | z | p-value |\n",
                );
                out.push_str(
                    "|------|----------------|---------|-----------|------------|---|---------|\n",
                );
                for (cmp, score) in comparisons.iter().zip(&report.scores) {
                    out.push_str(&format!(
                        "| {seat} | {score} | {exact:.4} | {sim:.4} | {se:.4} | {z:+.2} | {p:.3} |\n",
                        seat = cmp.seat,
                        exact = cmp.exact,
                        sim = cmp.simulated,
                        se = cmp.std_error,
                        z = cmp.z,
                        p = cmp.p_value,
                    ));
                }
                if let Some(simulation) = section.simulation.as_ref() {
                    out.push_str(&format!(
                        "\nSimulated {} deals with seed {} ({} discarded).\n",
                        simulation.deals_requested, simulation.seed, simulation.deals_discarded
                    ));
                }
            }
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}
