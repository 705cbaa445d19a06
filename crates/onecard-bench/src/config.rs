use onecard_core::MAX_PLAYERS;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const MIN_SCORED_PLAYERS: usize = 2;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// One analysis run, as read from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub run_id: String,
    pub players: Vec<usize>,
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnalysisConfig {
    /// Load and validate a YAML file. Every failure carries the file's path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let reader = match File::open(&path) {
            Ok(file) => BufReader::new(file),
            Err(source) => return Err(ConfigError::Read { source, path }),
        };
        let mut cfg: AnalysisConfig = match serde_yaml::from_reader(reader) {
            Ok(cfg) => cfg,
            Err(source) => return Err(ConfigError::Parse { source, path }),
        };
        match cfg.validate() {
            Ok(()) => Ok(cfg),
            Err(source) => Err(ConfigError::Invalid { path, source }),
        }
    }

    /// Checks every field and fills defaults; no I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        validate_players(&self.players)?;
        if let Some(simulation) = &self.simulation {
            simulation.validate()?;
        }
        self.outputs.validate(&self.run_id)?;
        if self.logging.tracing_level.trim().is_empty() {
            self.logging.tracing_level = default_tracing_level();
        }
        Ok(())
    }

    /// Output paths with `{run_id}` substituted.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let resolve = |template: &str| PathBuf::from(template.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: resolve(&self.outputs.jsonl),
            summary_md: resolve(&self.outputs.summary_md),
        }
    }
}

/// Monte Carlo cross-check settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub deals: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.deals {
            0 => Err(invalid("simulation.deals", "must be greater than zero")),
            _ => Ok(()),
        }
    }
}

/// Where the JSONL rows and the Markdown summary go.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        let fields = [
            ("outputs.jsonl", self.jsonl.as_str()),
            ("outputs.summary_md", self.summary_md.as_str()),
        ];
        for (field, template) in fields {
            if template.trim().is_empty() {
                return Err(invalid(field, "path must not be empty"));
            }
            let resolved = template.replace("{run_id}", run_id);
            if Path::new(&resolved).file_name().is_none() {
                return Err(invalid(field, format!("'{resolved}' does not name a file")));
            }
        }
        Ok(())
    }
}

/// Structured logging is off unless enabled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Also record one event per solved bid history.
    #[serde(default)]
    pub solver_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            solver_details: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; `None` for anything `tracing` does not recognise.
    pub fn level(&self) -> Option<Level> {
        self.tracing_level.trim().parse().ok()
    }
}

fn default_tracing_level() -> String {
    String::from("info")
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        Err(invalid("run_id", "must not be empty"))
    } else if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        Err(invalid(
            "run_id",
            format!("character {bad:?} not allowed; use letters, digits, '.', '_' or '-'"),
        ))
    } else {
        Ok(())
    }
}

fn validate_players(players: &[usize]) -> Result<(), ValidationError> {
    if players.is_empty() {
        return Err(invalid("players", "list at least one player count"));
    }
    let mut seen = HashSet::with_capacity(players.len());
    for &count in players {
        if !(MIN_SCORED_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(invalid(
                "players",
                format!("player count {count} is outside {MIN_SCORED_PLAYERS}..={MAX_PLAYERS}"),
            ));
        }
        if !seen.insert(count) {
            return Err(invalid(
                "players",
                format!("player count {count} listed more than once"),
            ));
        }
    }
    Ok(())
}

/// Output paths after template substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        let (ConfigError::Read { path, .. }
        | ConfigError::Parse { path, .. }
        | ConfigError::Invalid { path, .. }) = self;
        path
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
