// Installs the global subscriber, so this binary holds a single test.

use std::fs;

use onecard_bench::config::AnalysisConfig;
use onecard_bench::logging::{TELEMETRY_FILE, init_logging};
use onecard_bench::runner::AnalysisRunner;
use onecard_bench::telemetry::summarise_telemetry;
use tempfile::tempdir;

#[test]
fn structured_run_summarises_its_own_telemetry() {
    let dir = tempdir().expect("temp dir");
    let yaml = format!(
        r#"
run_id: "traced"
players: [2, 3]
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: true
  tracing_level: "info"
  solver_details: true
"#,
        jsonl = dir.path().join("{run_id}").join("scores.jsonl").display(),
        summary = dir.path().join("{run_id}").join("summary.md").display(),
    );
    let mut config: AnalysisConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    config.validate().expect("config validates");
    let outputs = config.resolved_outputs();

    let guard = init_logging(&config.logging, &outputs)
        .expect("logging initialises")
        .expect("structured logging enabled");
    let telemetry_path = dir.path().join("traced").join(TELEMETRY_FILE);
    assert_eq!(guard.telemetry_path, telemetry_path);

    let summary = AnalysisRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("analysis completes");
    assert_eq!(summary.telemetry_path.as_deref(), Some(telemetry_path.as_path()));

    let written = summary.telemetry_outputs.expect("telemetry summarised");
    assert!(written.json_path.exists());
    assert!(written.markdown_path.exists());
    assert_eq!(
        written.json_path,
        dir.path().join("traced").join("telemetry_summary.json")
    );

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("# Equilibrium Summary"));
    assert!(markdown.contains("## Telemetry Highlights"));
    assert!(markdown.contains("- Histories solved:"));

    // Dropping the guard flushes the background writer.
    drop(guard);
    let flushed = summarise_telemetry(&telemetry_path).expect("telemetry parses");
    assert_eq!(flushed.solver.solved, 3 + 7);
    assert_eq!(flushed.solver.unreachable, 1);
    assert_eq!(flushed.solver.solved_by_players.get(&2), Some(&3));
    assert_eq!(flushed.solver.solved_by_players.get(&3), Some(&7));
    let scored: Vec<u64> = flushed.scores.iter().map(|score| score.players).collect();
    assert_eq!(scored, vec![2, 3]);
    assert!(flushed.simulations.is_empty());
}
