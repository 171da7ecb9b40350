//! Run command implementation

use anyhow::{Context, Result};
use skimmer::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

pub struct RunOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub parallel: bool,
    pub keep_going: bool,
}

/// Events written and events skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: u64,
    pub failed: u64,
}

pub fn execute(options: RunOptions) -> Result<RunSummary> {
    let mut config = match &options.config {
        Some(path) => SkimConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SkimConfig::default(),
    };
    if options.parallel {
        config = config.with_parallel(true);
    }

    let mut pipeline = EventPipeline::from_config(&config).context("Failed to build pipeline")?;
    tracing::info!(
        "Skimming {} with components [{}]",
        options.input.display(),
        pipeline.component_names().join(", ")
    );

    let reader = EventReader::from_path(&options.input)
        .with_context(|| format!("Failed to open {}", options.input.display()))?;

    let sink: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);

    let start = Instant::now();
    let mut summary = RunSummary::default();
    for event in reader {
        let result = event.and_then(|event| pipeline.process(&event));
        match result {
            Ok(out) => {
                serde_json::to_writer(&mut sink, &out).context("Failed to write event")?;
                sink.write_all(b"\n")?;
                summary.written += 1;
            }
            Err(e) if options.keep_going => {
                tracing::error!("Skipping event: {}", e);
                summary.failed += 1;
            }
            Err(e) => return Err(e).context("Event processing failed"),
        }
    }
    sink.flush()?;

    tracing::info!(
        "Wrote {} event(s), skipped {} in {:?}",
        summary.written,
        summary.failed,
        start.elapsed()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer::skimmer_core::types::{Momentum, TauRecord};

    fn event(n: u64, pt: f64) -> InputEvent {
        InputEvent::new(EventKey {
            run: 1,
            lumi: 1,
            event: n,
        })
        .with_real_data(true)
        .with_collection("vertices", SourceCollection::Vertices(Vec::new()))
        .with_collection(
            "taus",
            SourceCollection::Taus(vec![TauRecord {
                p4: Momentum::new(pt, 0.0, 0.0, 1.777),
                ..Default::default()
            }]),
        )
        .with_collection("muons", SourceCollection::Muons(Vec::new()))
    }

    fn write_input(dir: &std::path::Path, lines: &[String]) -> PathBuf {
        let path = dir.join("events.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_run_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..3)
            .map(|i| serde_json::to_string(&event(i, 20.0 + i as f64)).unwrap())
            .collect();
        let input = write_input(dir.path(), &lines);
        let output = dir.path().join("out.jsonl");

        let summary = execute(RunOptions {
            input,
            output: Some(output.clone()),
            config: None,
            parallel: false,
            keep_going: false,
        })
        .unwrap();
        assert_eq!(summary, RunSummary { written: 3, failed: 0 });

        let written = std::fs::read_to_string(&output).unwrap();
        let events: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2]["event"], serde_json::json!(2));
        assert!(events[0]["taus"][0]["vertex"].is_null());
    }

    #[test]
    fn test_keep_going_skips_bad_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = event(1, 30.0);
        broken.collections.retain(|c| c.label != "muons");
        let lines = vec![
            serde_json::to_string(&event(0, 30.0)).unwrap(),
            serde_json::to_string(&broken).unwrap(),
            "not json".to_string(),
            serde_json::to_string(&event(3, 30.0)).unwrap(),
        ];
        let input = write_input(dir.path(), &lines);
        let output = dir.path().join("out.jsonl");

        let options = |keep_going| RunOptions {
            input: input.clone(),
            output: Some(output.clone()),
            config: None,
            parallel: true,
            keep_going,
        };

        assert!(execute(options(false)).is_err());

        let summary = execute(options(true)).unwrap();
        assert_eq!(summary, RunSummary { written: 2, failed: 2 });
    }

    #[test]
    fn test_config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("skim.json");
        std::fs::write(&config, r#"{"taus": {"min_pt": 25.0}}"#).unwrap();
        let lines = vec![
            serde_json::to_string(&event(0, 20.0)).unwrap(),
            serde_json::to_string(&event(1, 30.0)).unwrap(),
        ];
        let input = write_input(dir.path(), &lines);
        let output = dir.path().join("out.jsonl");

        execute(RunOptions {
            input,
            output: Some(output.clone()),
            config: Some(config),
            parallel: false,
            keep_going: false,
        })
        .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let taus: Vec<usize> = written
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["taus"].as_array().unwrap().len()
            })
            .collect();
        assert_eq!(taus, vec![0, 1]);
    }
}
