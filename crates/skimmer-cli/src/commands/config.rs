//! Config command implementation

use anyhow::{Context, Result};
use skimmer::SkimConfig;
use std::path::PathBuf;

pub fn execute(output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(&SkimConfig::default())
        .context("Failed to serialize default configuration")?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote default configuration to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
