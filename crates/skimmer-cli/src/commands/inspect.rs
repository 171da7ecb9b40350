//! Inspect command implementation

use anyhow::{Context, Result};
use skimmer::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn execute(input: PathBuf) -> Result<()> {
    tracing::info!("Inspecting {}", input.display());

    let reader = EventReader::from_path(&input)
        .with_context(|| format!("Failed to open {}", input.display()))?;

    let mut events = 0u64;
    let mut real_data = 0u64;
    // label -> (kind, events present, total records)
    let mut collections: BTreeMap<String, (SourceKind, u64, usize)> = BTreeMap::new();

    for event in reader {
        let event = event.context("Failed to read event")?;
        events += 1;
        if event.is_real_data {
            real_data += 1;
        }
        for c in &event.collections {
            let entry = collections
                .entry(c.label.clone())
                .or_insert((c.records.kind(), 0, 0));
            entry.1 += 1;
            entry.2 += c.records.len();
        }
    }

    println!("\nInput Summary");
    println!("{}", "=".repeat(60));
    println!("Path: {}", input.display());
    println!("Events: {} ({} real data)", events, real_data);

    println!("\nCollections:");
    if collections.is_empty() {
        println!("  (none)");
    }
    for (label, (kind, present, records)) in &collections {
        let mean = if *present > 0 {
            *records as f64 / *present as f64
        } else {
            0.0
        };
        println!(
            "  {:<20} {:<12} in {} event(s), {:.1} records/event",
            label,
            kind.to_string(),
            present,
            mean
        );
    }
    println!();

    Ok(())
}
