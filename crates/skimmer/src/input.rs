//! JSON event input
//!
//! One event is a JSON object:
//!
//! ```json
//! {"run": 1, "lumi": 7, "event": 1234, "is_real_data": false,
//!  "collections": [{"label": "taus", "records": {"taus": [...]}}]}
//! ```
//!
//! Event files are JSON-lines: one event per line, blank lines ignored.

use serde::{Deserialize, Serialize};
use skimmer_core::{
    types::SourceCollection, CollectionId, EventKey, Result, SkimError, SourceAccessor,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A source collection bound to a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCollection {
    pub label: String,
    pub records: SourceCollection,
}

/// One upstream event held in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    #[serde(flatten)]
    pub key: EventKey,

    #[serde(default)]
    pub is_real_data: bool,

    #[serde(default)]
    pub collections: Vec<NamedCollection>,
}

impl InputEvent {
    pub fn new(key: EventKey) -> Self {
        Self {
            key,
            is_real_data: false,
            collections: Vec::new(),
        }
    }

    pub fn with_real_data(mut self, is_real_data: bool) -> Self {
        self.is_real_data = is_real_data;
        self
    }

    pub fn with_collection(mut self, label: impl Into<String>, records: SourceCollection) -> Self {
        self.collections.push(NamedCollection {
            label: label.into(),
            records,
        });
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let event: InputEvent = serde_json::from_str(json)?;
        event.validate()?;
        Ok(event)
    }

    /// Labels must be unique and collection positions must fit a `CollectionId`
    pub fn validate(&self) -> Result<()> {
        if self.collections.len() > u16::MAX as usize {
            return Err(SkimError::Serialization(format!(
                "event {}: too many collections ({})",
                self.key,
                self.collections.len()
            )));
        }

        let mut seen = HashSet::new();
        for c in &self.collections {
            if !seen.insert(c.label.as_str()) {
                return Err(SkimError::Serialization(format!(
                    "event {}: duplicate collection label '{}'",
                    self.key, c.label
                )));
            }
            if c.records.len() > u32::MAX as usize {
                return Err(SkimError::Serialization(format!(
                    "event {}: collection '{}' is too large",
                    self.key, c.label
                )));
            }
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.label.as_str())
    }
}

impl SourceAccessor for InputEvent {
    fn event_key(&self) -> EventKey {
        self.key
    }

    fn is_real_data(&self) -> bool {
        self.is_real_data
    }

    fn collection(&self, label: &str) -> Result<(CollectionId, &SourceCollection)> {
        let (i, c) = self
            .collections
            .iter()
            .enumerate()
            .find(|(_, c)| c.label == label)
            .ok_or_else(|| SkimError::MissingCollection(label.to_string()))?;
        let id = u16::try_from(i).map_err(|_| {
            SkimError::Serialization(format!(
                "event {}: collection '{}' at position {} has no valid id",
                self.key, label, i
            ))
        })?;
        Ok((CollectionId(id), &c.records))
    }
}

/// Iterator over the events of a JSON-lines stream
pub struct EventReader<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl EventReader<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<InputEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = self.line;
            return Some(InputEvent::from_json_str(&line).map_err(|e| match e {
                SkimError::Serialization(msg) => {
                    SkimError::Serialization(format!("line {}: {}", line_no, msg))
                }
                other => other,
            }));
        }
    }
}
