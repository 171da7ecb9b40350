use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of upstream record a [`SourceId`] points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Tau,
    Muon,
    Vertex,
    GenParticle,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Tau => "tau",
            SourceKind::Muon => "muon",
            SourceKind::Vertex => "vertex",
            SourceKind::GenParticle => "gen_particle",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of output collection an [`OutputRef`] points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Tau,
    Muon,
    RecoVertex,
    GenParticle,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Tau => "tau",
            OutputKind::Muon => "muon",
            OutputKind::RecoVertex => "reco_vertex",
            OutputKind::GenParticle => "gen_particle",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a source collection within one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub u16);

/// Opaque handle to one source record, valid for the current event only
///
/// Identity is positional: two records with identical field values in
/// different slots are different identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
    kind: SourceKind,
    collection: CollectionId,
    index: u32,
}

impl SourceId {
    pub fn new(kind: SourceKind, collection: CollectionId, index: u32) -> Self {
        Self {
            kind,
            collection,
            index,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.kind, self.collection.0, self.index)
    }
}

/// Serialized pointer from one source record to another
///
/// Resolved into a [`SourceId`] by the source accessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub collection: String,
    pub index: u32,
}

impl RecordRef {
    pub fn new(collection: impl Into<String>, index: u32) -> Self {
        Self {
            collection: collection.into(),
            index,
        }
    }
}

/// Position of an entry in an output collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OutputRef {
    pub kind: OutputKind,
    pub index: u32,
}

impl OutputRef {
    pub fn new(kind: OutputKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.index)
    }
}

/// Run / luminosity block / event number triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}
