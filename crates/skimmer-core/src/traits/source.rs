use crate::error::{Result, SkimError};
use crate::types::{
    CollectionId, EventKey, GenRecord, MuonRecord, RecordRef, SourceCollection, SourceId,
    SourceKind, TauRecord, VertexRecord,
};

/// Read-only view over one typed source collection
#[derive(Debug)]
pub struct Records<'a, T> {
    kind: SourceKind,
    collection: CollectionId,
    items: &'a [T],
}

impl<'a, T> Records<'a, T> {
    pub fn new(kind: SourceKind, collection: CollectionId, items: &'a [T]) -> Self {
        Self {
            kind,
            collection,
            items,
        }
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `(identity, record)` pairs in source order
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &'a T)> + 'a {
        let (kind, collection) = (self.kind, self.collection);
        self.items
            .iter()
            .enumerate()
            .map(move |(i, item)| (SourceId::new(kind, collection, i as u32), item))
    }

    /// Record behind `id`, if it belongs to this collection
    pub fn get(&self, id: &SourceId) -> Option<&'a T> {
        if id.kind() != self.kind || id.collection() != self.collection {
            return None;
        }
        self.items.get(id.index() as usize)
    }
}

/// Source of upstream records for one event
///
/// Implementations must be stable within an event: the same label yields the
/// same records in the same order on every call.
pub trait SourceAccessor: Sync {
    fn event_key(&self) -> EventKey;

    fn is_real_data(&self) -> bool;

    /// Collection bound to `label`
    fn collection(&self, label: &str) -> Result<(CollectionId, &SourceCollection)>;

    /// Resolve a serialized record pointer into an identity
    fn resolve(&self, record: &RecordRef) -> Option<SourceId> {
        let (id, collection) = self.collection(&record.collection).ok()?;
        if (record.index as usize) < collection.len() {
            Some(SourceId::new(collection.kind(), id, record.index))
        } else {
            None
        }
    }

    /// Resolve a record pointer that must land in a collection of `kind`.
    ///
    /// Pointers into a collection of another kind resolve to `None`.
    fn resolve_as(&self, kind: SourceKind, record: &RecordRef) -> Option<SourceId> {
        self.resolve(record).filter(|id| id.kind() == kind)
    }

    fn taus(&self, label: &str) -> Result<Records<'_, TauRecord>> {
        match self.collection(label)? {
            (id, SourceCollection::Taus(items)) => Ok(Records::new(SourceKind::Tau, id, items)),
            (_, other) => Err(SkimError::kind_mismatch(SourceKind::Tau, other.kind())),
        }
    }

    fn muons(&self, label: &str) -> Result<Records<'_, MuonRecord>> {
        match self.collection(label)? {
            (id, SourceCollection::Muons(items)) => Ok(Records::new(SourceKind::Muon, id, items)),
            (_, other) => Err(SkimError::kind_mismatch(SourceKind::Muon, other.kind())),
        }
    }

    fn vertices(&self, label: &str) -> Result<Records<'_, VertexRecord>> {
        match self.collection(label)? {
            (id, SourceCollection::Vertices(items)) => {
                Ok(Records::new(SourceKind::Vertex, id, items))
            }
            (_, other) => Err(SkimError::kind_mismatch(SourceKind::Vertex, other.kind())),
        }
    }

    fn gen_particles(&self, label: &str) -> Result<Records<'_, GenRecord>> {
        match self.collection(label)? {
            (id, SourceCollection::GenParticles(items)) => {
                Ok(Records::new(SourceKind::GenParticle, id, items))
            }
            (_, other) => Err(SkimError::kind_mismatch(SourceKind::GenParticle, other.kind())),
        }
    }
}
