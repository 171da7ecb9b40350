//! Identity registry
//!
//! A per-event set of bidirectional maps between source identities and
//! output entries, keyed by `(map name, source kind, output kind)`.
//!
//! During the fill phase every component writes into its own registry
//! fragment. At the barrier the fragments are merged into one registry and
//! sealed; the link phase only reads it.
//!
//! # Example
//!
//! ```
//! use skimmer_core::registry::{IdentityRegistry, MapSemantics};
//! use skimmer_core::types::{CollectionId, OutputKind, OutputRef, SourceId, SourceKind};
//!
//! # fn main() -> skimmer_core::Result<()> {
//! let mut registry = IdentityRegistry::new();
//! let vertices = registry.register(
//!     "vertices",
//!     SourceKind::Vertex,
//!     OutputKind::RecoVertex,
//!     MapSemantics::Unique,
//! )?;
//!
//! let pv = SourceId::new(SourceKind::Vertex, CollectionId(0), 0);
//! registry.add(&vertices, pv, OutputRef::new(OutputKind::RecoVertex, 0))?;
//!
//! assert_eq!(
//!     registry.lookup_forward(&vertices, &pv)?,
//!     Some(OutputRef::new(OutputKind::RecoVertex, 0))
//! );
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SkimError};
use crate::reorder::Permutation;
use crate::types::{OutputKind, OutputRef, SourceId, SourceKind};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Key of one identity map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapKey {
    pub name: String,
    pub source: SourceKind,
    pub output: OutputKind,
}

impl MapKey {
    pub fn new(name: impl Into<String>, source: SourceKind, output: OutputKind) -> Self {
        Self {
            name: name.into(),
            source,
            output,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({} -> {})", self.name, self.source, self.output)
    }
}

/// How many output entries may derive the same source identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSemantics {
    /// One output entry per source identity
    Unique,
    /// Several output entries may share a source identity (e.g. taus
    /// pointing to the same vertex). Forward lookup returns the first.
    Shared,
}

/// Handle to a map, issued by [`IdentityRegistry::register`]
///
/// Handles are scoped to the issuing registry. Presented to another registry
/// (e.g. the merged one after the barrier) they are re-resolved by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapHandle {
    slot: usize,
    key: MapKey,
}

impl MapHandle {
    pub fn key(&self) -> &MapKey {
        &self.key
    }
}

/// Bidirectional association between source identities and output entries
#[derive(Debug, Clone)]
pub struct IdentityMap {
    key: MapKey,
    semantics: MapSemantics,
    forward: HashMap<SourceId, Vec<OutputRef>>,
    /// output index -> source identity
    backward: BTreeMap<u32, SourceId>,
}

impl IdentityMap {
    fn new(key: MapKey, semantics: MapSemantics) -> Self {
        Self {
            key,
            semantics,
            forward: HashMap::new(),
            backward: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &MapKey {
        &self.key
    }

    pub fn semantics(&self) -> MapSemantics {
        self.semantics
    }

    pub fn len(&self) -> usize {
        self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backward.is_empty()
    }

    fn insert(&mut self, identity: SourceId, output: OutputRef) -> Result<()> {
        if identity.kind() != self.key.source {
            return Err(SkimError::kind_mismatch(self.key.source, identity.kind()));
        }
        if output.kind != self.key.output {
            return Err(SkimError::kind_mismatch(self.key.output, output.kind));
        }

        let existing = self.forward.get(&identity);
        let duplicate_source = match self.semantics {
            MapSemantics::Unique => existing.is_some(),
            MapSemantics::Shared => existing.is_some_and(|outs| outs.contains(&output)),
        };
        if duplicate_source {
            return Err(SkimError::DuplicateSource {
                map: self.key.clone(),
                identity,
            });
        }
        if self.backward.contains_key(&output.index) {
            return Err(SkimError::DuplicateOutput {
                map: self.key.clone(),
                output,
            });
        }

        self.forward.entry(identity).or_default().push(output);
        self.backward.insert(output.index, identity);
        Ok(())
    }

    pub fn lookup_forward(&self, identity: &SourceId) -> Option<OutputRef> {
        self.forward
            .get(identity)
            .and_then(|outs| outs.first())
            .copied()
    }

    /// Every output entry derived from `identity`, in registration order
    pub fn lookup_forward_all(&self, identity: &SourceId) -> &[OutputRef] {
        self.forward
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lookup_backward(&self, output: &OutputRef) -> Option<SourceId> {
        if output.kind != self.key.output {
            return None;
        }
        self.backward.get(&output.index).copied()
    }

    /// `(output entry, source identity)` pairs in output index order
    pub fn iter_backward(&self) -> BackwardIter<'_> {
        BackwardIter {
            kind: self.key.output,
            inner: self.backward.iter(),
        }
    }

    fn remap(&mut self, perm: &Permutation) -> Result<()> {
        let sorted = |index: u32| -> Result<u32> {
            perm.sorted_index(index as usize)
                .map(|i| i as u32)
                .ok_or_else(|| {
                    SkimError::InvalidPermutation(format!(
                        "map {} holds entry {} beyond permutation length {}",
                        self.key,
                        index,
                        perm.len()
                    ))
                })
        };

        let mut backward = BTreeMap::new();
        for (&index, &identity) in &self.backward {
            backward.insert(sorted(index)?, identity);
        }
        let mut forward = HashMap::with_capacity(self.forward.len());
        for (&identity, outs) in &self.forward {
            let remapped = outs
                .iter()
                .map(|out| sorted(out.index).map(|i| OutputRef::new(out.kind, i)))
                .collect::<Result<Vec<_>>>()?;
            forward.insert(identity, remapped);
        }

        self.forward = forward;
        self.backward = backward;
        Ok(())
    }
}

/// Lazy backward iteration over an [`IdentityMap`]
pub struct BackwardIter<'a> {
    kind: OutputKind,
    inner: std::collections::btree_map::Iter<'a, u32, SourceId>,
}

impl Iterator for BackwardIter<'_> {
    type Item = (OutputRef, SourceId);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(&index, &identity)| (OutputRef::new(self.kind, index), identity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Per-event registry of identity maps
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    maps: Vec<IdentityMap>,
    slots: HashMap<MapKey, usize>,
    sealed: bool,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the map for `(name, source, output)` or return the existing one.
    ///
    /// Registering the same key twice with the same semantics is a no-op;
    /// with different semantics it fails with `DuplicateMap`.
    pub fn register(
        &mut self,
        name: &str,
        source: SourceKind,
        output: OutputKind,
        semantics: MapSemantics,
    ) -> Result<MapHandle> {
        if self.sealed {
            return Err(SkimError::Sealed("register"));
        }
        let key = MapKey::new(name, source, output);
        if let Some(&slot) = self.slots.get(&key) {
            if self.maps[slot].semantics != semantics {
                return Err(SkimError::DuplicateMap(key));
            }
            return Ok(MapHandle { slot, key });
        }

        let slot = self.maps.len();
        self.maps.push(IdentityMap::new(key.clone(), semantics));
        self.slots.insert(key.clone(), slot);
        tracing::trace!("Registered identity map {}", key);
        Ok(MapHandle { slot, key })
    }

    /// Handle of an already registered map
    pub fn handle(&self, name: &str, source: SourceKind, output: OutputKind) -> Result<MapHandle> {
        let key = MapKey::new(name, source, output);
        match self.slots.get(&key) {
            Some(&slot) => Ok(MapHandle { slot, key }),
            None => Err(SkimError::UnregisteredMap(key)),
        }
    }

    pub fn contains(&self, key: &MapKey) -> bool {
        self.slots.contains_key(key)
    }

    fn slot_of(&self, handle: &MapHandle) -> Result<usize> {
        match self.maps.get(handle.slot) {
            Some(map) if map.key == handle.key => Ok(handle.slot),
            _ => self
                .slots
                .get(&handle.key)
                .copied()
                .ok_or_else(|| SkimError::UnregisteredMap(handle.key.clone())),
        }
    }

    pub fn map(&self, handle: &MapHandle) -> Result<&IdentityMap> {
        let slot = self.slot_of(handle)?;
        Ok(&self.maps[slot])
    }

    /// Associate `identity` with `output`.
    ///
    /// A duplicate forward insertion fails with `DuplicateSource` and leaves
    /// the first association untouched.
    pub fn add(&mut self, handle: &MapHandle, identity: SourceId, output: OutputRef) -> Result<()> {
        if self.sealed {
            return Err(SkimError::Sealed("add"));
        }
        let slot = self.slot_of(handle)?;
        self.maps[slot].insert(identity, output)
    }

    pub fn lookup_forward(&self, handle: &MapHandle, identity: &SourceId) -> Result<Option<OutputRef>> {
        Ok(self.map(handle)?.lookup_forward(identity))
    }

    pub fn iter_backward(&self, handle: &MapHandle) -> Result<BackwardIter<'_>> {
        Ok(self.map(handle)?.iter_backward())
    }

    /// Rewrite every map whose entries live in `output` from fill order to
    /// sorted order
    pub fn remap_outputs(&mut self, output: OutputKind, perm: &Permutation) -> Result<()> {
        if self.sealed {
            return Err(SkimError::Sealed("remap"));
        }
        for map in self.maps.iter_mut().filter(|m| m.key.output == output) {
            map.remap(perm)?;
        }
        Ok(())
    }

    /// Absorb the maps of another fragment.
    ///
    /// Two fragments owning the same key is a wiring error (`DuplicateMap`).
    pub fn merge(&mut self, other: IdentityRegistry) -> Result<()> {
        if self.sealed {
            return Err(SkimError::Sealed("merge"));
        }
        if let Some(clash) = other.maps.iter().find(|m| self.slots.contains_key(&m.key)) {
            return Err(SkimError::DuplicateMap(clash.key.clone()));
        }
        for map in other.maps {
            let slot = self.maps.len();
            self.slots.insert(map.key.clone(), slot);
            self.maps.push(map);
        }
        Ok(())
    }

    /// Make the registry read-only
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.maps.iter().map(|m| &m.key)
    }
}
