//! Link phase: deferred cross-collection reference resolution
//!
//! A component records, during its fill phase, which derived identity each
//! of its output entries points to (its own backward map). After the barrier
//! every such identity is looked up in the target component's forward map;
//! hits become references, misses stay unset.

use crate::error::{Result, SkimError};
use crate::registry::{IdentityRegistry, MapHandle};
use crate::reorder::Collection;
use crate::types::{OutputEntry, Ref};

/// Outcome of resolving one reference field over a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub resolved: usize,
    pub unresolved: usize,
}

impl LinkStats {
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved
    }
}

/// Resolve one reference field of every entry in `entries`.
///
/// `own` maps entries of `entries` to the identity they should point to;
/// `target` is the forward map of the collection the field points into.
/// Entries whose identity is absent from `target` keep an unset reference.
pub fn resolve<T, U, F>(
    maps: &IdentityRegistry,
    own: &MapHandle,
    target: &MapHandle,
    entries: &mut Collection<T>,
    field: F,
) -> Result<LinkStats>
where
    T: OutputEntry,
    U: OutputEntry,
    F: Fn(&mut T) -> &mut Ref<U>,
{
    let own_map = maps.map(own)?;
    let target_map = maps.map(target)?;

    if own_map.key().output != T::KIND {
        return Err(SkimError::kind_mismatch(T::KIND, own_map.key().output));
    }
    if target_map.key().output != U::KIND {
        return Err(SkimError::kind_mismatch(U::KIND, target_map.key().output));
    }
    if own_map.key().source != target_map.key().source {
        return Err(SkimError::kind_mismatch(
            target_map.key().source,
            own_map.key().source,
        ));
    }

    let mut stats = LinkStats::default();
    for (output, identity) in own_map.iter_backward() {
        let entry = entries
            .get_mut(output.index as usize)
            .ok_or(SkimError::DanglingOutput(output))?;
        match target_map.lookup_forward(&identity) {
            Some(found) => {
                field(entry).set(found)?;
                stats.resolved += 1;
            }
            None => {
                tracing::trace!(
                    "No entry in {} for {} (from {})",
                    target_map.key(),
                    identity,
                    output
                );
                stats.unresolved += 1;
            }
        }
    }

    tracing::debug!(
        "Linked {} -> {}: {} resolved, {} unresolved",
        own_map.key(),
        target_map.key(),
        stats.resolved,
        stats.unresolved
    );
    crate::observe::record_links(&own_map.key().name, stats.resolved, stats.unresolved);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MapSemantics;
    use crate::types::{CollectionId, OutputKind, OutputRef, SourceId, SourceKind, Tau};

    fn vertex(i: u32) -> SourceId {
        SourceId::new(SourceKind::Vertex, CollectionId(0), i)
    }

    fn setup() -> (IdentityRegistry, MapHandle, MapHandle) {
        let mut reg = IdentityRegistry::new();
        let vertices = reg
            .register("vertices", SourceKind::Vertex, OutputKind::RecoVertex, MapSemantics::Unique)
            .unwrap();
        let tau_to_vertex = reg
            .register("tauToVertex", SourceKind::Vertex, OutputKind::Tau, MapSemantics::Shared)
            .unwrap();

        // vertex 0 -> output 0, vertex 2 -> output 1; vertex 1 was not kept
        reg.add(&vertices, vertex(0), OutputRef::new(OutputKind::RecoVertex, 0))
            .unwrap();
        reg.add(&vertices, vertex(2), OutputRef::new(OutputKind::RecoVertex, 1))
            .unwrap();

        reg.add(&tau_to_vertex, vertex(2), OutputRef::new(OutputKind::Tau, 0))
            .unwrap();
        reg.add(&tau_to_vertex, vertex(1), OutputRef::new(OutputKind::Tau, 1))
            .unwrap();
        reg.add(&tau_to_vertex, vertex(0), OutputRef::new(OutputKind::Tau, 2))
            .unwrap();
        reg.seal();
        (reg, tau_to_vertex, vertices)
    }

    #[test]
    fn test_resolve_sets_hits_and_leaves_misses_unset() {
        let (reg, own, target) = setup();
        let mut taus: Collection<Tau> = Collection::new();
        for _ in 0..4 {
            taus.create_back();
        }

        let stats = resolve(&reg, &own, &target, &mut taus, |t| &mut t.vertex).unwrap();
        assert_eq!(stats, LinkStats { resolved: 2, unresolved: 1 });

        assert_eq!(taus[0].vertex.index(), Some(1));
        assert!(!taus[1].vertex.is_set());
        assert_eq!(taus[2].vertex.index(), Some(0));
        // no association at all
        assert!(!taus[3].vertex.is_set());
    }

    #[test]
    fn test_resolve_rejects_wrong_target_kind() {
        let (reg, own, _) = setup();
        let mut taus: Collection<Tau> = Collection::new();
        taus.create_back();
        // a map into taus can never back a Ref<RecoVertex>
        let err = resolve(&reg, &own, &own, &mut taus, |t| &mut t.vertex).unwrap_err();
        assert!(matches!(err, SkimError::KindMismatch { .. }));
        assert!(!taus[0].vertex.is_set());
    }

    #[test]
    fn test_resolve_dangling_output() {
        let (reg, own, target) = setup();
        let mut taus: Collection<Tau> = Collection::new();
        taus.create_back();
        let err = resolve(&reg, &own, &target, &mut taus, |t| &mut t.vertex).unwrap_err();
        assert!(matches!(err, SkimError::DanglingOutput(_)));
    }

    #[test]
    fn test_unregistered_target_is_error() {
        let (reg, _, _) = setup();
        let missing = reg.handle("genParticles", SourceKind::GenParticle, OutputKind::GenParticle);
        assert!(matches!(missing, Err(SkimError::UnregisteredMap(_))));
    }
}
