use skimmer_core::{
    observe,
    types::{Kinematic, OutputEntry, OutputRef, SourceId, SourceKind},
    Collection, IdentityRegistry, MapHandle, MapSemantics, Permutation, Result, Selection,
};

/// Selection outcome of one fill phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub seen: usize,
    pub selected: usize,
    pub dropped: usize,
}

/// Result of a completed fill phase
#[derive(Debug)]
pub struct Filled<T> {
    pub entries: Collection<T>,
    /// Fill order -> final order
    pub permutation: Permutation,
    /// Final index -> position of the originating record in its source collection
    pub source_positions: Vec<usize>,
    pub stats: FillStats,
}

impl<T> Filled<T> {
    /// Final index of the entry made from source record `position`, if it
    /// passed selection
    pub fn sorted_position_of_source(&self, position: usize) -> Option<usize> {
        self.source_positions.iter().position(|&p| p == position)
    }
}

/// Selection, projection and identity registration for one component
///
/// Every record that passes selection becomes exactly one output entry and
/// is registered immediately, keyed by its fill-order index, in the
/// component's object map. Side associations registered through
/// [`ProjectionEngine::associate`] are keyed the same way. Finishing the
/// engine sorts (or keeps) the collection and remaps every map of this
/// output kind so that the registry refers to final positions.
pub struct ProjectionEngine<'r, T: OutputEntry> {
    component: String,
    selection: Selection,
    registry: &'r mut IdentityRegistry,
    objects: MapHandle,
    entries: Collection<T>,
    positions: Vec<usize>,
    stats: FillStats,
}

impl<'r, T: OutputEntry> ProjectionEngine<'r, T> {
    /// Start a fill phase, registering the component's object map
    /// `map_name: source -> T`
    pub fn new(
        component: &str,
        registry: &'r mut IdentityRegistry,
        map_name: &str,
        source: SourceKind,
        selection: Selection,
    ) -> Result<Self> {
        let objects = registry.register(map_name, source, T::KIND, MapSemantics::Unique)?;
        Ok(Self {
            component: component.to_string(),
            selection,
            registry,
            objects,
            entries: Collection::new(),
            positions: Vec::new(),
            stats: FillStats::default(),
        })
    }

    pub fn objects(&self) -> &MapHandle {
        &self.objects
    }

    pub fn entries(&self) -> &Collection<T> {
        &self.entries
    }

    /// Register a side map `name: source -> T` for derived identities
    pub fn side_map(
        &mut self,
        name: &str,
        source: SourceKind,
        semantics: MapSemantics,
    ) -> Result<MapHandle> {
        self.registry.register(name, source, T::KIND, semantics)
    }

    /// Apply the kinematic selection to `record` and project it on success.
    ///
    /// Returns the fill-order reference of the new entry, or `None` when the
    /// record was dropped.
    pub fn project<S, F>(&mut self, identity: SourceId, record: &S, f: F) -> Result<Option<OutputRef>>
    where
        S: Kinematic,
        F: FnOnce(&S, &mut T) -> Result<()>,
    {
        let selected = self.selection.passes(record.p4());
        self.project_if(identity, record, selected, f)
    }

    /// Project `record` if `selected` holds, bypassing the kinematic selection
    pub fn project_if<S, F>(
        &mut self,
        identity: SourceId,
        record: &S,
        selected: bool,
        f: F,
    ) -> Result<Option<OutputRef>>
    where
        F: FnOnce(&S, &mut T) -> Result<()>,
    {
        self.stats.seen += 1;
        if !selected {
            self.stats.dropped += 1;
            return Ok(None);
        }

        let output = OutputRef::new(T::KIND, self.entries.len() as u32);
        f(record, self.entries.create_back())?;
        self.registry.add(&self.objects, identity, output)?;
        self.positions.push(identity.index() as usize);
        self.stats.selected += 1;
        Ok(Some(output))
    }

    /// Associate a derived identity with an entry created by this engine
    pub fn associate(&mut self, handle: &MapHandle, identity: SourceId, entry: OutputRef) -> Result<()> {
        self.registry.add(handle, identity, entry)
    }

    /// Sort by descending pt and remap every map of this output kind
    pub fn finish_sorted(self) -> Result<Filled<T>>
    where
        T: Kinematic,
    {
        let Self {
            component,
            registry,
            mut entries,
            positions,
            stats,
            ..
        } = self;

        let permutation = entries.sort_desc_by(|e| e.pt());
        registry.remap_outputs(T::KIND, &permutation)?;
        let source_positions = permutation.apply(positions)?;

        Ok(Self::report(component, entries, permutation, source_positions, stats))
    }

    /// Keep fill order; the permutation is the identity
    pub fn finish_unsorted(self) -> Filled<T> {
        let permutation = Permutation::identity(self.entries.len());
        Self::report(
            self.component,
            self.entries,
            permutation,
            self.positions,
            self.stats,
        )
    }

    fn report(
        component: String,
        entries: Collection<T>,
        permutation: Permutation,
        source_positions: Vec<usize>,
        stats: FillStats,
    ) -> Filled<T> {
        tracing::debug!(
            "Filled {}: {} of {} records selected",
            component,
            stats.selected,
            stats.seen
        );
        observe::record_fill(&component, stats.selected, stats.dropped);
        Filled {
            entries,
            permutation,
            source_positions,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::types::{CollectionId, Momentum, Tau};
    use skimmer_core::SkimError;

    fn tau_record(pt: f64) -> Momentum {
        Momentum::new(pt, 0.0, 0.0, 1.777)
    }

    fn tau_id(i: u32) -> SourceId {
        SourceId::new(SourceKind::Tau, CollectionId(0), i)
    }

    fn fill(pts: &[f64], selection: Selection, registry: &mut IdentityRegistry) -> Filled<Tau> {
        let mut engine =
            ProjectionEngine::<Tau>::new("taus", registry, "taus", SourceKind::Tau, selection)
                .unwrap();
        for (i, &pt) in pts.iter().enumerate() {
            engine
                .project(tau_id(i as u32), &tau_record(pt), |rec, out| {
                    out.p4 = *rec;
                    Ok(())
                })
                .unwrap();
        }
        engine.finish_sorted().unwrap()
    }

    #[test]
    fn test_select_sort_and_permute() {
        let mut registry = IdentityRegistry::new();
        let filled = fill(
            &[10.0, 50.0, 30.0],
            Selection::new().with_min_pt(20.0),
            &mut registry,
        );

        assert_eq!(filled.entries.len(), 2);
        let pts: Vec<f64> = filled.entries.iter().map(|t| t.p4.pt).collect();
        assert_eq!(pts, vec![50.0, 30.0]);

        assert_eq!(filled.sorted_position_of_source(1), Some(0));
        assert_eq!(filled.sorted_position_of_source(2), Some(1));
        assert_eq!(filled.sorted_position_of_source(0), None);
        assert_eq!(
            filled.stats,
            FillStats {
                seen: 3,
                selected: 2,
                dropped: 1
            }
        );
        assert_eq!(filled.permutation.len(), 2);
    }

    #[test]
    fn test_registry_follows_sort() {
        let mut registry = IdentityRegistry::new();
        let filled = fill(&[5.0, 40.0, 40.0, 20.0], Selection::new(), &mut registry);

        let h = registry
            .handle("taus", SourceKind::Tau, skimmer_core::OutputKind::Tau)
            .unwrap();
        for (i, entry) in filled.entries.iter().enumerate() {
            let source = filled.source_positions[i];
            let out = registry.lookup_forward(&h, &tau_id(source as u32)).unwrap();
            assert_eq!(out.map(|o| o.index as usize), Some(i));
            assert_eq!(entry.p4.pt, [5.0, 40.0, 40.0, 20.0][source]);
        }
        // equal pt keeps source order
        assert_eq!(filled.source_positions, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_side_map_is_remapped() {
        let mut registry = IdentityRegistry::new();
        let vertex = SourceId::new(SourceKind::Vertex, CollectionId(1), 0);
        {
            let mut engine = ProjectionEngine::<Tau>::new(
                "taus",
                &mut registry,
                "taus",
                SourceKind::Tau,
                Selection::new(),
            )
            .unwrap();
            let side = engine
                .side_map("tauToVertex", SourceKind::Vertex, MapSemantics::Shared)
                .unwrap();
            engine
                .project(tau_id(0), &tau_record(10.0), |_, _| Ok(()))
                .unwrap();
            let second = engine
                .project(tau_id(1), &tau_record(90.0), |rec, out| {
                    out.p4 = *rec;
                    Ok(())
                })
                .unwrap()
                .unwrap();
            assert_eq!(second.index, 1);
            engine.associate(&side, vertex, second).unwrap();
            engine.finish_sorted().unwrap();
        }

        let side = registry
            .handle("tauToVertex", SourceKind::Vertex, skimmer_core::OutputKind::Tau)
            .unwrap();
        let back: Vec<_> = registry.iter_backward(&side).unwrap().collect();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].0.index, 0);
        assert_eq!(back[0].1, vertex);
    }

    #[test]
    fn test_projection_error_propagates() {
        let mut registry = IdentityRegistry::new();
        let mut engine = ProjectionEngine::<Tau>::new(
            "taus",
            &mut registry,
            "taus",
            SourceKind::Tau,
            Selection::new(),
        )
        .unwrap();
        let err = engine
            .project(tau_id(0), &tau_record(10.0), |_, _| {
                Err(SkimError::MissingDiscriminator("decayModeFinding".into()))
            })
            .unwrap_err();
        assert!(matches!(err, SkimError::MissingDiscriminator(_)));
    }

    #[test]
    fn test_unsorted_keeps_fill_order() {
        let mut registry = IdentityRegistry::new();
        let mut engine = ProjectionEngine::<Tau>::new(
            "taus",
            &mut registry,
            "taus",
            SourceKind::Tau,
            Selection::new(),
        )
        .unwrap();
        for (i, pt) in [1.0, 3.0, 2.0].into_iter().enumerate() {
            engine
                .project_if(tau_id(i as u32), &tau_record(pt), i != 1, |rec, out| {
                    out.p4 = *rec;
                    Ok(())
                })
                .unwrap();
        }
        let filled = engine.finish_unsorted();
        assert!(filled.permutation.is_identity());
        assert_eq!(filled.source_positions, vec![0, 2]);
        assert_eq!(filled.stats.dropped, 1);
    }
}
