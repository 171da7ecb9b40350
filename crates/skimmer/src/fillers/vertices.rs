use skimmer_core::{
    names,
    types::{OutputEvent, RecoVertex, SourceKind, VertexRecord},
    Collection, Filler, IdentityRegistry, Result, Selection, SourceAccessor, VerticesConfig,
};
use skimmer_projector::ProjectionEngine;

pub const COMPONENT: &str = "vertices";

/// Primary vertices, kept in source order
pub struct VerticesFiller {
    config: VerticesConfig,
    out: Collection<RecoVertex>,
}

impl VerticesFiller {
    pub fn new(config: VerticesConfig) -> Self {
        Self {
            config,
            out: Collection::new(),
        }
    }

    pub fn config(&self) -> &VerticesConfig {
        &self.config
    }

    fn accepts(&self, vertex: &VertexRecord) -> bool {
        if self.config.exclude_fake && vertex.is_fake {
            return false;
        }
        if self.config.min_ndof >= 0.0 && vertex.ndof < self.config.min_ndof {
            return false;
        }
        if self.config.max_abs_z >= 0.0 && vertex.z.abs() > self.config.max_abs_z {
            return false;
        }
        true
    }
}

impl Filler for VerticesFiller {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn fill(&mut self, source: &dyn SourceAccessor, maps: &mut IdentityRegistry) -> Result<()> {
        let records = source.vertices(&self.config.source)?;
        let mut engine = ProjectionEngine::<RecoVertex>::new(
            COMPONENT,
            maps,
            names::VERTICES,
            SourceKind::Vertex,
            Selection::default(),
        )?;

        for (id, vertex) in records.iter() {
            let selected = self.accepts(vertex);
            engine.project_if(id, vertex, selected, |v, out| {
                out.x = v.x;
                out.y = v.y;
                out.z = v.z;
                out.ndof = v.ndof;
                out.chi2 = v.chi2;
                out.n_tracks = v.n_tracks;
                Ok(())
            })?;
        }

        self.out = engine.finish_unsorted().entries;
        Ok(())
    }

    fn finalize(&mut self, out: &mut OutputEvent) {
        out.vertices = std::mem::take(&mut self.out);
    }

    fn reset(&mut self) {
        self.out.clear();
    }
}
