use skimmer_core::{
    link, names,
    types::{GenParticle, OutputEvent, OutputKind, SourceKind},
    Collection, Filler, GenParticlesConfig, IdentityRegistry, MapSemantics, Result,
    SourceAccessor,
};
use skimmer_projector::ProjectionEngine;

pub const COMPONENT: &str = "gen_particles";

/// Generator-level particles, kept in source order
///
/// On real data no records are read, but the maps are still registered so
/// that truth links from other components resolve to nothing instead of
/// failing.
pub struct GenParticlesFiller {
    config: GenParticlesConfig,
    out: Collection<GenParticle>,
}

impl GenParticlesFiller {
    pub fn new(config: GenParticlesConfig) -> Self {
        Self {
            config,
            out: Collection::new(),
        }
    }

    pub fn config(&self) -> &GenParticlesConfig {
        &self.config
    }
}

impl Filler for GenParticlesFiller {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn fill(&mut self, source: &dyn SourceAccessor, maps: &mut IdentityRegistry) -> Result<()> {
        let config = &self.config;
        let mut engine = ProjectionEngine::<GenParticle>::new(
            COMPONENT,
            maps,
            names::GEN_PARTICLES,
            SourceKind::GenParticle,
            config.selection,
        )?;
        let parents =
            engine.side_map(names::GEN_PARENTS, SourceKind::GenParticle, MapSemantics::Shared)?;

        if !source.is_real_data() {
            let records = source.gen_particles(&config.source)?;
            for (id, gen) in records.iter() {
                let selected = config.selection.passes(&gen.p4)
                    && (!config.last_copy_only || gen.last_copy);
                let entry = engine.project_if(id, gen, selected, |g, out| {
                    out.p4 = g.p4;
                    out.pdg_id = g.pdg_id;
                    out.status = g.status;
                    out.last_copy = g.last_copy;
                    Ok(())
                })?;

                let mother = gen
                    .mother
                    .as_ref()
                    .and_then(|m| source.resolve_as(SourceKind::GenParticle, m));
                if let (Some(entry), Some(mother)) = (entry, mother) {
                    engine.associate(&parents, mother, entry)?;
                }
            }
        }

        self.out = engine.finish_unsorted().entries;
        Ok(())
    }

    fn set_refs(&mut self, maps: &IdentityRegistry) -> Result<()> {
        let own = maps.handle(names::GEN_PARENTS, SourceKind::GenParticle, OutputKind::GenParticle)?;
        let target =
            maps.handle(names::GEN_PARTICLES, SourceKind::GenParticle, OutputKind::GenParticle)?;
        link::resolve(maps, &own, &target, &mut self.out, |g| &mut g.parent)?;
        Ok(())
    }

    fn finalize(&mut self, out: &mut OutputEvent) {
        out.gen_particles = std::mem::take(&mut self.out);
    }

    fn reset(&mut self) {
        self.out.clear();
    }
}
