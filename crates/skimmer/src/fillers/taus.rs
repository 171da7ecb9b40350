use super::truth_candidates;
use skimmer_core::{
    geometry::first_match_within,
    link, names,
    types::{
        Constituent, OutputEvent, OutputKind, PatTauFields, SourceKind, Tau, TauExt, TauRecord,
    },
    Collection, Filler, IdentityRegistry, MapSemantics, Result, SkimError, SourceAccessor,
    TausConfig,
};
use skimmer_projector::{passes_discriminator, sum_over, ProjectionEngine};

pub const COMPONENT: &str = "taus";

/// Hadronic taus, sorted by descending pt
///
/// Each tau points to the vertex of its leading charged hadron and, on
/// simulation, to the first generator tau within `gen_match_dr`.
pub struct TausFiller {
    config: TausConfig,
    out: Collection<Tau>,
    matched_gen: bool,
}

impl TausFiller {
    pub fn new(config: TausConfig) -> Self {
        Self {
            config,
            out: Collection::new(),
            matched_gen: false,
        }
    }

    pub fn config(&self) -> &TausConfig {
        &self.config
    }
}

fn discriminator(pat: &PatTauFields, name: &str) -> Result<f64> {
    pat.tau_id(name)
        .ok_or_else(|| SkimError::MissingDiscriminator(name.to_string()))
}

fn project_tau(config: &TausConfig, rec: &TauRecord, out: &mut Tau) -> Result<()> {
    out.p4 = rec.p4;
    out.charge = rec.charge;

    if let TauExt::Pat(pat) = &rec.ext {
        let ids = &config.discriminators;
        out.decay_mode = passes_discriminator(discriminator(pat, &ids.decay_mode)?);
        out.decay_mode_new = passes_discriminator(discriminator(pat, &ids.decay_mode_new)?);
        out.loose_iso_mva = passes_discriminator(discriminator(pat, &ids.loose_iso_mva)?);
        out.loose_iso_mva_old = passes_discriminator(discriminator(pat, &ids.loose_iso_mva_old)?);
        out.iso_delta_beta_corr = discriminator(pat, &ids.iso_delta_beta_corr)?;

        if config.fill_isolation {
            out.iso = sum_over(
                [
                    pat.isolation_gamma.as_deref(),
                    pat.isolation_charged_hadrons.as_deref(),
                    pat.isolation_neutral_hadrons.as_deref(),
                ],
                Constituent::pt,
            );
        }
    }
    Ok(())
}

impl Filler for TausFiller {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn fill(&mut self, source: &dyn SourceAccessor, maps: &mut IdentityRegistry) -> Result<()> {
        let config = &self.config;
        let records = source.taus(&config.source)?;

        let match_gen = config.match_gen && !source.is_real_data();
        let candidates = if match_gen {
            truth_candidates(source, &config.gen_source, config.gen_pdg_id)?
        } else {
            Vec::new()
        };

        let mut engine = ProjectionEngine::<Tau>::new(
            COMPONENT,
            maps,
            names::TAUS,
            SourceKind::Tau,
            config.selection,
        )?;
        let to_vertex =
            engine.side_map(names::TAU_TO_VERTEX, SourceKind::Vertex, MapSemantics::Shared)?;
        let to_gen =
            engine.side_map(names::TAU_TO_GEN, SourceKind::GenParticle, MapSemantics::Shared)?;

        for (id, tau) in records.iter() {
            let Some(entry) = engine.project(id, tau, |rec, out| project_tau(config, rec, out))?
            else {
                continue;
            };

            if let TauExt::Pat(pat) = &tau.ext {
                let vertex = pat
                    .lead_charged_hadron
                    .as_ref()
                    .and_then(Constituent::vertex)
                    .and_then(|r| source.resolve_as(SourceKind::Vertex, r));
                if let Some(vertex) = vertex {
                    engine.associate(&to_vertex, vertex, entry)?;
                }
            }

            if match_gen {
                let found =
                    first_match_within(&tau.p4, &candidates, config.gen_match_dr, |(_, g)| g.p4);
                if let Some((gen, _)) = found {
                    engine.associate(&to_gen, *gen, entry)?;
                }
            }
        }

        self.out = engine.finish_sorted()?.entries;
        self.matched_gen = match_gen;
        Ok(())
    }

    fn set_refs(&mut self, maps: &IdentityRegistry) -> Result<()> {
        let own = maps.handle(names::TAU_TO_VERTEX, SourceKind::Vertex, OutputKind::Tau)?;
        let vertices = maps.handle(names::VERTICES, SourceKind::Vertex, OutputKind::RecoVertex)?;
        link::resolve(maps, &own, &vertices, &mut self.out, |t| &mut t.vertex)?;

        if self.matched_gen {
            let own = maps.handle(names::TAU_TO_GEN, SourceKind::GenParticle, OutputKind::Tau)?;
            let gen = maps.handle(
                names::GEN_PARTICLES,
                SourceKind::GenParticle,
                OutputKind::GenParticle,
            )?;
            link::resolve(maps, &own, &gen, &mut self.out, |t| &mut t.matched_gen)?;
        }
        Ok(())
    }

    fn finalize(&mut self, out: &mut OutputEvent) {
        out.taus = std::mem::take(&mut self.out);
    }

    fn reset(&mut self) {
        self.out.clear();
        self.matched_gen = false;
    }
}
