use super::truth_candidates;
use skimmer_core::{
    geometry::first_match_within,
    link, names,
    types::{Muon, MuonExt, MuonRecord, OutputEvent, OutputKind, SourceKind},
    Collection, Filler, IdentityRegistry, MapSemantics, MuonsConfig, Result, SourceAccessor,
};
use skimmer_projector::{delta_beta_isolation, ProjectionEngine};

pub const COMPONENT: &str = "muons";

/// Muons, sorted by descending pt
pub struct MuonsFiller {
    config: MuonsConfig,
    out: Collection<Muon>,
    matched_gen: bool,
}

impl MuonsFiller {
    pub fn new(config: MuonsConfig) -> Self {
        Self {
            config,
            out: Collection::new(),
            matched_gen: false,
        }
    }

    pub fn config(&self) -> &MuonsConfig {
        &self.config
    }
}

fn project_muon(config: &MuonsConfig, rec: &MuonRecord, out: &mut Muon) {
    out.p4 = rec.p4;
    out.charge = rec.charge;
    out.global = rec.is_global;
    out.tracker = rec.is_tracker;
    out.pf = rec.is_pf;

    if let MuonExt::Pat {
        loose,
        medium,
        tight,
    } = rec.ext
    {
        out.loose = loose;
        out.medium = medium;
        out.tight = tight;
    }

    if let (true, Some(iso)) = (config.fill_isolation, rec.isolation) {
        out.ch_iso = iso.charged_hadron;
        out.nh_iso = iso.neutral_hadron;
        out.ph_iso = iso.photon;
        out.pu_iso = iso.pileup;
        out.comb_iso =
            delta_beta_isolation(iso.charged_hadron, iso.neutral_hadron, iso.photon, iso.pileup);
    }
}

impl Filler for MuonsFiller {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn fill(&mut self, source: &dyn SourceAccessor, maps: &mut IdentityRegistry) -> Result<()> {
        let config = &self.config;
        let records = source.muons(&config.source)?;

        let match_gen = config.match_gen && !source.is_real_data();
        let candidates = if match_gen {
            truth_candidates(source, &config.gen_source, config.gen_pdg_id)?
        } else {
            Vec::new()
        };

        let mut engine = ProjectionEngine::<Muon>::new(
            COMPONENT,
            maps,
            names::MUONS,
            SourceKind::Muon,
            config.selection,
        )?;
        let to_vertex =
            engine.side_map(names::MUON_TO_VERTEX, SourceKind::Vertex, MapSemantics::Shared)?;
        let to_gen =
            engine.side_map(names::MUON_TO_GEN, SourceKind::GenParticle, MapSemantics::Shared)?;

        for (id, muon) in records.iter() {
            let projected = engine.project(id, muon, |rec, out| {
                project_muon(config, rec, out);
                Ok(())
            })?;
            let Some(entry) = projected else {
                continue;
            };

            let vertex = muon
                .vertex
                .as_ref()
                .and_then(|r| source.resolve_as(SourceKind::Vertex, r));
            if let Some(vertex) = vertex {
                engine.associate(&to_vertex, vertex, entry)?;
            }

            if match_gen {
                let found =
                    first_match_within(&muon.p4, &candidates, config.gen_match_dr, |(_, g)| g.p4);
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
        let own = maps.handle(names::MUON_TO_VERTEX, SourceKind::Vertex, OutputKind::Muon)?;
        let vertices = maps.handle(names::VERTICES, SourceKind::Vertex, OutputKind::RecoVertex)?;
        link::resolve(maps, &own, &vertices, &mut self.out, |m| &mut m.vertex)?;

        if self.matched_gen {
            let own = maps.handle(names::MUON_TO_GEN, SourceKind::GenParticle, OutputKind::Muon)?;
            let gen = maps.handle(
                names::GEN_PARTICLES,
                SourceKind::GenParticle,
                OutputKind::GenParticle,
            )?;
            link::resolve(maps, &own, &gen, &mut self.out, |m| &mut m.matched_gen)?;
        }
        Ok(())
    }

    fn finalize(&mut self, out: &mut OutputEvent) {
        out.muons = std::mem::take(&mut self.out);
    }

    fn reset(&mut self) {
        self.out.clear();
        self.matched_gen = false;
    }
}
