use skimmer::prelude::*;
use skimmer_core::types::{
    Constituent, GenRecord, Momentum, MuonRecord, PatTauFields, RecordRef, TauExt, TauRecord,
    VertexRecord,
};
use std::collections::BTreeMap;
use std::io::Write;

const DISCRIMINATORS: [&str; 5] = [
    "decayModeFinding",
    "decayModeFindingNewDMs",
    "byVLooseIsolationMVArun2v1DBnewDMwLT",
    "byVLooseIsolationMVArun2v1DBoldDMwLT",
    "byCombinedIsolationDeltaBetaCorrRaw3Hits",
];

fn vertex(z: f64, is_fake: bool) -> VertexRecord {
    VertexRecord {
        z,
        ndof: 4.0,
        n_tracks: 12,
        is_fake,
        ..Default::default()
    }
}

fn gen(pdg_id: i32, pt: f64, eta: f64, phi: f64, mother: Option<u32>) -> GenRecord {
    GenRecord {
        p4: Momentum::new(pt, eta, phi, 0.0),
        pdg_id,
        status: 2,
        last_copy: true,
        mother: mother.map(|i| RecordRef::new("genParticles", i)),
    }
}

fn tau(pt: f64, eta: f64, phi: f64, vertex: Option<u32>) -> TauRecord {
    let tau_ids: BTreeMap<String, f64> =
        DISCRIMINATORS.iter().map(|name| (name.to_string(), 1.0)).collect();
    TauRecord {
        p4: Momentum::new(pt, eta, phi, 1.777),
        charge: -1,
        ext: TauExt::Pat(PatTauFields {
            tau_ids,
            isolation_gamma: Some(vec![Constituent::Generic { pt: 0.5 }]),
            isolation_charged_hadrons: None,
            isolation_neutral_hadrons: None,
            lead_charged_hadron: Some(Constituent::Packed {
                pt: pt * 0.6,
                vertex: vertex.map(|i| RecordRef::new("vertices", i)),
            }),
        }),
    }
}

fn muon(pt: f64, eta: f64, phi: f64, vertex: Option<u32>) -> MuonRecord {
    MuonRecord {
        p4: Momentum::new(pt, eta, phi, 0.105),
        charge: 1,
        is_global: true,
        vertex: vertex.map(|i| RecordRef::new("vertices", i)),
        ..Default::default()
    }
}

/// Simulated event:
/// - vertices: v0 (z=0), v1 (z=1), v2 (fake)
/// - gen: g0 tau, g1 tau, g2 muon whose mother is g0
/// - taus: t0 (pt 10), t1 (pt 50, near g0, vertex v1), t2 (pt 30, near g1, vertex v0)
/// - muons: m0 (near g2, vertex v1)
fn mc_event() -> InputEvent {
    InputEvent::new(EventKey {
        run: 1,
        lumi: 10,
        event: 100,
    })
    .with_collection(
        "vertices",
        SourceCollection::Vertices(vec![
            vertex(0.0, false),
            vertex(1.0, false),
            vertex(-2.0, true),
        ]),
    )
    .with_collection(
        "genParticles",
        SourceCollection::GenParticles(vec![
            gen(15, 49.0, 0.1, 0.1, None),
            gen(-15, 31.0, -1.0, 2.0, None),
            gen(13, 24.0, 0.5, -1.0, Some(0)),
        ]),
    )
    .with_collection(
        "taus",
        SourceCollection::Taus(vec![
            tau(10.0, 0.0, 0.0, Some(0)),
            tau(50.0, 0.1, 0.12, Some(1)),
            tau(30.0, -1.0, 2.05, Some(0)),
        ]),
    )
    .with_collection(
        "muons",
        SourceCollection::Muons(vec![muon(25.0, 0.5, -1.02, Some(1))]),
    )
}

fn config() -> SkimConfig {
    let mut config = SkimConfig::default();
    config.taus.selection = Selection::new().with_min_pt(20.0).with_max_eta(2.3);
    config.muons.selection = Selection::new().with_min_pt(20.0);
    config
}

#[test]
fn test_end_to_end_links() {
    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let out = pipeline.process(&mc_event()).unwrap();

    assert_eq!(out.key.event, 100);
    assert_eq!(out.vertices.len(), 3);
    assert_eq!(out.gen_particles.len(), 3);

    // t0 fails the pt cut; t1 and t2 are sorted by pt
    let pts: Vec<f64> = out.taus.iter().map(|t| t.p4.pt).collect();
    assert_eq!(pts, vec![50.0, 30.0]);

    assert_eq!(out.taus[0].vertex.index(), Some(1));
    assert_eq!(out.taus[1].vertex.index(), Some(0));
    assert_eq!(out.taus[0].matched_gen.index(), Some(0));
    assert_eq!(out.taus[1].matched_gen.index(), Some(1));
    assert!(out.taus[0].decay_mode);
    assert_eq!(out.taus[0].iso, 0.5);

    assert_eq!(out.muons.len(), 1);
    assert_eq!(out.muons[0].vertex.index(), Some(1));
    assert_eq!(out.muons[0].matched_gen.index(), Some(2));

    assert!(!out.gen_particles[0].parent.is_set());
    assert_eq!(out.gen_particles[2].parent.index(), Some(0));

    assert_eq!(
        pipeline.stats(),
        PipelineStats {
            events_processed: 1,
            events_failed: 0
        }
    );
}

#[test]
fn test_dropped_target_leaves_link_unset() {
    let mut config = config();
    // v1 (z = 1) no longer passes
    config.vertices.max_abs_z = 0.5;
    config.vertices.exclude_fake = true;
    let mut pipeline = EventPipeline::from_config(&config).unwrap();
    let out = pipeline.process(&mc_event()).unwrap();

    assert_eq!(out.vertices.len(), 1);
    assert!(!out.taus[0].vertex.is_set());
    assert_eq!(out.taus[1].vertex.index(), Some(0));
    assert!(!out.muons[0].vertex.is_set());

    let json = serde_json::to_value(&out).unwrap();
    assert!(json["taus"][0]["vertex"].is_null());
    assert_eq!(json["taus"][1]["vertex"], serde_json::json!(0));
}

#[test]
fn test_truth_match_respects_radius() {
    let mut config = config();
    config.taus.gen_match_dr = 0.01;
    let mut pipeline = EventPipeline::from_config(&config).unwrap();
    let out = pipeline.process(&mc_event()).unwrap();

    // t1 sits at dR 0.02 from g0
    assert!(!out.taus[0].matched_gen.is_set());
    assert!(!out.taus[1].matched_gen.is_set());
    assert_eq!(out.muons[0].matched_gen.index(), Some(2));
}

#[test]
fn test_real_data_skips_truth() {
    let mut event = mc_event().with_real_data(true);
    event.collections.retain(|c| c.label != "genParticles");

    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let out = pipeline.process(&event).unwrap();

    assert!(out.gen_particles.is_empty());
    assert_eq!(out.taus.len(), 2);
    assert!(out.taus.iter().all(|t| !t.matched_gen.is_set()));
    assert!(out.taus.iter().all(|t| t.vertex.is_set()));
    assert!(!out.muons[0].matched_gen.is_set());
}

#[test]
fn test_failed_event_leaves_pipeline_clean() {
    let mut bad = mc_event();
    if let SourceCollection::Taus(taus) = &mut bad.collections[2].records {
        if let TauExt::Pat(pat) = &mut taus[1].ext {
            pat.tau_ids.remove("decayModeFinding");
        }
    }

    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let err = pipeline.process(&bad).unwrap_err();
    assert!(matches!(err, SkimError::MissingDiscriminator(ref name) if name == "decayModeFinding"));

    let after = pipeline.process(&mc_event()).unwrap();
    let fresh = EventPipeline::from_config(&config())
        .unwrap()
        .process(&mc_event())
        .unwrap();
    assert_eq!(
        serde_json::to_value(&after).unwrap(),
        serde_json::to_value(&fresh).unwrap()
    );
    assert_eq!(
        pipeline.stats(),
        PipelineStats {
            events_processed: 1,
            events_failed: 1
        }
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let mut sequential = EventPipeline::from_config(&config()).unwrap();
    let mut parallel = EventPipeline::from_config(&config().with_parallel(true)).unwrap();
    assert!(parallel.is_parallel());

    for _ in 0..3 {
        let a = sequential.process(&mc_event()).unwrap();
        let b = parallel.process(&mc_event()).unwrap();
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
    }
}

#[test]
fn test_missing_vertices_component_rejected() {
    let mut config = config();
    config.vertices.enabled = false;
    let err = EventPipeline::from_config(&config).err().unwrap();
    assert!(matches!(err, SkimError::Config(_)));

    config.taus.enabled = false;
    config.muons.enabled = false;
    let pipeline = EventPipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.component_names(), vec!["gen_particles"]);
}

#[test]
fn test_gen_matching_without_gen_component_rejected() {
    let mut config = config();
    config.gen_particles.enabled = false;
    let err = EventPipeline::from_config(&config).err().unwrap();
    assert!(matches!(err, SkimError::Config(_)));

    config.taus.match_gen = false;
    config.muons.match_gen = false;
    let mut pipeline = EventPipeline::from_config(&config).unwrap();
    let out = pipeline.process(&mc_event()).unwrap();
    assert!(out.gen_particles.is_empty());
    assert_eq!(out.taus.len(), 2);
    assert!(out.taus.iter().all(|t| !t.matched_gen.is_set()));
}

#[test]
fn test_wrong_kind_reference_stays_unset() {
    let mut event = mc_event();
    for collection in &mut event.collections {
        match &mut collection.records {
            SourceCollection::GenParticles(gen) => {
                gen[2].mother = Some(RecordRef::new("vertices", 0));
            }
            SourceCollection::Taus(taus) => {
                if let TauExt::Pat(fields) = &mut taus[1].ext {
                    fields.lead_charged_hadron = Some(Constituent::Packed {
                        pt: 30.0,
                        vertex: Some(RecordRef::new("taus", 0)),
                    });
                }
            }
            _ => {}
        }
    }

    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let out = pipeline.process(&event).unwrap();

    assert_eq!(out.gen_particles.len(), 3);
    assert!(!out.gen_particles[2].parent.is_set());
    assert_eq!(out.taus.len(), 2);
    assert_eq!(out.taus[0].p4.pt, 50.0);
    assert!(!out.taus[0].vertex.is_set());
    assert!(out.taus[1].vertex.is_set());

    let json = serde_json::to_value(&out).unwrap();
    assert!(json["taus"][0]["vertex"].is_null());
    assert!(json["gen_particles"][2]["parent"].is_null());
}

#[test]
fn test_missing_source_collection() {
    let mut event = mc_event();
    event.collections.retain(|c| c.label != "muons");
    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let err = pipeline.process(&event).unwrap_err();
    assert!(matches!(err, SkimError::MissingCollection(ref l) if l == "muons"));
}

#[test]
fn test_finalized_entries_pass_selection() {
    let config = config();
    let mut pipeline = EventPipeline::from_config(&config).unwrap();
    let out = pipeline.process(&mc_event()).unwrap();

    assert!(out.taus.iter().all(|t| config.taus.selection.passes(&t.p4)));
    assert!(out.muons.iter().all(|m| config.muons.selection.passes(&m.p4)));
    let pts: Vec<f64> = out.taus.iter().map(|t| t.p4.pt).collect();
    assert!(pts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_duplicate_component_names_rejected() {
    let result = EventPipeline::builder()
        .with_filler(Box::new(TausFiller::new(TausConfig::default())))
        .with_filler(Box::new(TausFiller::new(
            TausConfig::default().with_source("otherTaus"),
        )))
        .build();
    assert!(matches!(result, Err(SkimError::Config(_))));
}

struct PanickingFiller;

impl Filler for PanickingFiller {
    fn name(&self) -> &str {
        "boom"
    }

    fn fill(&mut self, _source: &dyn SourceAccessor, _maps: &mut IdentityRegistry) -> Result<()> {
        panic!("filler exploded");
    }

    fn finalize(&mut self, _out: &mut OutputEvent) {}

    fn reset(&mut self) {}
}

#[test]
fn test_panicking_component_is_reported() {
    let mut pipeline = EventPipelineBuilder::from_config(&config())
        .with_filler(Box::new(PanickingFiller))
        .with_parallel(true)
        .build()
        .unwrap();

    let err = pipeline.process(&mc_event()).unwrap_err();
    assert!(matches!(err, SkimError::ComponentPanicked(ref name) if name == "boom"));
}

#[test]
fn test_events_from_json_lines_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let line = serde_json::to_string(&mc_event()).unwrap();
    writeln!(file, "{}", line).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{}", serde_json::to_string(&mc_event().with_real_data(true)).unwrap()).unwrap();
    file.flush().unwrap();

    let mut pipeline = EventPipeline::from_config(&config()).unwrap();
    let outputs: Vec<OutputEvent> = EventReader::from_path(file.path())
        .unwrap()
        .map(|event| pipeline.process(&event.unwrap()).unwrap())
        .collect();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].taus[0].matched_gen.index(), Some(0));
    assert!(outputs[1].gen_particles.is_empty());
}
