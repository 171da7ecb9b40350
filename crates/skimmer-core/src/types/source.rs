//! Upstream record schemas
//!
//! Records that may or may not expose an extended field set carry a
//! capability-tagged variant (`TauExt`, `MuonExt`, `Constituent`) instead of
//! being inspected at runtime.

use super::identity::{RecordRef, SourceKind};
use super::kinematics::{Direction, Kinematic, Momentum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub ndof: f64,
    #[serde(default)]
    pub chi2: f64,
    #[serde(default)]
    pub n_tracks: u32,
    #[serde(default)]
    pub is_fake: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenRecord {
    #[serde(flatten)]
    pub p4: Momentum,
    pub pdg_id: i32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub last_copy: bool,
    #[serde(default)]
    pub mother: Option<RecordRef>,
}

/// Constituent of a tau isolation cone or signal cone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Constituent {
    /// Packed candidate carrying a reference to its associated vertex
    Packed {
        pt: f64,
        #[serde(default)]
        vertex: Option<RecordRef>,
    },
    Generic {
        pt: f64,
    },
}

impl Constituent {
    pub fn pt(&self) -> f64 {
        match self {
            Constituent::Packed { pt, .. } | Constituent::Generic { pt } => *pt,
        }
    }

    /// Vertex reference, only available on packed candidates
    pub fn vertex(&self) -> Option<&RecordRef> {
        match self {
            Constituent::Packed { vertex, .. } => vertex.as_ref(),
            Constituent::Generic { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatTauFields {
    /// Discriminator name to value
    #[serde(default)]
    pub tau_ids: BTreeMap<String, f64>,
    #[serde(default)]
    pub isolation_gamma: Option<Vec<Constituent>>,
    #[serde(default)]
    pub isolation_charged_hadrons: Option<Vec<Constituent>>,
    #[serde(default)]
    pub isolation_neutral_hadrons: Option<Vec<Constituent>>,
    #[serde(default)]
    pub lead_charged_hadron: Option<Constituent>,
}

impl PatTauFields {
    pub fn tau_id(&self, name: &str) -> Option<f64> {
        self.tau_ids.get(name).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TauExt {
    #[default]
    Basic,
    Pat(PatTauFields),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TauRecord {
    #[serde(flatten)]
    pub p4: Momentum,
    #[serde(default)]
    pub charge: i32,
    #[serde(default)]
    pub ext: TauExt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MuonIsolation {
    pub charged_hadron: f64,
    pub neutral_hadron: f64,
    pub photon: f64,
    pub pileup: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum MuonExt {
    #[default]
    Basic,
    Pat {
        #[serde(default)]
        loose: bool,
        #[serde(default)]
        medium: bool,
        #[serde(default)]
        tight: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuonRecord {
    #[serde(flatten)]
    pub p4: Momentum,
    #[serde(default)]
    pub charge: i32,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub is_tracker: bool,
    #[serde(default)]
    pub is_pf: bool,
    #[serde(default)]
    pub isolation: Option<MuonIsolation>,
    #[serde(default)]
    pub vertex: Option<RecordRef>,
    #[serde(default)]
    pub ext: MuonExt,
}

macro_rules! kinematic_record {
    ($($ty:ty),*) => {
        $(
            impl Kinematic for $ty {
                fn p4(&self) -> &Momentum {
                    &self.p4
                }
            }

            impl Direction for $ty {
                fn eta(&self) -> f64 {
                    self.p4.eta
                }

                fn phi(&self) -> f64 {
                    self.p4.phi
                }
            }
        )*
    };
}

kinematic_record!(GenRecord, TauRecord, MuonRecord);

/// One labelled upstream collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCollection {
    Taus(Vec<TauRecord>),
    Muons(Vec<MuonRecord>),
    Vertices(Vec<VertexRecord>),
    GenParticles(Vec<GenRecord>),
}

impl SourceCollection {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceCollection::Taus(_) => SourceKind::Tau,
            SourceCollection::Muons(_) => SourceKind::Muon,
            SourceCollection::Vertices(_) => SourceKind::Vertex,
            SourceCollection::GenParticles(_) => SourceKind::GenParticle,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceCollection::Taus(v) => v.len(),
            SourceCollection::Muons(v) => v.len(),
            SourceCollection::Vertices(v) => v.len(),
            SourceCollection::GenParticles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tau_variants_deserialize() {
        let basic: TauRecord =
            serde_json::from_str(r#"{"pt": 25.0, "eta": 0.1, "phi": 1.0, "charge": -1}"#).unwrap();
        assert_eq!(basic.ext, TauExt::Basic);
        assert_eq!(basic.charge, -1);

        let pat: TauRecord = serde_json::from_str(
            r#"{
                "pt": 40.0, "eta": -0.5, "phi": 2.0,
                "ext": {
                    "variant": "pat",
                    "tau_ids": {"decayModeFinding": 1.0},
                    "isolation_gamma": [{"variant": "generic", "pt": 1.5}],
                    "lead_charged_hadron": {
                        "variant": "packed",
                        "pt": 20.0,
                        "vertex": {"collection": "pv", "index": 0}
                    }
                }
            }"#,
        )
        .unwrap();

        let TauExt::Pat(fields) = pat.ext else {
            panic!("expected pat variant");
        };
        assert_eq!(fields.tau_id("decayModeFinding"), Some(1.0));
        assert_eq!(fields.tau_id("missing"), None);
        assert!(fields.isolation_charged_hadrons.is_none());
        let lead = fields.lead_charged_hadron.unwrap();
        assert_eq!(lead.vertex(), Some(&RecordRef::new("pv", 0)));
    }

    #[test]
    fn test_collection_kind() {
        let c: SourceCollection =
            serde_json::from_str(r#"{"vertices": [{"x": 0.0, "y": 0.0, "z": 1.0}]}"#).unwrap();
        assert_eq!(c.kind(), SourceKind::Vertex);
        assert_eq!(c.len(), 1);
        assert!(!c.is_empty());
    }
}
