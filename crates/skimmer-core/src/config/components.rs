use super::selection::{Selection, DISABLED};
use crate::error::{Result, SkimError};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_disabled() -> f64 {
    DISABLED
}

fn default_gen_source() -> String {
    "genParticles".to_string()
}

fn default_gen_match_dr() -> f64 {
    0.3
}

fn check_match_dr(section: &str, dr: f64) -> Result<()> {
    if !dr.is_finite() || dr <= 0.0 {
        return Err(SkimError::Config(format!(
            "{}: gen_match_dr must be positive, got {}",
            section, dr
        )));
    }
    Ok(())
}

/// Configuration for the primary vertex component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Source collection label
    /// Default: "vertices"
    #[serde(default = "default_vertices_source")]
    pub source: String,

    /// Drop vertices flagged as fake
    #[serde(default)]
    pub exclude_fake: bool,

    /// Minimum number of degrees of freedom (-1 disables)
    #[serde(default = "default_disabled")]
    pub min_ndof: f64,

    /// Maximum |z| (-1 disables)
    #[serde(default = "default_disabled")]
    pub max_abs_z: f64,
}

fn default_vertices_source() -> String {
    "vertices".to_string()
}

impl Default for VerticesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: default_vertices_source(),
            exclude_fake: false,
            min_ndof: DISABLED,
            max_abs_z: DISABLED,
        }
    }
}

impl VerticesConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_exclude_fake(mut self, exclude: bool) -> Self {
        self.exclude_fake = exclude;
        self
    }

    pub fn with_min_ndof(mut self, min_ndof: f64) -> Self {
        self.min_ndof = min_ndof;
        self
    }

    pub fn with_max_abs_z(mut self, max_abs_z: f64) -> Self {
        self.max_abs_z = max_abs_z;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.min_ndof.is_finite() || !self.max_abs_z.is_finite() {
            return Err(SkimError::Config(
                "vertices: thresholds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the generator-level particle component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenParticlesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_gen_source")]
    pub source: String,

    #[serde(flatten)]
    pub selection: Selection,

    /// Keep only the last copy of each particle in the decay history
    #[serde(default)]
    pub last_copy_only: bool,
}

impl Default for GenParticlesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: default_gen_source(),
            selection: Selection::default(),
            last_copy_only: false,
        }
    }
}

impl GenParticlesConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_last_copy_only(mut self, last_copy_only: bool) -> Self {
        self.last_copy_only = last_copy_only;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.selection.validate("gen_particles")
    }
}

/// Names of the tau discriminators read from extended records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TauDiscriminators {
    #[serde(default = "default_decay_mode")]
    pub decay_mode: String,
    #[serde(default = "default_decay_mode_new")]
    pub decay_mode_new: String,
    #[serde(default = "default_loose_iso_mva")]
    pub loose_iso_mva: String,
    #[serde(default = "default_loose_iso_mva_old")]
    pub loose_iso_mva_old: String,
    #[serde(default = "default_iso_delta_beta_corr")]
    pub iso_delta_beta_corr: String,
}

fn default_decay_mode() -> String {
    "decayModeFinding".to_string()
}

fn default_decay_mode_new() -> String {
    "decayModeFindingNewDMs".to_string()
}

fn default_loose_iso_mva() -> String {
    "byVLooseIsolationMVArun2v1DBnewDMwLT".to_string()
}

fn default_loose_iso_mva_old() -> String {
    "byVLooseIsolationMVArun2v1DBoldDMwLT".to_string()
}

fn default_iso_delta_beta_corr() -> String {
    "byCombinedIsolationDeltaBetaCorrRaw3Hits".to_string()
}

impl Default for TauDiscriminators {
    fn default() -> Self {
        Self {
            decay_mode: default_decay_mode(),
            decay_mode_new: default_decay_mode_new(),
            loose_iso_mva: default_loose_iso_mva(),
            loose_iso_mva_old: default_loose_iso_mva_old(),
            iso_delta_beta_corr: default_iso_delta_beta_corr(),
        }
    }
}

/// Configuration for the tau component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TausConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default: "taus"
    #[serde(default = "default_taus_source")]
    pub source: String,

    /// Generator collection used for truth matching
    #[serde(default = "default_gen_source")]
    pub gen_source: String,

    #[serde(flatten)]
    pub selection: Selection,

    /// Match to generator taus on simulation
    #[serde(default = "default_true")]
    pub match_gen: bool,

    /// Default: 0.3
    #[serde(default = "default_gen_match_dr")]
    pub gen_match_dr: f64,

    /// |pdg id| of truth candidates
    /// Default: 15
    #[serde(default = "default_tau_pdg_id")]
    pub gen_pdg_id: i32,

    /// Sum isolation constituents into `iso`
    #[serde(default = "default_true")]
    pub fill_isolation: bool,

    #[serde(default)]
    pub discriminators: TauDiscriminators,
}

fn default_taus_source() -> String {
    "taus".to_string()
}

fn default_tau_pdg_id() -> i32 {
    15
}

impl Default for TausConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: default_taus_source(),
            gen_source: default_gen_source(),
            selection: Selection::default(),
            match_gen: true,
            gen_match_dr: default_gen_match_dr(),
            gen_pdg_id: default_tau_pdg_id(),
            fill_isolation: true,
            discriminators: TauDiscriminators::default(),
        }
    }
}

impl TausConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_match_gen(mut self, match_gen: bool) -> Self {
        self.match_gen = match_gen;
        self
    }

    pub fn with_gen_match_dr(mut self, dr: f64) -> Self {
        self.gen_match_dr = dr;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.selection.validate("taus")?;
        check_match_dr("taus", self.gen_match_dr)
    }
}

/// Configuration for the muon component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuonsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default: "muons"
    #[serde(default = "default_muons_source")]
    pub source: String,

    #[serde(default = "default_gen_source")]
    pub gen_source: String,

    #[serde(flatten)]
    pub selection: Selection,

    #[serde(default = "default_true")]
    pub match_gen: bool,

    /// Default: 0.3
    #[serde(default = "default_gen_match_dr")]
    pub gen_match_dr: f64,

    /// Default: 13
    #[serde(default = "default_muon_pdg_id")]
    pub gen_pdg_id: i32,

    /// Copy isolation components and derive the combined isolation
    #[serde(default = "default_true")]
    pub fill_isolation: bool,
}

fn default_muons_source() -> String {
    "muons".to_string()
}

fn default_muon_pdg_id() -> i32 {
    13
}

impl Default for MuonsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: default_muons_source(),
            gen_source: default_gen_source(),
            selection: Selection::default(),
            match_gen: true,
            gen_match_dr: default_gen_match_dr(),
            gen_pdg_id: default_muon_pdg_id(),
            fill_isolation: true,
        }
    }
}

impl MuonsConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_match_gen(mut self, match_gen: bool) -> Self {
        self.match_gen = match_gen;
        self
    }

    pub fn with_fill_isolation(mut self, fill: bool) -> Self {
        self.fill_isolation = fill;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.selection.validate("muons")?;
        check_match_dr("muons", self.gen_match_dr)
    }
}
