pub mod components;
pub mod selection;

pub use components::{
    GenParticlesConfig, MuonsConfig, TauDiscriminators, TausConfig, VerticesConfig,
};
pub use selection::{Selection, DISABLED};

use crate::error::{Result, SkimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a full skim: one section per component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkimConfig {
    #[serde(default)]
    pub vertices: VerticesConfig,

    #[serde(default)]
    pub gen_particles: GenParticlesConfig,

    #[serde(default)]
    pub taus: TausConfig,

    #[serde(default)]
    pub muons: MuonsConfig,

    /// Run each phase with one thread per component
    /// Default: false
    #[serde(default)]
    pub parallel: bool,
}

impl SkimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SkimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.vertices.validate()?;
        self.gen_particles.validate()?;
        self.taus.validate()?;
        self.muons.validate()?;
        self.validate_wiring()
    }

    /// Every enabled component must find the maps it links against
    fn validate_wiring(&self) -> Result<()> {
        let linking = [
            ("taus", self.taus.enabled, self.taus.match_gen),
            ("muons", self.muons.enabled, self.muons.match_gen),
        ];
        for (name, enabled, match_gen) in linking {
            if !enabled {
                continue;
            }
            if !self.vertices.enabled {
                return Err(SkimError::Config(format!(
                    "{} links to vertices but the vertices component is disabled",
                    name
                )));
            }
            if match_gen && !self.gen_particles.enabled {
                return Err(SkimError::Config(format!(
                    "{} matches gen particles but the gen_particles component is disabled",
                    name
                )));
            }
        }
        Ok(())
    }
}
