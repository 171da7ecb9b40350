//! Map names shared between components
//!
//! These strings are the contract between a component that registers a map
//! during the fill phase and the components that look it up during the link
//! phase.

pub const VERTICES: &str = "vertices";
pub const GEN_PARTICLES: &str = "genParticles";
pub const GEN_PARENTS: &str = "genParents";

pub const TAUS: &str = "taus";
pub const TAU_TO_VERTEX: &str = "tauToVertex";
pub const TAU_TO_GEN: &str = "tauToGen";

pub const MUONS: &str = "muons";
pub const MUON_TO_VERTEX: &str = "muonToVertex";
pub const MUON_TO_GEN: &str = "muonToGen";
