//! Skimmer Prelude
//!
//! ```
//! use skimmer::prelude::*;
//! ```

// Pipeline
pub use crate::{EventContext, EventPipeline, EventPipelineBuilder, PipelineStats};

// Input
pub use crate::{EventReader, InputEvent, NamedCollection};

// Fillers
pub use crate::{GenParticlesFiller, MuonsFiller, TausFiller, VerticesFiller};

// Core types
pub use skimmer_core::types::{
    GenParticle, Muon, OutputEvent, RecoVertex, SourceCollection, Tau,
};
pub use skimmer_core::{
    ComponentStage, EventKey, Filler, IdentityRegistry, MapHandle, MapSemantics, OutputKind,
    OutputRef, Permutation, Ref, Result, SkimError, SourceAccessor, SourceId, SourceKind,
};

// Configs
pub use skimmer_core::{
    GenParticlesConfig, MuonsConfig, Selection, SkimConfig, TausConfig, VerticesConfig,
};

// Projection
pub use skimmer_projector::{FillStats, Filled, ProjectionEngine};
