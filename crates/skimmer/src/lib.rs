//! Skimmer: a per-event fill/link skim engine
//!
//! Independent components each turn one upstream collection into a
//! normalized output collection. Output entries reference entries of other
//! collections (a tau points to its vertex and to its matched generator
//! particle) even though every component fills, filters and sorts on its
//! own. References are carried as shared source identities during the fill
//! phase and resolved to positions after a barrier.
//!
//! # Example
//!
//! ```ignore
//! use skimmer::prelude::*;
//!
//! let config = SkimConfig::from_path("skim.json")?;
//! let mut pipeline = EventPipeline::from_config(&config)?;
//!
//! for event in EventReader::from_path("events.jsonl")? {
//!     let out = pipeline.process(&event?)?;
//!     println!("{}", serde_json::to_string(&out)?);
//! }
//! ```

pub mod context;
pub mod fillers;
pub mod input;
pub mod pipeline;
pub mod prelude;

pub use context::EventContext;
pub use fillers::{GenParticlesFiller, MuonsFiller, TausFiller, VerticesFiller};
pub use input::{EventReader, InputEvent, NamedCollection};
pub use pipeline::{EventPipeline, EventPipelineBuilder, PipelineStats};

pub use skimmer_core;
pub use skimmer_core::{
    ComponentStage, EventKey, Filler, IdentityRegistry, OutputEvent, Result,
    SkimConfig, SkimError, SourceAccessor,
};
pub use skimmer_projector;
pub use skimmer_projector::{FillStats, Filled, ProjectionEngine};
