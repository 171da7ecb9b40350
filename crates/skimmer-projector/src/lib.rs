//! Skimmer Projector: the fill phase of one component
//!
//! Turns a source collection into an output collection:
//!
//! - Per-record kinematic selection (dropped records leave no trace)
//! - Projection into a fresh output entry
//! - Immediate identity registration, keyed by fill order
//! - Stable descending-pt sort with registry remapping

pub mod derive;
pub mod engine;

pub use derive::{delta_beta_isolation, passes_discriminator, sum_over};
pub use engine::{FillStats, Filled, ProjectionEngine};
