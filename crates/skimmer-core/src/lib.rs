//! Skimmer Core: identity registry, stable reorder and link resolution
//!
//! Output entries often need to reference entries of other output
//! collections that are filled by independent components in no particular
//! order. This crate provides the pieces of the two-phase protocol that
//! makes that possible:
//!
//! - **Identity registry**: per-event bidirectional maps between source
//!   record identities and output entries
//! - **Stable reorder**: descending sort that reports the permutation applied,
//!   so fill-order side tables can be remapped
//! - **Link resolver**: after every component has filled, turns shared
//!   identities into typed references
//! - **Source accessor / filler traits**: the seams between the pipeline and
//!   its components

pub mod config;
pub mod error;
pub mod geometry;
pub mod link;
pub mod names;
pub mod observe;
pub mod registry;
pub mod reorder;
pub mod stage;
pub mod traits;
pub mod types;

pub use config::{
    GenParticlesConfig, MuonsConfig, Selection, SkimConfig, TauDiscriminators, TausConfig,
    VerticesConfig,
};
pub use error::{Result, SkimError};
pub use link::LinkStats;
pub use registry::{IdentityMap, IdentityRegistry, MapHandle, MapKey, MapSemantics};
pub use reorder::{stable_sort_desc, Collection, Permutation};
pub use stage::ComponentStage;
pub use traits::{Filler, Records, SourceAccessor};
pub use types::{
    CollectionId, EventKey, OutputEntry, OutputEvent, OutputKind, OutputRef, RecordRef, Ref,
    SourceId, SourceKind,
};
