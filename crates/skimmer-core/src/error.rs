use crate::registry::MapKey;
use crate::stage::ComponentStage;
use crate::types::{OutputRef, SourceId};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkimError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source identity {identity} already registered in map {map}")]
    DuplicateSource { map: MapKey, identity: SourceId },

    #[error("Output entry {output} already registered in map {map}")]
    DuplicateOutput { map: MapKey, output: OutputRef },

    #[error("Map {0} already registered with different semantics")]
    DuplicateMap(MapKey),

    #[error("No identity map registered for {0}")]
    UnregisteredMap(MapKey),

    #[error("Registry is sealed, {0} rejected")]
    Sealed(&'static str),

    #[error("Kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: String, actual: String },

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Component '{component}' cannot move from {from} to {to}")]
    InvalidStage {
        component: String,
        from: ComponentStage,
        to: ComponentStage,
    },

    #[error("Source collection not found: {0}")]
    MissingCollection(String),

    #[error("Discriminator '{0}' not available on record")]
    MissingDiscriminator(String),

    #[error("Output entry {0} does not exist in its collection")]
    DanglingOutput(OutputRef),

    #[error("Component '{0}' panicked")]
    ComponentPanicked(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SkimError>;

impl SkimError {
    pub fn kind_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        SkimError::KindMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<serde_json::Error> for SkimError {
    fn from(err: serde_json::Error) -> Self {
        SkimError::Serialization(err.to_string())
    }
}
