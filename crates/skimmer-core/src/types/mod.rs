pub mod identity;
pub mod kinematics;
pub mod output;
pub mod source;

pub use identity::{CollectionId, EventKey, OutputKind, OutputRef, RecordRef, SourceId, SourceKind};
pub use kinematics::{Direction, Kinematic, Momentum};
pub use output::{GenParticle, Muon, OutputEntry, OutputEvent, RecoVertex, Ref, Tau};
pub use source::{
    Constituent, GenRecord, MuonExt, MuonIsolation, MuonRecord, PatTauFields, SourceCollection,
    TauExt, TauRecord, VertexRecord,
};
