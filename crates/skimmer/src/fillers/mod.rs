//! Concrete components
//!
//! Each filler owns one output collection per event and registers its maps
//! under the names in [`skimmer_core::names`].

pub mod gen_particles;
pub mod muons;
pub mod taus;
pub mod vertices;

pub use gen_particles::GenParticlesFiller;
pub use muons::MuonsFiller;
pub use taus::TausFiller;
pub use vertices::VerticesFiller;

use skimmer_core::types::{GenRecord, SourceId};
use skimmer_core::{Result, SourceAccessor};

/// Last-copy generator particles with `|pdg_id| == pdg_id`, in source order
pub(crate) fn truth_candidates<'a>(
    source: &'a dyn SourceAccessor,
    label: &str,
    pdg_id: i32,
) -> Result<Vec<(SourceId, &'a GenRecord)>> {
    let candidates = source
        .gen_particles(label)?
        .iter()
        .filter(|(_, gen)| gen.pdg_id.abs() == pdg_id && gen.last_copy)
        .collect();
    Ok(candidates)
}
