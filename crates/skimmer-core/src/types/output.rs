//! Normalized output schemas

use super::identity::{EventKey, OutputKind, OutputRef};
use super::kinematics::{Direction, Kinematic, Momentum};
use crate::error::{Result, SkimError};
use crate::reorder::Collection;
use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// An entry type stored in an output collection
pub trait OutputEntry: Default + Send + Sync + 'static {
    const KIND: OutputKind;
}

/// Reference to an entry of another (or the same) output collection
///
/// An unresolved reference is `None` and serializes as `null`; it can never
/// be confused with a reference to index 0.
pub struct Ref<T> {
    index: Option<u32>,
    _target: PhantomData<fn() -> T>,
}

impl<T: OutputEntry> Ref<T> {
    pub fn unset() -> Self {
        Self {
            index: None,
            _target: PhantomData,
        }
    }

    pub fn is_set(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn get(&self) -> Option<OutputRef> {
        self.index.map(|index| OutputRef::new(T::KIND, index))
    }

    /// Point at `target`, which must live in a collection of kind `T::KIND`
    pub fn set(&mut self, target: OutputRef) -> Result<()> {
        if target.kind != T::KIND {
            return Err(SkimError::kind_mismatch(T::KIND, target.kind));
        }
        self.index = Some(target.index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.index = None;
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Ref<T> {}

impl<T: OutputEntry> Default for Ref<T> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<T: OutputEntry> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "Ref({}[{}])", T::KIND, i),
            None => write!(f, "Ref({}, unset)", T::KIND),
        }
    }
}

impl<T> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.index.serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecoVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub ndof: f64,
    pub chi2: f64,
    pub n_tracks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenParticle {
    #[serde(flatten)]
    pub p4: Momentum,
    pub pdg_id: i32,
    pub status: i32,
    pub last_copy: bool,
    pub parent: Ref<GenParticle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tau {
    #[serde(flatten)]
    pub p4: Momentum,
    pub charge: i32,
    pub decay_mode: bool,
    pub decay_mode_new: bool,
    pub loose_iso_mva: bool,
    pub loose_iso_mva_old: bool,
    pub iso_delta_beta_corr: f64,
    pub iso: f64,
    pub vertex: Ref<RecoVertex>,
    pub matched_gen: Ref<GenParticle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Muon {
    #[serde(flatten)]
    pub p4: Momentum,
    pub charge: i32,
    pub global: bool,
    pub tracker: bool,
    pub pf: bool,
    pub loose: bool,
    pub medium: bool,
    pub tight: bool,
    pub ch_iso: f64,
    pub nh_iso: f64,
    pub ph_iso: f64,
    pub pu_iso: f64,
    pub comb_iso: f64,
    pub vertex: Ref<RecoVertex>,
    pub matched_gen: Ref<GenParticle>,
}

impl OutputEntry for RecoVertex {
    const KIND: OutputKind = OutputKind::RecoVertex;
}

impl OutputEntry for GenParticle {
    const KIND: OutputKind = OutputKind::GenParticle;
}

impl OutputEntry for Tau {
    const KIND: OutputKind = OutputKind::Tau;
}

impl OutputEntry for Muon {
    const KIND: OutputKind = OutputKind::Muon;
}

macro_rules! kinematic_entry {
    ($($ty:ty),*) => {
        $(
            impl Kinematic for $ty {
                fn p4(&self) -> &Momentum {
                    &self.p4
                }
            }

            impl Direction for $ty {
                fn eta(&self) -> f64 {
                    self.p4.eta
                }

                fn phi(&self) -> f64 {
                    self.p4.phi
                }
            }
        )*
    };
}

kinematic_entry!(GenParticle, Tau, Muon);

/// A finalized event: every collection sorted, every reference resolved or unset
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputEvent {
    #[serde(flatten)]
    pub key: EventKey,
    pub vertices: Collection<RecoVertex>,
    pub gen_particles: Collection<GenParticle>,
    pub taus: Collection<Tau>,
    pub muons: Collection<Muon>,
}

impl OutputEvent {
    pub fn new(key: EventKey) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }
}
