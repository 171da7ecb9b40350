use serde::{Deserialize, Serialize};

/// Transverse momentum, pseudorapidity, azimuth and mass of a particle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    #[serde(default)]
    pub mass: f64,
}

impl Momentum {
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }
}

/// Anything with a direction in (eta, phi)
pub trait Direction {
    fn eta(&self) -> f64;
    fn phi(&self) -> f64;
}

/// Anything carrying a four-momentum
pub trait Kinematic {
    fn p4(&self) -> &Momentum;

    fn pt(&self) -> f64 {
        self.p4().pt
    }
}

impl Direction for Momentum {
    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl Kinematic for Momentum {
    fn p4(&self) -> &Momentum {
        self
    }
}

impl<T: Direction + ?Sized> Direction for &T {
    fn eta(&self) -> f64 {
        (**self).eta()
    }

    fn phi(&self) -> f64 {
        (**self).phi()
    }
}
