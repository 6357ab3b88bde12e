//! Domain boundary conditions

use serde::{Deserialize, Serialize};

use crate::error::{MlmgError, Result};
use crate::geometry::{Orientation, Side};

/// Boundary condition on one side of the domain
///
/// Ghost values are filled by the caller; the variant only fixes how a ghost
/// value responds to the adjacent interior value, which is what the smoother
/// needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinOpBc {
    /// Value prescribed on the face: `ghost = 2*g - phi`
    Dirichlet,
    /// Gradient prescribed on the face: `ghost = phi + h*g`
    Neumann,
    /// Odd reflection: `ghost = -phi`
    ReflectOdd,
    /// Periodic direction; ghost values come from the periodic image
    Periodic,
}

impl LinOpBc {
    /// d(ghost)/d(phi) for the adjacent interior cell, `None` when the
    /// ghost is a regular neighbor
    pub fn coupling(self) -> Option<f64> {
        match self {
            LinOpBc::Dirichlet | LinOpBc::ReflectOdd => Some(-1.0),
            LinOpBc::Neumann => Some(1.0),
            LinOpBc::Periodic => None,
        }
    }

    /// Whether this is the periodic condition
    pub fn is_periodic(self) -> bool {
        matches!(self, LinOpBc::Periodic)
    }
}

/// Boundary conditions on all `2*D` sides of the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainBcs<const D: usize> {
    /// Low side of each direction
    pub lo: [LinOpBc; D],
    /// High side of each direction
    pub hi: [LinOpBc; D],
}

impl<const D: usize> DomainBcs<D> {
    /// Conditions on the low and high side of each direction
    pub fn new(lo: [LinOpBc; D], hi: [LinOpBc; D]) -> Self {
        Self { lo, hi }
    }

    /// Same condition on every side
    pub fn uniform(bc: LinOpBc) -> Self {
        Self {
            lo: [bc; D],
            hi: [bc; D],
        }
    }

    /// Condition on side `ori`
    pub fn get(&self, ori: Orientation) -> LinOpBc {
        match ori.side {
            Side::Low => self.lo[ori.dir],
            Side::High => self.hi[ori.dir],
        }
    }

    /// Build from per-side lists, e.g. `["dirichlet", "neumann"]`
    pub fn from_json_sides(lo: &str, hi: &str) -> Result<Self> {
        let lo: Vec<LinOpBc> = serde_json::from_str(lo)?;
        let hi: Vec<LinOpBc> = serde_json::from_str(hi)?;
        Ok(Self {
            lo: Self::sides("bcs.lo", &lo)?,
            hi: Self::sides("bcs.hi", &hi)?,
        })
    }

    fn sides(name: &'static str, list: &[LinOpBc]) -> Result<[LinOpBc; D]> {
        list.try_into().map_err(|_| MlmgError::InvalidOption {
            name,
            reason: format!("expected {D} entries, got {}", list.len()),
        })
    }
}
