//! Coefficient provider for the cell-centered operator

use crate::error::Result;
use crate::field::MultiFab;

use super::hierarchy::LevelLayouts;

/// Supplies `alpha`, `beta`, `a` and `b` to [`CellAbecLap`](super::CellAbecLap)
///
/// The operator only reads coefficients through the four accessors. The
/// accessors are called after [`AbecPhysics::define`] and only for levels
/// that exist in the layouts passed to it; implementations may panic
/// otherwise.
pub trait AbecPhysics<const D: usize>: Send + Sync {
    /// Scalar multiplying the `a` term
    fn a_scalar(&self) -> f64;

    /// Scalar multiplying the divergence term
    fn b_scalar(&self) -> f64;

    /// Cell-centered `a` on one level (no ghost cells needed)
    fn a_coeffs(&self, amrlev: usize, mglev: usize) -> &MultiFab<D>;

    /// Face-centered `b`, one field per direction
    fn b_coeffs(&self, amrlev: usize, mglev: usize) -> [&MultiFab<D>; D];

    /// Allocate coefficient storage for every level
    fn define(&mut self, layouts: &LevelLayouts<D>) -> Result<()>;

    /// Coefficients changed since the last [`AbecPhysics::update`]
    fn needs_update(&self) -> bool {
        false
    }

    /// Rebuild derived coefficients (coarse levels)
    fn update(&mut self, _layouts: &LevelLayouts<D>) -> Result<()> {
        Ok(())
    }
}
