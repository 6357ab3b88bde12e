//! Per-box stencil kernels for `alpha*a*phi - beta*div(b*grad(phi))`
//!
//! Every kernel works on one box, holds no state and never allocates. The
//! same code serves 2D and 3D through the const generic `D`.
//!
//! # Conventions
//!
//! - `a` is a single-component cell field, `b[d]` a face field along `d`.
//!   When `b[d]` carries several components, component `n` of the solution
//!   uses component `n` of `b[d]`; otherwise component 0 is shared.
//! - Face index `f` along `d` names the face on the low side of cell `f`, so
//!   cell `c` is bounded by faces `c` and `c + e_d`.
//! - Views must cover every index a stencil touches (one ghost cell around
//!   `bx` for cell fields).

mod adotx;
mod flux;
mod gsrb;
mod normalize;

pub use adotx::abec_adotx;
pub use flux::{abec_face_flux, abec_face_flux_box_faces};
pub use gsrb::abec_gsrb;
pub use normalize::abec_normalize;

use crate::field::Array4;

/// Boundary coupling of one box side as seen by the smoother
///
/// Both arrays live on the one-cell layer just outside the side and are
/// indexed by the ghost cell adjacent to the boundary cell.
#[derive(Debug, Clone, Copy)]
pub struct CouplingView<'a, const D: usize> {
    /// Nonzero where the exterior neighbor is coupled through `coef`
    pub mask: Array4<'a, i32, D>,
    /// Sensitivity of the exterior value to the adjacent interior value
    pub coef: Array4<'a, f64, D>,
}

/// Component of a face coefficient used for solution component `n`
#[inline]
pub(crate) fn coef_comp<const D: usize>(b: &Array4<'_, f64, D>, n: usize) -> usize {
    if b.ncomp() > 1 { n } else { 0 }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Small fixtures shared by the kernel tests

    use crate::field::Fab;
    use crate::geometry::IndexBox;

    /// Cell fab over `bx` grown by one, filled from `f`
    pub fn cell_fab<const D: usize>(
        bx: IndexBox<D>,
        f: impl Fn([i32; D]) -> f64,
    ) -> Fab<f64, D> {
        let mut fab = Fab::new(bx.grow(1), 1, 0.0);
        for iv in bx.grow(1).cells() {
            fab.set(iv, 0, f(iv));
        }
        fab
    }

    /// Face fabs over `bx`, one per direction, filled from `f(dir, face)`
    pub fn face_fabs<const D: usize>(
        bx: IndexBox<D>,
        f: impl Fn(usize, [i32; D]) -> f64,
    ) -> [Fab<f64, D>; D] {
        std::array::from_fn(|d| {
            let fbx = bx.surrounding_nodes(d);
            let mut fab = Fab::new(fbx, 1, 0.0);
            for iv in fbx.cells() {
                fab.set(iv, 0, f(d, iv));
            }
            fab
        })
    }

    /// Deterministic pseudo-random value in `[lo, hi)` for index `iv`
    pub fn hashed<const D: usize>(iv: [i32; D], salt: u64, lo: f64, hi: f64) -> f64 {
        let mut h = salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        for &c in iv.iter() {
            h ^= (c as i64 as u64).wrapping_add(0x632B_E59B_D9B4_E019);
            h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
            h ^= h >> 31;
        }
        lo + (hi - lo) * ((h >> 11) as f64 / (1u64 << 53) as f64)
    }
}
