//! Diagonal scaling

use super::coef_comp;
use crate::field::{Array4, Array4Mut};
use crate::geometry::{IndexBox, shift};

/// Divide `x` in place by the operator diagonal
/// `alpha*a + sum_d beta*dxinv[d]^2*(b_d(c) + b_d(c+e_d))`
///
/// A zero diagonal yields non-finite values; no check is made.
#[allow(clippy::too_many_arguments)]
pub fn abec_normalize<const D: usize>(
    bx: &IndexBox<D>,
    x: &mut Array4Mut<'_, f64, D>,
    a: &Array4<'_, f64, D>,
    b: &[Array4<'_, f64, D>; D],
    dxinv: [f64; D],
    alpha: f64,
    beta: f64,
) {
    let dh: [f64; D] = std::array::from_fn(|d| beta * dxinv[d] * dxinv[d]);
    for n in 0..x.ncomp() {
        for iv in bx.cells() {
            let mut diag = alpha * a.get(iv);
            for d in 0..D {
                let bn = coef_comp(&b[d], n);
                diag += dh[d] * (b[d].get_n(iv, bn) + b[d].get_n(shift(iv, d, 1), bn));
            }
            let v = x.get_n(iv, n) / diag;
            x.set_n(iv, n, v);
        }
    }
}
