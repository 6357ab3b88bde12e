//! Operator application on one box

use super::coef_comp;
use crate::field::{Array4, Array4Mut};
use crate::geometry::{IndexBox, shift};

/// `y = alpha*a*x - beta*div(b*grad(x))` on every cell of `bx`
///
/// Applied to every component of `y`. `x` must have one ghost cell around
/// `bx`.
#[allow(clippy::too_many_arguments)]
pub fn abec_adotx<const D: usize>(
    bx: &IndexBox<D>,
    y: &mut Array4Mut<'_, f64, D>,
    x: &Array4<'_, f64, D>,
    a: &Array4<'_, f64, D>,
    b: &[Array4<'_, f64, D>; D],
    dxinv: [f64; D],
    alpha: f64,
    beta: f64,
) {
    let dh: [f64; D] = std::array::from_fn(|d| beta * dxinv[d] * dxinv[d]);
    for n in 0..y.ncomp() {
        for iv in bx.cells() {
            let xc = x.get_n(iv, n);
            let mut v = alpha * a.get(iv) * xc;
            for d in 0..D {
                let bn = coef_comp(&b[d], n);
                let up = shift(iv, d, 1);
                let down = shift(iv, d, -1);
                v -= dh[d]
                    * (b[d].get_n(up, bn) * (x.get_n(up, n) - xc)
                        - b[d].get_n(iv, bn) * (xc - x.get_n(down, n)));
            }
            y.set_n(iv, n, v);
        }
    }
}
