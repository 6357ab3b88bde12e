//! Red-black Gauss-Seidel relaxation with boundary coupling

use super::{CouplingView, coef_comp};
use crate::field::{Array4, Array4Mut};
use crate::geometry::{IndexBox, shift};

/// One color of a red-black Gauss-Seidel sweep on `bx`
///
/// Cells with `(sum of indices + redblack)` even are relaxed in place:
///
/// ```text
/// gamma = alpha*a + sum_d dh[d]*(b_lo + b_hi)
/// delta = sum_d dh[d]*(b_lo*cf_lo + b_hi*cf_hi)
/// rho   = sum_d dh[d]*(b_lo*phi(c-e_d) + b_hi*phi(c+e_d))
/// phi   = (rhs + rho - phi*delta) / (gamma - delta)
/// ```
///
/// `cf` is the coupling coefficient of a side when the cell touches that
/// side of `valid_box` and the side's mask is set, zero otherwise. `dh[d]`
/// is `beta*dxinv[d]^2`. Both colors must be run, one after the other, for a
/// full sweep.
#[allow(clippy::too_many_arguments)]
pub fn abec_gsrb<const D: usize>(
    bx: &IndexBox<D>,
    phi: &mut Array4Mut<'_, f64, D>,
    rhs: &Array4<'_, f64, D>,
    alpha: f64,
    dh: [f64; D],
    a: &Array4<'_, f64, D>,
    b: &[Array4<'_, f64, D>; D],
    couplings: &[[CouplingView<'_, D>; 2]; D],
    valid_box: &IndexBox<D>,
    ncomp: usize,
    redblack: i32,
) {
    for iv in bx.cells() {
        if (iv.iter().sum::<i32>() + redblack).rem_euclid(2) != 0 {
            continue;
        }
        for n in 0..ncomp {
            let mut gamma = alpha * a.get(iv);
            let mut delta = 0.0;
            let mut rho = 0.0;
            for d in 0..D {
                let bn = coef_comp(&b[d], n);
                let down = shift(iv, d, -1);
                let up = shift(iv, d, 1);
                let b_lo = b[d].get_n(iv, bn);
                let b_hi = b[d].get_n(up, bn);

                let [low, high] = &couplings[d];
                let cf_lo = if iv[d] == valid_box.lo[d] && low.mask.get(down) > 0 {
                    low.coef.get(down)
                } else {
                    0.0
                };
                let cf_hi = if iv[d] == valid_box.hi[d] && high.mask.get(up) > 0 {
                    high.coef.get(up)
                } else {
                    0.0
                };

                gamma += dh[d] * (b_lo + b_hi);
                delta += dh[d] * (b_lo * cf_lo + b_hi * cf_hi);
                rho += dh[d] * (b_lo * phi.get_n(down, n) + b_hi * phi.get_n(up, n));
            }
            let old = phi.get_n(iv, n);
            let new = (rhs.get_n(iv, n) + rho - old * delta) / (gamma - delta);
            phi.set_n(iv, n, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fab;
    use crate::geometry::Orientation;
    use crate::kernels::abec_adotx;
    use crate::kernels::testing::{cell_fab, face_fabs};
    use approx::assert_relative_eq;

    /// Coupling layers with every mask off
    fn inactive<const D: usize>(bx: IndexBox<D>) -> [[(Fab<i32, D>, Fab<f64, D>); 2]; D] {
        std::array::from_fn(|d| {
            [Orientation::low(d), Orientation::high(d)].map(|ori| {
                let layer = bx.adjacent_layer(ori);
                (Fab::new(layer, 1, 0), Fab::new(layer, 1, 0.0))
            })
        })
    }

    fn views<'a, const D: usize>(
        layers: &'a [[(Fab<i32, D>, Fab<f64, D>); 2]; D],
    ) -> [[CouplingView<'a, D>; 2]; D] {
        std::array::from_fn(|d| {
            [0, 1].map(|s| CouplingView {
                mask: layers[d][s].0.view(),
                coef: layers[d][s].1.view(),
            })
        })
    }

    #[test]
    fn test_coupled_cell_closed_form() {
        let bx = IndexBox::new([0, 0], [1, 1]);
        let mut phi = Fab::new(bx.grow(1), 1, 0.0);
        phi.set([0, 0], 0, 2.0);
        phi.set([-1, 0], 0, 3.0);
        phi.set([1, 0], 0, 0.5);
        phi.set([0, -1], 0, -1.0);
        phi.set([0, 1], 0, 4.0);
        let rhs = Fab::new(bx, 1, 3.0);
        let a = Fab::new(bx, 1, 1.5);
        let mut b = face_fabs(bx, |_, _| 0.0);
        b[0].set([0, 0], 0, 1.0);
        b[0].set([1, 0], 0, 2.0);
        b[1].set([0, 0], 0, 0.5);
        b[1].set([0, 1], 0, 1.5);
        let bv: [Array4<'_, f64, 2>; 2] = std::array::from_fn(|d| b[d].view());

        let mut layers = inactive(bx);
        layers[0][0].0.fill(1);
        layers[0][0].1.fill(0.25);
        layers[1][0].1.fill(10.0);

        // gamma = 2*1.5 + 1*(1+2) + 4*(0.5+1.5) = 14
        // delta = 1*1*0.25 = 0.25
        // rho = 1*(1*3 + 2*0.5) + 4*(0.5*(-1) + 1.5*4) = 26
        // phi = (3 + 26 - 2*0.25) / (14 - 0.25) = 28.5/13.75
        let mut coupled = phi.clone();
        abec_gsrb(
            &bx,
            &mut coupled.view_mut(),
            &rhs.view(),
            2.0,
            [1.0, 4.0],
            &a.view(),
            &bv,
            &views(&layers),
            &bx,
            1,
            0,
        );
        assert_relative_eq!(coupled.get([0, 0], 0), 28.5 / 13.75, epsilon = 1e-14);

        layers[0][0].0.fill(0);
        let mut insulated = phi.clone();
        abec_gsrb(
            &bx,
            &mut insulated.view_mut(),
            &rhs.view(),
            2.0,
            [1.0, 4.0],
            &a.view(),
            &bv,
            &views(&layers),
            &bx,
            1,
            0,
        );
        assert_relative_eq!(insulated.get([0, 0], 0), 29.0 / 14.0, epsilon = 1e-14);
    }

    #[test]
    fn test_color_selection() {
        let bx = IndexBox::new([-1, -1], [2, 2]);
        let rhs = Fab::new(bx, 1, 1.0);
        let a = Fab::new(bx, 1, 1.0);
        let b = face_fabs(bx, |_, _| 0.0);
        let bv: [Array4<'_, f64, 2>; 2] = std::array::from_fn(|d| b[d].view());
        let layers = inactive(bx);
        let mut phi = Fab::new(bx.grow(1), 1, 0.0);

        abec_gsrb(
            &bx,
            &mut phi.view_mut(),
            &rhs.view(),
            1.0,
            [1.0, 1.0],
            &a.view(),
            &bv,
            &views(&layers),
            &bx,
            1,
            1,
        );
        for iv in bx.cells() {
            let expected = if (iv[0] + iv[1]).rem_euclid(2) == 1 { 1.0 } else { 0.0 };
            assert_eq!(phi.get(iv, 0), expected, "cell {iv:?}");
        }
    }

    fn residual_max(
        bx: IndexBox<2>,
        phi: &Fab<f64, 2>,
        rhs: &Fab<f64, 2>,
        a: &Fab<f64, 2>,
        bv: &[Array4<'_, f64, 2>; 2],
        alpha: f64,
    ) -> f64 {
        let mut lphi = Fab::new(bx, 1, 0.0);
        abec_adotx(&bx, &mut lphi.view_mut(), &phi.view(), &a.view(), bv, [1.0, 1.0], alpha, 1.0);
        bx.cells()
            .map(|iv| (rhs.get(iv, 0) - lphi.get(iv, 0)).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_sweeps_reduce_residual() {
        let bx = IndexBox::new([0, 0], [7, 7]);
        let exact = |iv: [i32; 2]| ((iv[0] as f64) * 0.4).sin() + 0.1 * (iv[1] * iv[1]) as f64;
        let a = cell_fab(bx, |_| 4.0);
        let b = face_fabs(bx, |_, _| 1.0);
        let bv: [Array4<'_, f64, 2>; 2] = std::array::from_fn(|d| b[d].view());
        let alpha = 1.0;

        // rhs = L(exact); ghosts of phi hold the exact solution
        let exact_fab = cell_fab(bx, exact);
        let mut rhs = Fab::new(bx, 1, 0.0);
        abec_adotx(
            &bx,
            &mut rhs.view_mut(),
            &exact_fab.view(),
            &a.view(),
            &bv,
            [1.0, 1.0],
            alpha,
            1.0,
        );
        let mut phi = exact_fab.clone();
        phi.fill_region(&bx, 0.0);

        let layers = inactive(bx);
        let mut previous = residual_max(bx, &phi, &rhs, &a, &bv, alpha);
        for _ in 0..5 {
            for redblack in [0, 1] {
                abec_gsrb(
                    &bx,
                    &mut phi.view_mut(),
                    &rhs.view(),
                    alpha,
                    [1.0, 1.0],
                    &a.view(),
                    &bv,
                    &views(&layers),
                    &bx,
                    1,
                    redblack,
                );
            }
            let current = residual_max(bx, &phi, &rhs, &a, &bv, alpha);
            assert!(current < previous, "{current} >= {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_multi_component() {
        let bx = IndexBox::new([0, 0, 0], [1, 1, 1]);
        let a = Fab::new(bx, 1, 2.0);
        let b = face_fabs(bx, |_, _| 0.0);
        let bv: [Array4<'_, f64, 3>; 3] = std::array::from_fn(|d| b[d].view());
        let mut rhs = Fab::new(bx, 2, 4.0);
        for iv in bx.cells() {
            rhs.set(iv, 1, 8.0);
        }
        let layers = inactive(bx);
        let mut phi = Fab::new(bx.grow(1), 2, 0.0);
        for redblack in [0, 1] {
            abec_gsrb(
                &bx,
                &mut phi.view_mut(),
                &rhs.view(),
                1.0,
                [1.0; 3],
                &a.view(),
                &bv,
                &views(&layers),
                &bx,
                2,
                redblack,
            );
        }
        for iv in bx.cells() {
            assert_relative_eq!(phi.get(iv, 0), 2.0);
            assert_relative_eq!(phi.get(iv, 1), 4.0);
        }
    }
}
