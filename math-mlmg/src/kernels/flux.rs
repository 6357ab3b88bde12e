//! Face fluxes `-fac * b * dphi`

use crate::error::{MlmgError, Result};
use crate::field::{Array4, Array4Mut};
use crate::geometry::{IndexBox, shift};

use super::coef_comp;

#[inline]
fn face_flux_at<const D: usize>(
    dir: usize,
    iv: [i32; D],
    n: usize,
    flux: &mut Array4Mut<'_, f64, D>,
    sol: &Array4<'_, f64, D>,
    b: &Array4<'_, f64, D>,
    fac: f64,
) {
    let bn = coef_comp(b, n);
    let v = -fac * b.get_n(iv, bn) * (sol.get_n(iv, n) - sol.get_n(shift(iv, dir, -1), n));
    flux.set_n(iv, n, v);
}

/// Flux on every face of `face_box` along `dir`
///
/// `face_box` is a face box (see [`IndexBox::surrounding_nodes`]); all
/// components of `flux` are written.
pub fn abec_face_flux<const D: usize>(
    dir: usize,
    face_box: &IndexBox<D>,
    flux: &mut Array4Mut<'_, f64, D>,
    sol: &Array4<'_, f64, D>,
    b: &Array4<'_, f64, D>,
    fac: f64,
) {
    for n in 0..flux.ncomp() {
        for iv in face_box.cells() {
            face_flux_at(dir, iv, n, flux, sol, b, fac);
        }
    }
}

/// Flux on the two bounding planes of `face_box` along `dir` only
///
/// Interior planes are left untouched. Values equal [`abec_face_flux`] on
/// the same faces. A face box spanning a single plane is rejected.
pub fn abec_face_flux_box_faces<const D: usize>(
    dir: usize,
    face_box: &IndexBox<D>,
    flux: &mut Array4Mut<'_, f64, D>,
    sol: &Array4<'_, f64, D>,
    b: &Array4<'_, f64, D>,
    fac: f64,
) -> Result<()> {
    let len = face_box.len(dir);
    if len < 2 {
        return Err(MlmgError::DegenerateFaceBox { dir, len });
    }
    for n in 0..flux.ncomp() {
        for plane in [face_box.lo[dir], face_box.hi[dir]] {
            for iv in face_box.plane(dir, plane).cells() {
                face_flux_at(dir, iv, n, flux, sol, b, fac);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fab;
    use crate::kernels::testing::{cell_fab, face_fabs, hashed};
    use crate::kernels::abec_adotx;
    use approx::assert_relative_eq;

    const SENTINEL: f64 = -12345.0;

    #[test]
    fn test_box_faces_match_interior_variant() {
        let bx = IndexBox::new([0, 0], [4, 3]);
        let sol = cell_fab(bx, |iv| hashed(iv, 7, -2.0, 2.0));
        let b = face_fabs(bx, |d, iv| hashed(iv, 70 + d as u64, 0.5, 1.5));

        for dir in 0..2 {
            let fbx = bx.surrounding_nodes(dir);
            let mut all = Fab::new(fbx, 1, 0.0);
            let mut edges = Fab::new(fbx, 1, SENTINEL);
            abec_face_flux(dir, &fbx, &mut all.view_mut(), &sol.view(), &b[dir].view(), 0.75);
            abec_face_flux_box_faces(
                dir,
                &fbx,
                &mut edges.view_mut(),
                &sol.view(),
                &b[dir].view(),
                0.75,
            )
            .unwrap();

            for iv in fbx.cells() {
                if iv[dir] == fbx.lo[dir] || iv[dir] == fbx.hi[dir] {
                    assert_eq!(edges.get(iv, 0), all.get(iv, 0));
                } else {
                    assert_eq!(edges.get(iv, 0), SENTINEL);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_face_box_rejected() {
        let bx = IndexBox::new([0, 0], [3, 3]);
        let sol = cell_fab(bx, |_| 1.0);
        let b = face_fabs(bx, |_, _| 1.0);
        let plane = bx.surrounding_nodes(0).plane(0, 2);
        let mut flux = Fab::new(bx.surrounding_nodes(0), 1, SENTINEL);

        let err = abec_face_flux_box_faces(
            0,
            &plane,
            &mut flux.view_mut(),
            &sol.view(),
            &b[0].view(),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, MlmgError::DegenerateFaceBox { dir: 0, len: 1 }));
        assert!(flux.as_slice().iter().all(|&v| v == SENTINEL));
    }

    #[test]
    fn test_flux_divergence_matches_operator() {
        // With alpha = 0, adotx equals the divergence of the fluxes built
        // with fac = beta*dxinv
        let bx = IndexBox::new([0, 0, 0], [2, 3, 1]);
        let sol = cell_fab(bx, |iv| hashed(iv, 8, -1.0, 1.0));
        let a = cell_fab(bx, |_| 0.0);
        let b = face_fabs(bx, |d, iv| hashed(iv, 80 + d as u64, 0.5, 1.5));
        let dxinv = [2.0, 1.0, 3.0];
        let beta = 0.9;

        let fluxes: Vec<Fab<f64, 3>> = (0..3)
            .map(|d| {
                let fbx = bx.surrounding_nodes(d);
                let mut f = Fab::new(fbx, 1, 0.0);
                let fac = beta * dxinv[d];
                abec_face_flux(d, &fbx, &mut f.view_mut(), &sol.view(), &b[d].view(), fac);
                f
            })
            .collect();

        let bv: [Array4<'_, f64, 3>; 3] = std::array::from_fn(|d| b[d].view());
        let mut y = Fab::new(bx, 1, 0.0);
        abec_adotx(&bx, &mut y.view_mut(), &sol.view(), &a.view(), &bv, dxinv, 0.0, beta);

        for iv in bx.cells() {
            let div: f64 = (0..3)
                .map(|d| dxinv[d] * (fluxes[d].get(shift(iv, d, 1), 0) - fluxes[d].get(iv, 0)))
                .sum();
            assert_relative_eq!(y.get(iv, 0), div, epsilon = 1e-10);
        }
    }
}
