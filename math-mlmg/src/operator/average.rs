//! Restriction of coefficients onto coarser levels
//!
//! Cell values are replaced by the mean of their `r^D` children; face values
//! by the mean of the `r^(D-1)` fine faces lying on the coarse face. Only
//! coarse values covered by the fine boxes are written.

use crate::field::MultiFab;
use crate::geometry::IndexBox;
use crate::parallel::for_each_box;

/// Average cell field `fine` onto `crse` (component by component)
pub fn average_down_cells<const D: usize>(fine: &MultiFab<D>, crse: &mut MultiFab<D>, ratio: i32) {
    let ncomp = fine.ncomp().min(crse.ncomp());
    let crse_grids = crse.grids().clone();
    let children = IndexBox::new([0; D], [ratio - 1; D]);
    let scale = 1.0 / children.num_pts() as f64;

    for_each_box(crse.fabs_mut(), |j, cfab| {
        let cvalid = crse_grids.get(j);
        let mut cview = cfab.view_mut();
        for (i, fbx) in fine.grids().iter().enumerate() {
            let Some(region) = fbx.coarsen(ratio).intersect(&cvalid) else {
                continue;
            };
            let fview = fine.fab(i).view();
            for n in 0..ncomp {
                for civ in region.cells() {
                    let sum: f64 = children
                        .cells()
                        .map(|k| {
                            let fiv: [i32; D] = std::array::from_fn(|d| civ[d] * ratio + k[d]);
                            fview.get_n(fiv, n)
                        })
                        .sum();
                    cview.set_n(civ, n, sum * scale);
                }
            }
        }
    });
}

/// Average face field `fine` (along `dir`) onto `crse`
pub fn average_down_faces<const D: usize>(
    fine: &MultiFab<D>,
    crse: &mut MultiFab<D>,
    dir: usize,
    ratio: i32,
) {
    let ncomp = fine.ncomp().min(crse.ncomp());
    let crse_grids = crse.grids().clone();
    let mut hi = [ratio - 1; D];
    hi[dir] = 0;
    let children = IndexBox::new([0; D], hi);
    let scale = 1.0 / children.num_pts() as f64;

    for_each_box(crse.fabs_mut(), |j, cfab| {
        let cvalid = crse_grids.get(j).surrounding_nodes(dir);
        let mut cview = cfab.view_mut();
        for (i, fbx) in fine.grids().iter().enumerate() {
            let covered = fbx.coarsen(ratio).surrounding_nodes(dir);
            let Some(region) = covered.intersect(&cvalid) else {
                continue;
            };
            let fview = fine.fab(i).view();
            for n in 0..ncomp {
                for civ in region.cells() {
                    let sum: f64 = children
                        .cells()
                        .map(|k| {
                            let fiv: [i32; D] = std::array::from_fn(|d| civ[d] * ratio + k[d]);
                            fview.get_n(fiv, n)
                        })
                        .sum();
                    cview.set_n(civ, n, sum * scale);
                }
            }
        }
    });
}
