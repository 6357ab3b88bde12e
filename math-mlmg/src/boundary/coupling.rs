//! Per-box boundary coupling storage
//!
//! For every side of a valid box a one-cell layer just outside the side
//! holds a mask and a coefficient. A set mask means the exterior neighbor is
//! not an independent unknown of this level: its value (filled by the
//! caller) depends on the adjacent interior value with sensitivity `coef`,
//! and the smoother folds that dependence into the diagonal.

use super::bc::DomainBcs;
use crate::field::Fab;
use crate::geometry::{BoxArray, IndexBox, LevelGeometry, Orientation};
use crate::kernels::CouplingView;

/// Coupling coefficient of a coarse/fine interface ghost
const INTERFACE_COEF: f64 = -1.0;

/// Mask and coefficient layers of one valid box
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCoupling<const D: usize> {
    valid: IndexBox<D>,
    /// Indexed by `Orientation::index`
    masks: Vec<Fab<i32, D>>,
    coefs: Vec<Fab<f64, D>>,
}

impl<const D: usize> BoundaryCoupling<D> {
    /// All sides uncoupled
    pub fn inactive(valid: IndexBox<D>) -> Self {
        let layers: Vec<IndexBox<D>> = Orientation::all::<D>()
            .map(|ori| valid.adjacent_layer(ori))
            .collect();
        Self {
            valid,
            masks: layers.iter().map(|l| Fab::new(*l, 1, 0)).collect(),
            coefs: layers.iter().map(|l| Fab::new(*l, 1, 0.0)).collect(),
        }
    }

    /// Couplings of box `index` of `grids`
    ///
    /// | exterior cell                                 | mask | coef        |
    /// |-----------------------------------------------|------|-------------|
    /// | covered by another box of the level           | 0    | 0           |
    /// | outside the domain, periodic image covered    | 0    | 0           |
    /// | outside the domain, periodic image uncovered  | 1    | -1          |
    /// | outside the domain                            | 1    | bc coupling |
    /// | inside the domain, uncovered (coarse/fine)    | 1    | -1          |
    pub fn build(
        grids: &BoxArray<D>,
        index: usize,
        geom: &LevelGeometry<D>,
        bcs: &DomainBcs<D>,
    ) -> Self {
        let valid = grids.get(index);
        let mut out = Self::inactive(valid);
        for ori in Orientation::all::<D>() {
            let bc = bcs.get(ori);
            for iv in valid.adjacent_layer(ori).cells() {
                let coupling = if grids.covers(iv) {
                    None
                } else if geom.domain.contains(iv) {
                    Some(INTERFACE_COEF)
                } else if geom.is_periodic(ori.dir) {
                    let image = periodic_image(iv, &geom.domain, ori.dir);
                    if grids.covers(image) {
                        None
                    } else {
                        Some(INTERFACE_COEF)
                    }
                } else {
                    bc.coupling()
                };
                if let Some(coef) = coupling {
                    out.set(ori, iv, true, coef);
                }
            }
        }
        out
    }

    pub fn valid_box(&self) -> IndexBox<D> {
        self.valid
    }

    /// Set mask and coefficient of the exterior cell `iv` on side `ori`
    pub fn set(&mut self, ori: Orientation, iv: [i32; D], active: bool, coef: f64) {
        let k = ori.index();
        self.masks[k].set(iv, 0, i32::from(active));
        self.coefs[k].set(iv, 0, coef);
    }

    pub fn mask(&self, ori: Orientation) -> &Fab<i32, D> {
        &self.masks[ori.index()]
    }

    pub fn coef(&self, ori: Orientation) -> &Fab<f64, D> {
        &self.coefs[ori.index()]
    }

    /// Number of active exterior cells on side `ori`
    pub fn active_count(&self, ori: Orientation) -> usize {
        self.mask(ori).as_slice().iter().filter(|&&m| m > 0).count()
    }

    /// Kernel views, `[dir][low, high]`
    pub fn views(&self) -> [[CouplingView<'_, D>; 2]; D] {
        std::array::from_fn(|d| {
            [Orientation::low(d), Orientation::high(d)].map(|ori| CouplingView {
                mask: self.mask(ori).view(),
                coef: self.coef(ori).view(),
            })
        })
    }
}

/// `iv` wrapped into `domain` along periodic direction `dir`
fn periodic_image<const D: usize>(iv: [i32; D], domain: &IndexBox<D>, dir: usize) -> [i32; D] {
    let mut out = iv;
    out[dir] = domain.lo[dir] + (iv[dir] - domain.lo[dir]).rem_euclid(domain.len(dir));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::LinOpBc;

    fn geom(n: i32, periodic: [bool; 2]) -> LevelGeometry<2> {
        LevelGeometry::new(IndexBox::from_size([n, n]), [1.0, 1.0], periodic)
    }

    #[test]
    fn test_shared_faces_are_uncoupled() {
        let grids = BoxArray::new(vec![
            IndexBox::new([0, 0], [3, 3]),
            IndexBox::new([4, 0], [7, 3]),
            IndexBox::new([0, 4], [7, 7]),
        ]);
        let bcs = DomainBcs::new(
            [LinOpBc::Dirichlet, LinOpBc::Neumann],
            [LinOpBc::ReflectOdd, LinOpBc::Dirichlet],
        );
        let bc = BoundaryCoupling::build(&grids, 0, &geom(8, [false; 2]), &bcs);

        assert_eq!(bc.active_count(Orientation::high(0)), 0);
        assert_eq!(bc.active_count(Orientation::high(1)), 0);
        assert_eq!(bc.active_count(Orientation::low(0)), 4);
        assert_eq!(bc.coef(Orientation::low(0)).get([-1, 2], 0), -1.0);
        assert_eq!(bc.coef(Orientation::low(1)).get([1, -1], 0), 1.0);

        let right = BoundaryCoupling::build(&grids, 1, &geom(8, [false; 2]), &bcs);
        assert_eq!(right.coef(Orientation::high(0)).get([8, 0], 0), -1.0);
        assert_eq!(right.active_count(Orientation::low(0)), 0);
    }

    #[test]
    fn test_periodic_direction_is_uncoupled() {
        let grids = BoxArray::single(IndexBox::from_size([4, 4]));
        let bcs = DomainBcs::new(
            [LinOpBc::Periodic, LinOpBc::Neumann],
            [LinOpBc::Periodic, LinOpBc::Neumann],
        );
        let bc = BoundaryCoupling::build(&grids, 0, &geom(4, [true, false]), &bcs);
        assert_eq!(bc.active_count(Orientation::low(0)), 0);
        assert_eq!(bc.active_count(Orientation::high(0)), 0);
        assert_eq!(bc.active_count(Orientation::high(1)), 4);
    }

    #[test]
    fn test_coarse_fine_interface() {
        // Fine patch strictly inside its domain
        let grids = BoxArray::single(IndexBox::new([4, 4], [11, 11]));
        let bc = BoundaryCoupling::build(
            &grids,
            0,
            &geom(16, [false; 2]),
            &DomainBcs::uniform(LinOpBc::Neumann),
        );
        for ori in Orientation::all::<2>() {
            assert_eq!(bc.active_count(ori), 8);
            assert!(bc.coef(ori).as_slice().iter().all(|&c| c == -1.0));
        }
    }

    #[test]
    fn test_periodic_edge_of_fine_patch() {
        // Fine patch touching the low x edge of a domain periodic in x
        let grids = BoxArray::single(IndexBox::new([0, 4], [7, 11]));
        let bcs = DomainBcs::new(
            [LinOpBc::Periodic, LinOpBc::Dirichlet],
            [LinOpBc::Periodic, LinOpBc::Dirichlet],
        );
        let bc = BoundaryCoupling::build(&grids, 0, &geom(16, [true, false]), &bcs);
        for ori in Orientation::all::<2>() {
            assert_eq!(bc.active_count(ori), 8);
            assert!(bc.coef(ori).as_slice().iter().all(|&c| c == -1.0));
        }
    }

    #[test]
    fn test_periodic_image_covered_by_other_box() {
        let grids = BoxArray::new(vec![
            IndexBox::new([0, 4], [7, 11]),
            IndexBox::new([12, 4], [15, 11]),
        ]);
        let bcs = DomainBcs::new(
            [LinOpBc::Periodic, LinOpBc::Dirichlet],
            [LinOpBc::Periodic, LinOpBc::Dirichlet],
        );
        let geom = geom(16, [true, false]);
        let left = BoundaryCoupling::build(&grids, 0, &geom, &bcs);
        let right = BoundaryCoupling::build(&grids, 1, &geom, &bcs);
        assert_eq!(left.active_count(Orientation::low(0)), 0);
        assert_eq!(right.active_count(Orientation::high(0)), 0);
        assert_eq!(left.active_count(Orientation::high(0)), 8);
        assert_eq!(right.active_count(Orientation::low(0)), 8);
    }

    #[test]
    fn test_views_layout() {
        let mut bc = BoundaryCoupling::inactive(IndexBox::new([0, 0, 0], [1, 2, 3]));
        bc.set(Orientation::high(2), [1, 1, 4], true, 0.5);
        let views = bc.views();
        assert_eq!(views[2][1].mask.get([1, 1, 4]), 1);
        assert_eq!(views[2][1].coef.get([1, 1, 4]), 0.5);
        assert_eq!(views[0][0].mask.bounds(), IndexBox::new([-1, 0, 0], [-1, 2, 3]));
    }
}
