//! Distributed-style fields: one fab per box of a level
//!
//! A [`MultiFab`] is either cell-centered or face-centered in one direction.
//! Its fabs cover the valid box grown by the ghost width; ghost values are
//! written by whoever owns the data exchange, never by this type.

use ndarray::Array1;

use super::fab::Fab;
use crate::geometry::{BoxArray, IndexBox};

/// Field over every box of a level
#[derive(Debug, Clone, PartialEq)]
pub struct MultiFab<const D: usize> {
    grids: BoxArray<D>,
    ncomp: usize,
    ngrow: usize,
    /// `Some(dir)` for a face-centered field along `dir`
    nodal: Option<usize>,
    fabs: Vec<Fab<f64, D>>,
}

impl<const D: usize> MultiFab<D> {
    /// Cell-centered field initialized to zero
    pub fn new_cell(grids: &BoxArray<D>, ncomp: usize, ngrow: usize) -> Self {
        Self::build(grids, ncomp, ngrow, None)
    }

    /// Face-centered field along `dir` initialized to zero
    pub fn new_face(grids: &BoxArray<D>, dir: usize, ncomp: usize, ngrow: usize) -> Self {
        Self::build(grids, ncomp, ngrow, Some(dir))
    }

    fn build(grids: &BoxArray<D>, ncomp: usize, ngrow: usize, nodal: Option<usize>) -> Self {
        let fabs = grids
            .iter()
            .map(|bx| {
                let valid = match nodal {
                    Some(dir) => bx.surrounding_nodes(dir),
                    None => *bx,
                };
                Fab::new(valid.grow(ngrow as i32), ncomp, 0.0)
            })
            .collect();
        Self {
            grids: grids.clone(),
            ncomp,
            ngrow,
            nodal,
            fabs,
        }
    }

    pub fn grids(&self) -> &BoxArray<D> {
        &self.grids
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    pub fn ngrow(&self) -> usize {
        self.ngrow
    }

    pub fn nodal(&self) -> Option<usize> {
        self.nodal
    }

    pub fn len(&self) -> usize {
        self.fabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fabs.is_empty()
    }

    /// Valid (non-ghost) region of fab `i`
    pub fn valid_box(&self, i: usize) -> IndexBox<D> {
        let bx = self.grids.get(i);
        match self.nodal {
            Some(dir) => bx.surrounding_nodes(dir),
            None => bx,
        }
    }

    pub fn fab(&self, i: usize) -> &Fab<f64, D> {
        &self.fabs[i]
    }

    pub fn fab_mut(&mut self, i: usize) -> &mut Fab<f64, D> {
        &mut self.fabs[i]
    }

    pub fn fabs(&self) -> &[Fab<f64, D>] {
        &self.fabs
    }

    pub fn fabs_mut(&mut self) -> &mut [Fab<f64, D>] {
        &mut self.fabs
    }

    /// Same boxes, centering and component count
    pub fn same_layout(&self, other: &MultiFab<D>) -> bool {
        self.grids == other.grids && self.ncomp == other.ncomp && self.nodal == other.nodal
    }

    /// Set every value, ghost cells included
    pub fn set_val(&mut self, value: f64) {
        for fab in &mut self.fabs {
            fab.fill(value);
        }
    }

    /// Set every value (ghost cells included) from a function of index and
    /// component
    pub fn fill_with<F>(&mut self, f: F)
    where
        F: Fn([i32; D], usize) -> f64,
    {
        for fab in &mut self.fabs {
            let bx = fab.bounds();
            let ncomp = fab.ncomp();
            let mut view = fab.view_mut();
            for n in 0..ncomp {
                for iv in bx.cells() {
                    view.set_n(iv, n, f(iv, n));
                }
            }
        }
    }

    /// Set ghost cells only, leaving valid values untouched
    pub fn fill_ghosts_with<F>(&mut self, f: F)
    where
        F: Fn([i32; D], usize) -> f64,
    {
        for i in 0..self.fabs.len() {
            let valid = self.valid_box(i);
            let fab = &mut self.fabs[i];
            let bx = fab.bounds();
            let ncomp = fab.ncomp();
            let mut view = fab.view_mut();
            for n in 0..ncomp {
                for iv in bx.cells().filter(|iv| !valid.contains(*iv)) {
                    view.set_n(iv, n, f(iv, n));
                }
            }
        }
    }

    /// Max norm of component `comp` over valid regions
    pub fn max_abs(&self, comp: usize) -> f64 {
        (0..self.fabs.len())
            .map(|i| {
                let view = self.fabs[i].view();
                self.valid_box(i)
                    .cells()
                    .map(|iv| view.get_n(iv, comp).abs())
                    .fold(0.0, f64::max)
            })
            .fold(0.0, f64::max)
    }

    /// Number of valid values over all components
    pub fn num_valid(&self) -> usize {
        (0..self.fabs.len())
            .map(|i| self.valid_box(i).num_pts() * self.ncomp)
            .sum()
    }

    /// Gather valid values, fab by fab, component-major
    pub fn to_array1(&self) -> Array1<f64> {
        let mut out = Vec::with_capacity(self.num_valid());
        for (i, fab) in self.fabs.iter().enumerate() {
            let valid = self.valid_box(i);
            let view = fab.view();
            for n in 0..self.ncomp {
                out.extend(valid.cells().map(|iv| view.get_n(iv, n)));
            }
        }
        Array1::from_vec(out)
    }

    /// Scatter valid values in the order produced by [`MultiFab::to_array1`]
    ///
    /// Ghost cells are left untouched.
    pub fn assign_from_array1(&mut self, values: &Array1<f64>) {
        debug_assert_eq!(values.len(), self.num_valid());
        let mut k = 0;
        for i in 0..self.fabs.len() {
            let valid = self.valid_box(i);
            let ncomp = self.ncomp;
            let mut view = self.fabs[i].view_mut();
            for n in 0..ncomp {
                for iv in valid.cells() {
                    view.set_n(iv, n, values[k]);
                    k += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_boxes() -> BoxArray<2> {
        BoxArray::new(vec![
            IndexBox::new([0, 0], [3, 3]),
            IndexBox::new([4, 0], [7, 3]),
        ])
    }

    #[test]
    fn test_cell_and_face_boxes() {
        let grids = two_boxes();
        let cell = MultiFab::new_cell(&grids, 2, 1);
        assert_eq!(cell.fab(1).bounds(), IndexBox::new([3, -1], [8, 4]));
        assert_eq!(cell.fab(0).ncomp(), 2);

        let face = MultiFab::new_face(&grids, 0, 1, 0);
        assert_eq!(face.valid_box(0), IndexBox::new([0, 0], [4, 3]));
        assert_eq!(face.fab(0).bounds(), face.valid_box(0));
        assert!(!cell.same_layout(&face));
    }

    #[test]
    fn test_max_abs_ignores_ghosts() {
        let mut mf = MultiFab::new_cell(&two_boxes(), 1, 1);
        mf.set_val(-9.0);
        mf.fill_with(|iv, _| if iv == [5, 2] { -3.0 } else { 1.0 });
        mf.fill_ghosts_with(|_, _| 100.0);
        assert_eq!(mf.max_abs(0), 3.0);
        assert_eq!(mf.fab(0).get([-1, 0], 0), 100.0);
    }

    #[test]
    fn test_array1_roundtrip_keeps_ghosts() {
        let mut mf = MultiFab::new_cell(&two_boxes(), 2, 1);
        mf.fill_with(|iv, n| (iv[0] + 10 * iv[1]) as f64 + 100.0 * n as f64);
        let values = mf.to_array1();
        assert_eq!(values.len(), 64);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[16], 100.0);

        let mut other = MultiFab::new_cell(&two_boxes(), 2, 1);
        other.set_val(-1.0);
        other.assign_from_array1(&values);
        assert_eq!(other.fab(1).get([7, 3], 1), 137.0);
        assert_eq!(other.fab(1).get([8, 3], 1), -1.0);
    }
}
