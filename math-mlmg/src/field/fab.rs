//! Owned dense storage over one box

use super::array4::{Array4, Array4Mut};
use crate::geometry::IndexBox;

/// Dense `ncomp`-component array over a box (ghost cells included in `bx`)
#[derive(Debug, Clone, PartialEq)]
pub struct Fab<T, const D: usize> {
    bx: IndexBox<D>,
    ncomp: usize,
    data: Vec<T>,
}

impl<T: Copy, const D: usize> Fab<T, D> {
    /// Allocate and fill with `value`
    pub fn new(bx: IndexBox<D>, ncomp: usize, value: T) -> Self {
        Self {
            bx,
            ncomp,
            data: vec![value; bx.num_pts() * ncomp],
        }
    }

    pub fn bounds(&self) -> IndexBox<D> {
        self.bx
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn view(&self) -> Array4<'_, T, D> {
        Array4::new(&self.data, self.bx, self.ncomp)
    }

    pub fn view_mut(&mut self) -> Array4Mut<'_, T, D> {
        Array4Mut::new(&mut self.data, self.bx, self.ncomp)
    }

    pub fn get(&self, iv: [i32; D], n: usize) -> T {
        self.view().get_n(iv, n)
    }

    pub fn set(&mut self, iv: [i32; D], n: usize, v: T) {
        self.view_mut().set_n(iv, n, v);
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Fill every component on the part of `region` inside this fab
    pub fn fill_region(&mut self, region: &IndexBox<D>, value: T) {
        let Some(isect) = self.bx.intersect(region) else {
            return;
        };
        let ncomp = self.ncomp;
        let mut view = self.view_mut();
        for n in 0..ncomp {
            for iv in isect.cells() {
                view.set_n(iv, n, value);
            }
        }
    }

    /// Copy every component of `src` on the overlap of `region` and both fabs
    pub fn copy_region(&mut self, src: &Fab<T, D>, region: &IndexBox<D>) {
        let Some(isect) = self.bx.intersect(&src.bx).and_then(|b| b.intersect(region)) else {
            return;
        };
        let ncomp = self.ncomp.min(src.ncomp);
        let from = src.view();
        let mut to = self.view_mut();
        for n in 0..ncomp {
            for iv in isect.cells() {
                to.set_n(iv, n, from.get_n(iv, n));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_region_clips() {
        let mut fab = Fab::new(IndexBox::new([0, 0], [3, 3]), 2, 0i32);
        fab.fill_region(&IndexBox::new([2, 2], [9, 9]), 7);
        assert_eq!(fab.get([3, 3], 0), 7);
        assert_eq!(fab.get([3, 3], 1), 7);
        assert_eq!(fab.get([1, 3], 0), 0);
        assert_eq!(fab.as_slice().iter().filter(|&&v| v == 7).count(), 8);
    }

    #[test]
    fn test_copy_region() {
        let src = Fab::new(IndexBox::new([0, 0], [1, 1]), 1, 3.0);
        let mut dst = Fab::new(IndexBox::new([1, 1], [2, 2]), 1, 0.0);
        dst.copy_region(&src, &IndexBox::new([-5, -5], [5, 5]));
        assert_eq!(dst.get([1, 1], 0), 3.0);
        assert_eq!(dst.get([2, 1], 0), 0.0);
    }
}
