//! Rectangular index boxes
//!
//! An [`IndexBox`] is an inclusive range of integer cell (or face) indices.
//! Face boxes are obtained from cell boxes with
//! [`IndexBox::surrounding_nodes`]; the face with index `i` along a direction
//! sits on the low side of cell `i`.

use super::orientation::{Orientation, Side};

/// Inclusive `lo..=hi` integer box in `D` dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBox<const D: usize> {
    /// Lowest index in each direction
    pub lo: [i32; D],
    /// Highest index in each direction (inclusive)
    pub hi: [i32; D],
}

impl<const D: usize> IndexBox<D> {
    pub fn new(lo: [i32; D], hi: [i32; D]) -> Self {
        Self { lo, hi }
    }

    /// Box of `n[d]` cells starting at the origin
    pub fn from_size(n: [i32; D]) -> Self {
        Self {
            lo: [0; D],
            hi: std::array::from_fn(|d| n[d] - 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|d| self.hi[d] < self.lo[d])
    }

    /// Number of indices along direction `d` (0 when empty)
    #[inline]
    pub fn len(&self, d: usize) -> i32 {
        (self.hi[d] - self.lo[d] + 1).max(0)
    }

    /// Per-direction lengths
    pub fn size(&self) -> [i32; D] {
        std::array::from_fn(|d| self.len(d))
    }

    /// Total number of indices in the box
    pub fn num_pts(&self) -> usize {
        (0..D).map(|d| self.len(d) as usize).product()
    }

    #[inline]
    pub fn contains(&self, iv: [i32; D]) -> bool {
        (0..D).all(|d| iv[d] >= self.lo[d] && iv[d] <= self.hi[d])
    }

    pub fn contains_box(&self, other: &IndexBox<D>) -> bool {
        other.is_empty() || (self.contains(other.lo) && self.contains(other.hi))
    }

    /// Grow by `n` cells on every side (negative shrinks)
    pub fn grow(&self, n: i32) -> Self {
        Self {
            lo: std::array::from_fn(|d| self.lo[d] - n),
            hi: std::array::from_fn(|d| self.hi[d] + n),
        }
    }

    /// Grow by `n` cells on both sides of direction `dir` only
    pub fn grow_dir(&self, dir: usize, n: i32) -> Self {
        let mut out = *self;
        out.lo[dir] -= n;
        out.hi[dir] += n;
        out
    }

    /// Coarsen by ratio `r`, rounding toward negative infinity
    pub fn coarsen(&self, r: i32) -> Self {
        Self {
            lo: std::array::from_fn(|d| self.lo[d].div_euclid(r)),
            hi: std::array::from_fn(|d| self.hi[d].div_euclid(r)),
        }
    }

    /// Refine by ratio `r`
    pub fn refine(&self, r: i32) -> Self {
        Self {
            lo: std::array::from_fn(|d| self.lo[d] * r),
            hi: std::array::from_fn(|d| (self.hi[d] + 1) * r - 1),
        }
    }

    /// Whether coarsening by `r` is exact and leaves at least `min_width`
    /// cells in every direction
    pub fn coarsenable(&self, r: i32, min_width: i32) -> bool {
        if self.is_empty() {
            return false;
        }
        self.coarsen(r).refine(r) == *self
            && (0..D).all(|d| self.len(d) / r >= min_width)
    }

    /// Face box along `dir`: one more index on the high side
    pub fn surrounding_nodes(&self, dir: usize) -> Self {
        let mut out = *self;
        out.hi[dir] += 1;
        out
    }

    /// Convert a face box along `dir` back to the cell box it bounds
    pub fn enclosed_cells(&self, dir: usize) -> Self {
        let mut out = *self;
        out.hi[dir] -= 1;
        out
    }

    /// One-cell-thick layer just outside the given side
    pub fn adjacent_layer(&self, ori: Orientation) -> Self {
        let mut out = *self;
        match ori.side {
            Side::Low => {
                out.lo[ori.dir] = self.lo[ori.dir] - 1;
                out.hi[ori.dir] = self.lo[ori.dir] - 1;
            }
            Side::High => {
                out.lo[ori.dir] = self.hi[ori.dir] + 1;
                out.hi[ori.dir] = self.hi[ori.dir] + 1;
            }
        }
        out
    }

    /// The index plane `plane` along `dir`, restricted to this box's extent
    /// in the other directions
    pub fn plane(&self, dir: usize, plane: i32) -> Self {
        let mut out = *self;
        out.lo[dir] = plane;
        out.hi[dir] = plane;
        out
    }

    pub fn intersect(&self, other: &IndexBox<D>) -> Option<Self> {
        let out = Self {
            lo: std::array::from_fn(|d| self.lo[d].max(other.lo[d])),
            hi: std::array::from_fn(|d| self.hi[d].min(other.hi[d])),
        };
        (!out.is_empty()).then_some(out)
    }

    /// Iterate over all indices, first direction fastest
    pub fn cells(&self) -> Cells<D> {
        Cells {
            bx: *self,
            next: (!self.is_empty()).then_some(self.lo),
        }
    }
}

/// `iv + s * e_dir`
#[inline]
pub fn shift<const D: usize>(iv: [i32; D], dir: usize, s: i32) -> [i32; D] {
    let mut out = iv;
    out[dir] += s;
    out
}

/// Iterator over the indices of an [`IndexBox`] in Fortran order
#[derive(Debug, Clone)]
pub struct Cells<const D: usize> {
    bx: IndexBox<D>,
    next: Option<[i32; D]>,
}

impl<const D: usize> Iterator for Cells<D> {
    type Item = [i32; D];

    fn next(&mut self) -> Option<[i32; D]> {
        let current = self.next?;
        let mut iv = current;
        let mut d = 0;
        self.next = loop {
            if d == D {
                break None;
            }
            if iv[d] < self.bx.hi[d] {
                iv[d] += 1;
                break Some(iv);
            }
            iv[d] = self.bx.lo[d];
            d += 1;
        };
        Some(current)
    }
}
