//! Borrowed multi-component views over a box
//!
//! Layout is first-index-fastest with components outermost. Kernels index
//! views with absolute cell indices; reading outside the view's bounds is a
//! caller error caught by `debug_assert!` and by slice bounds checking.

use crate::geometry::IndexBox;

#[inline]
fn strides<const D: usize>(bx: &IndexBox<D>) -> ([usize; D], usize) {
    let mut strides = [0usize; D];
    let mut acc = 1usize;
    for d in 0..D {
        strides[d] = acc;
        acc *= bx.len(d) as usize;
    }
    (strides, acc)
}

#[inline]
fn offset<const D: usize>(bx: &IndexBox<D>, strides: &[usize; D], iv: [i32; D]) -> usize {
    debug_assert!(bx.contains(iv), "index {iv:?} outside view {bx:?}");
    let mut off = 0usize;
    for d in 0..D {
        off += (iv[d] - bx.lo[d]) as usize * strides[d];
    }
    off
}

/// Read-only view
#[derive(Debug, Clone, Copy)]
pub struct Array4<'a, T, const D: usize> {
    data: &'a [T],
    bx: IndexBox<D>,
    strides: [usize; D],
    comp_stride: usize,
    ncomp: usize,
}

impl<'a, T: Copy, const D: usize> Array4<'a, T, D> {
    /// View `data` as `ncomp` components over `bx`
    pub fn new(data: &'a [T], bx: IndexBox<D>, ncomp: usize) -> Self {
        let (strides, comp_stride) = strides(&bx);
        debug_assert!(data.len() >= comp_stride * ncomp);
        Self {
            data,
            bx,
            strides,
            comp_stride,
            ncomp,
        }
    }

    #[inline]
    pub fn get(&self, iv: [i32; D]) -> T {
        self.data[offset(&self.bx, &self.strides, iv)]
    }

    #[inline]
    pub fn get_n(&self, iv: [i32; D], n: usize) -> T {
        debug_assert!(n < self.ncomp);
        self.data[n * self.comp_stride + offset(&self.bx, &self.strides, iv)]
    }

    pub fn bounds(&self) -> IndexBox<D> {
        self.bx
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Single-component view of component `n`
    pub fn component(&self, n: usize) -> Array4<'a, T, D> {
        let start = n * self.comp_stride;
        Array4 {
            data: &self.data[start..start + self.comp_stride],
            bx: self.bx,
            strides: self.strides,
            comp_stride: self.comp_stride,
            ncomp: 1,
        }
    }
}

/// Mutable view
#[derive(Debug)]
pub struct Array4Mut<'a, T, const D: usize> {
    data: &'a mut [T],
    bx: IndexBox<D>,
    strides: [usize; D],
    comp_stride: usize,
    ncomp: usize,
}

impl<'a, T: Copy, const D: usize> Array4Mut<'a, T, D> {
    pub fn new(data: &'a mut [T], bx: IndexBox<D>, ncomp: usize) -> Self {
        let (strides, comp_stride) = strides(&bx);
        debug_assert!(data.len() >= comp_stride * ncomp);
        Self {
            data,
            bx,
            strides,
            comp_stride,
            ncomp,
        }
    }

    #[inline]
    pub fn get(&self, iv: [i32; D]) -> T {
        self.data[offset(&self.bx, &self.strides, iv)]
    }

    #[inline]
    pub fn get_n(&self, iv: [i32; D], n: usize) -> T {
        debug_assert!(n < self.ncomp);
        self.data[n * self.comp_stride + offset(&self.bx, &self.strides, iv)]
    }

    #[inline]
    pub fn set(&mut self, iv: [i32; D], v: T) {
        let off = offset(&self.bx, &self.strides, iv);
        self.data[off] = v;
    }

    #[inline]
    pub fn set_n(&mut self, iv: [i32; D], n: usize, v: T) {
        debug_assert!(n < self.ncomp);
        let off = n * self.comp_stride + offset(&self.bx, &self.strides, iv);
        self.data[off] = v;
    }

    pub fn bounds(&self) -> IndexBox<D> {
        self.bx
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> Array4<'_, T, D> {
        Array4 {
            data: &*self.data,
            bx: self.bx,
            strides: self.strides,
            comp_stride: self.comp_stride,
            ncomp: self.ncomp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fortran_layout() {
        let bx = IndexBox::new([-1, 2], [1, 3]);
        let data: Vec<i32> = (0..12).collect();
        let view = Array4::new(&data, bx, 2);
        assert_eq!(view.get([-1, 2]), 0);
        assert_eq!(view.get([0, 2]), 1);
        assert_eq!(view.get([-1, 3]), 3);
        assert_eq!(view.get_n([1, 3], 1), 11);
        assert_eq!(view.component(1).get([-1, 2]), 6);
    }

    #[test]
    fn test_mut_view_roundtrip() {
        let bx = IndexBox::new([0, 0, 0], [1, 1, 1]);
        let mut data = vec![0.0; 8];
        {
            let mut view = Array4Mut::new(&mut data, bx, 1);
            view.set([1, 0, 1], 2.5);
            assert_eq!(view.as_view().get([1, 0, 1]), 2.5);
        }
        assert_eq!(data[5], 2.5);
    }
}
