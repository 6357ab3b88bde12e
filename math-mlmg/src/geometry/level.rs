//! Per-level geometry

use super::index_box::IndexBox;

/// Problem domain, cell size and periodicity of one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGeometry<const D: usize> {
    /// Index domain of the level
    pub domain: IndexBox<D>,
    /// Cell size per direction
    pub dx: [f64; D],
    /// Periodic directions
    pub periodic: [bool; D],
}

impl<const D: usize> LevelGeometry<D> {
    pub fn new(domain: IndexBox<D>, dx: [f64; D], periodic: [bool; D]) -> Self {
        Self {
            domain,
            dx,
            periodic,
        }
    }

    /// Unit-square style geometry: `domain` mapped onto a physical length
    /// `prob_len[d]` in each direction
    pub fn from_lengths(domain: IndexBox<D>, prob_len: [f64; D], periodic: [bool; D]) -> Self {
        let dx = std::array::from_fn(|d| prob_len[d] / domain.len(d).max(1) as f64);
        Self::new(domain, dx, periodic)
    }

    pub fn inv_dx(&self) -> [f64; D] {
        std::array::from_fn(|d| 1.0 / self.dx[d])
    }

    pub fn is_periodic(&self, dir: usize) -> bool {
        self.periodic[dir]
    }

    /// Geometry of the level coarsened by `r`
    pub fn coarsen(&self, r: i32) -> Self {
        Self {
            domain: self.domain.coarsen(r),
            dx: std::array::from_fn(|d| self.dx[d] * r as f64),
            periodic: self.periodic,
        }
    }

    /// Geometry of the level refined by `r`
    pub fn refine(&self, r: i32) -> Self {
        Self {
            domain: self.domain.refine(r),
            dx: std::array::from_fn(|d| self.dx[d] / r as f64),
            periodic: self.periodic,
        }
    }
}
