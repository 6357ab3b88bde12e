//! Box arrays and their owner assignment

use super::index_box::IndexBox;

/// The disjoint valid boxes of one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxArray<const D: usize> {
    boxes: Vec<IndexBox<D>>,
}

impl<const D: usize> BoxArray<D> {
    pub fn new(boxes: Vec<IndexBox<D>>) -> Self {
        Self { boxes }
    }

    /// Single-box array
    pub fn single(bx: IndexBox<D>) -> Self {
        Self { boxes: vec![bx] }
    }

    /// Chop `domain` into boxes of at most `max_size` cells per direction
    pub fn chopped(domain: IndexBox<D>, max_size: i32) -> Self {
        let step = max_size.max(1);
        let counts: [i32; D] = std::array::from_fn(|d| (domain.len(d) + step - 1) / step);
        let tiles = IndexBox::new([0; D], std::array::from_fn(|d| counts[d] - 1));
        let boxes = tiles
            .cells()
            .map(|t| {
                let lo: [i32; D] = std::array::from_fn(|d| domain.lo[d] + t[d] * step);
                let hi: [i32; D] = std::array::from_fn(|d| (lo[d] + step - 1).min(domain.hi[d]));
                IndexBox::new(lo, hi)
            })
            .collect();
        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, i: usize) -> IndexBox<D> {
        self.boxes[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexBox<D>> {
        self.boxes.iter()
    }

    pub fn boxes(&self) -> &[IndexBox<D>] {
        &self.boxes
    }

    pub fn coarsen(&self, r: i32) -> Self {
        Self {
            boxes: self.boxes.iter().map(|b| b.coarsen(r)).collect(),
        }
    }

    pub fn coarsenable(&self, r: i32, min_width: i32) -> bool {
        self.boxes.iter().all(|b| b.coarsenable(r, min_width))
    }

    /// Index of the box containing `iv`, if any
    pub fn find(&self, iv: [i32; D]) -> Option<usize> {
        self.boxes.iter().position(|b| b.contains(iv))
    }

    pub fn covers(&self, iv: [i32; D]) -> bool {
        self.find(iv).is_some()
    }

    /// Total number of cells
    pub fn num_pts(&self) -> usize {
        self.boxes.iter().map(|b| b.num_pts()).sum()
    }
}

/// Owner rank of each box of a [`BoxArray`]
///
/// Carried through the operator unchanged; only its length is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionMapping {
    ranks: Vec<usize>,
}

impl DistributionMapping {
    pub fn new(ranks: Vec<usize>) -> Self {
        Self { ranks }
    }

    /// Assign `nboxes` boxes to `nprocs` owners in turn
    pub fn round_robin(nboxes: usize, nprocs: usize) -> Self {
        let nprocs = nprocs.max(1);
        Self {
            ranks: (0..nboxes).map(|i| i % nprocs).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn rank(&self, i: usize) -> usize {
        self.ranks[i]
    }
}
