//! Box sides

/// Low or high side of a box along one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Low,
    High,
}

impl Side {
    /// Both sides, low first
    pub const BOTH: [Side; 2] = [Side::Low, Side::High];

    /// 0 for low, 1 for high
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Low => 0,
            Side::High => 1,
        }
    }

    /// Outward unit step along the direction
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Side::Low => -1,
            Side::High => 1,
        }
    }
}

/// A (direction, side) pair naming one of the `2*D` sides of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Orientation {
    /// Direction index in `0..D`
    pub dir: usize,
    /// Low or high side
    pub side: Side,
}

impl Orientation {
    pub fn new(dir: usize, side: Side) -> Self {
        Self { dir, side }
    }

    pub fn low(dir: usize) -> Self {
        Self::new(dir, Side::Low)
    }

    pub fn high(dir: usize) -> Self {
        Self::new(dir, Side::High)
    }

    /// Flat index `2*dir + side`, used for per-side storage
    #[inline]
    pub fn index(self) -> usize {
        2 * self.dir + self.side.index()
    }

    /// All orientations of a `D`-dimensional box in storage order
    pub fn all<const D: usize>() -> impl Iterator<Item = Orientation> {
        (0..D).flat_map(|dir| Side::BOTH.into_iter().map(move |side| Orientation { dir, side }))
    }
}
