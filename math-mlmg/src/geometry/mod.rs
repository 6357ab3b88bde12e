//! Block-structured grid description
//!
//! Index boxes, the box arrays that tile a level, owner assignment and the
//! per-level physical geometry.

mod box_array;
mod index_box;
mod level;
mod orientation;

pub use box_array::*;
pub use index_box::*;
pub use level::*;
pub use orientation::*;
