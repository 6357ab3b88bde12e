//! Boundary conditions and the per-box couplings the smoother reads

mod bc;
mod coupling;

pub use bc::*;
pub use coupling::*;
