//! Field storage and the views kernels operate on

mod array4;
mod fab;
mod multifab;

pub use array4::*;
pub use fab::*;
pub use multifab::*;
