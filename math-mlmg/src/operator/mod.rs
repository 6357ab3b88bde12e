//! Cell-centered operator layer
//!
//! [`CellAbecLap`] combines the level hierarchy, boundary couplings and a
//! coefficient provider ([`AbecPhysics`]) into the level operations a
//! multigrid or Krylov driver consumes.

mod abec_laplacian;
mod average;
mod backend;
mod cell_abec;
mod cg;
mod constant;
mod hierarchy;
mod info;
mod physics;

pub use abec_laplacian::*;
pub use average::*;
pub use backend::*;
pub use cell_abec::*;
pub use cg::*;
pub use constant::*;
pub use hierarchy::*;
pub use info::*;
pub use physics::*;
