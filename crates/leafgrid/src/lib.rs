//! Locally refined Cartesian grids.
//!
//! A [`LeafGrid`] is built from a [`GridHierarchy`] of uniform grids with
//! doubling resolution. Its cells are the active cells of all levels, and
//! its topology is assembled from the level grids by sparse incidence
//! products, see [`assemble()`].

extern crate nalgebra as na;

pub mod active;
pub mod assemble;
pub mod error;
pub mod hierarchy;
pub mod leaf;
pub mod mask;
pub mod projection;
pub mod region;
pub mod stack;

pub use active::ActiveCells;
pub use assemble::{assemble, LeafState};
pub use error::LeafGridError;
pub use hierarchy::GridHierarchy;
pub use leaf::{LeafGrid, LeafGridInfo};
pub use mask::RefineMask;
pub use projection::Entity;
pub use region::RegionMap;
pub use stack::ProjectionStack;
