//! Uniform Cartesian grids in two dimensions.
//!
//! A [`CartesianGridInfo`] describes the grid (cell counts and physical box),
//! a [`CartGrid`] holds the computed topology (signed cell-face and
//! face-node incidence) together with the geometry.
//! Both the uniform grids and any composite grid built from them expose
//! the same attributes through [`GridTopology`].

extern crate nalgebra as na;

pub mod cartesian;
pub mod error;
pub mod grid;

pub use cartesian::{Axis, CartesianGridInfo, Rect};
pub use error::GridError;
pub use grid::{CartGrid, GridTopology};

/// Only planar grids are supported.
pub const DIM: common::Dim = 2;
