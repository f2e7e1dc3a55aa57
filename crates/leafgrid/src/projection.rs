//! Incidence between two adjacent levels of the grid hierarchy.
//!
//! Refinement is an exact doubling along both axes, so fine entity $(i, j)$
//! always descends from coarse entity $(i/2, j/2)$ if it has a coarse
//! counterpart at all. Whether it has one is decided by index parity alone,
//! no geometric search is needed.
//!
//! All projections have shape `(nfine, ncoarse)`: entry $(e, e')$ is one
//! iff fine entity $e$ belongs to coarse entity $e'$.

use cartgrid::{Axis, CartesianGridInfo};
use common::sparse::{IncidenceMatrix, SparseMatrix};

use std::fmt;

/// The kinds of mesh entities that are projected between levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
  Cell,
  Face,
  Node,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Entity::Cell => "cell",
      Entity::Face => "face",
      Entity::Node => "node",
    };
    f.write_str(name)
  }
}

pub fn project(entity: Entity, coarse: &CartesianGridInfo) -> IncidenceMatrix {
  match entity {
    Entity::Cell => project_cells(coarse),
    Entity::Face => project_faces(coarse),
    Entity::Node => project_nodes(coarse),
  }
}

/// Every coarse cell is quartered into a 2x2 block of fine cells.
pub fn project_cells(coarse: &CartesianGridInfo) -> IncidenceMatrix {
  let fine = coarse.refined();
  let mut mat = SparseMatrix::zeros(fine.ncells(), coarse.ncells());
  for ifine in 0..fine.ncells() {
    let [i, j] = fine.cell_cart_idx(ifine);
    mat.push(ifine, coarse.cell_idx([i / 2, j / 2]), 1);
  }
  mat.to_incidence()
}

/// Fine faces lying on a coarse face map to it, two halves per coarse face.
///
/// A fine face lies on the coarse skeleton iff its index across the normal
/// direction is even. The others cut through the interior of a coarse cell
/// and have no coarse counterpart.
pub fn project_faces(coarse: &CartesianGridInfo) -> IncidenceMatrix {
  let fine = coarse.refined();
  let mut mat = SparseMatrix::zeros(fine.nfaces(), coarse.nfaces());
  for ifine in 0..fine.nfaces() {
    let (axis, [i, j]) = fine.face_cart_idx(ifine);
    let on_coarse_skeleton = match axis {
      Axis::X => i % 2 == 0,
      Axis::Y => j % 2 == 0,
    };
    if on_coarse_skeleton {
      mat.push(ifine, coarse.face_idx(axis, [i / 2, j / 2]), 1);
    }
  }
  mat.to_incidence()
}

/// Fine nodes at even positions coincide with a coarse node.
///
/// Edge midpoints and coarse cell centers are new and map to nothing.
pub fn project_nodes(coarse: &CartesianGridInfo) -> IncidenceMatrix {
  let fine = coarse.refined();
  let mut mat = SparseMatrix::zeros(fine.nnodes(), coarse.nnodes());
  for ifine in 0..fine.nnodes() {
    let [i, j] = fine.node_cart_idx(ifine);
    if i % 2 == 0 && j % 2 == 0 {
      mat.push(ifine, coarse.node_idx([i / 2, j / 2]), 1);
    }
  }
  mat.to_incidence()
}
