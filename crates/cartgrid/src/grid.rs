use crate::{cartesian::CartesianGridInfo, DIM};

use common::{
  sparse::IncidenceMatrix,
  util::{flags_to_indicies, indicies_to_flags},
  Dim,
};

/// The attribute set every grid exposes to discretizations.
///
/// Coordinates are stored column-wise, one column per entity.
/// `cell_faces` has shape `(num_faces, num_cells)` and is signed,
/// `face_nodes` has shape `(num_nodes, num_faces)` and is unsigned.
pub trait GridTopology {
  fn nodes(&self) -> &na::DMatrix<f64>;
  fn cell_centers(&self) -> &na::DMatrix<f64>;
  fn face_centers(&self) -> &na::DMatrix<f64>;
  fn face_normals(&self) -> &na::DMatrix<f64>;
  fn face_areas(&self) -> &na::DVector<f64>;
  fn cell_volumes(&self) -> &na::DVector<f64>;
  fn cell_faces(&self) -> &IncidenceMatrix;
  fn face_nodes(&self) -> &IncidenceMatrix;

  fn dim(&self) -> Dim {
    DIM
  }
  fn num_cells(&self) -> usize {
    self.cell_faces().ncols()
  }
  fn num_faces(&self) -> usize {
    self.cell_faces().nrows()
  }
  fn num_nodes(&self) -> usize {
    self.face_nodes().nrows()
  }

  /// Faces with only a single adjacent cell.
  fn boundary_faces(&self) -> Vec<usize> {
    self
      .cell_faces()
      .row_nnz()
      .into_iter()
      .enumerate()
      .filter_map(|(iface, ncells)| (ncells == 1).then_some(iface))
      .collect()
  }

  /// Nodes of the boundary faces.
  fn boundary_nodes(&self) -> Vec<usize> {
    let faces = indicies_to_flags(&self.boundary_faces(), self.num_faces());
    flags_to_indicies(&self.face_nodes().apply(&faces))
  }

  /// Unsigned node-cell incidence of shape `(num_nodes, num_cells)`.
  fn cell_nodes(&self) -> IncidenceMatrix {
    (&self.face_nodes().abs() * &self.cell_faces().abs()).pattern()
  }
}

/// A uniform Cartesian grid with topology and geometry.
#[derive(Debug, Clone)]
pub struct CartGrid {
  info: CartesianGridInfo,
  nodes: na::DMatrix<f64>,
  cell_centers: na::DMatrix<f64>,
  face_centers: na::DMatrix<f64>,
  face_normals: na::DMatrix<f64>,
  face_areas: na::DVector<f64>,
  cell_volumes: na::DVector<f64>,
  cell_faces: IncidenceMatrix,
  face_nodes: IncidenceMatrix,
}

impl CartGrid {
  #[allow(clippy::too_many_arguments)]
  pub(crate) fn new(
    info: CartesianGridInfo,
    nodes: na::DMatrix<f64>,
    cell_centers: na::DMatrix<f64>,
    face_centers: na::DMatrix<f64>,
    face_normals: na::DMatrix<f64>,
    face_areas: na::DVector<f64>,
    cell_volumes: na::DVector<f64>,
    cell_faces: IncidenceMatrix,
    face_nodes: IncidenceMatrix,
  ) -> Self {
    Self {
      info,
      nodes,
      cell_centers,
      face_centers,
      face_normals,
      face_areas,
      cell_volumes,
      cell_faces,
      face_nodes,
    }
  }

  pub fn info(&self) -> &CartesianGridInfo {
    &self.info
  }
  pub fn ncells_axis(&self) -> [usize; 2] {
    self.info.ncells_axis()
  }
}

impl GridTopology for CartGrid {
  fn nodes(&self) -> &na::DMatrix<f64> {
    &self.nodes
  }
  fn cell_centers(&self) -> &na::DMatrix<f64> {
    &self.cell_centers
  }
  fn face_centers(&self) -> &na::DMatrix<f64> {
    &self.face_centers
  }
  fn face_normals(&self) -> &na::DMatrix<f64> {
    &self.face_normals
  }
  fn face_areas(&self) -> &na::DVector<f64> {
    &self.face_areas
  }
  fn cell_volumes(&self) -> &na::DVector<f64> {
    &self.cell_volumes
  }
  fn cell_faces(&self) -> &IncidenceMatrix {
    &self.cell_faces
  }
  fn face_nodes(&self) -> &IncidenceMatrix {
    &self.face_nodes
  }
}
