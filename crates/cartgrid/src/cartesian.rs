use crate::{error::GridError, grid::CartGrid, DIM};

use common::{sparse::SparseMatrix, Dim};

/// converts linear index to cartesian index
///
/// converts linear index in 0..(nx*ny) to cartesian index in (0,0)..(nx,ny),
/// with the first axis running fastest
pub fn linear_index2cartesian_index(lin_idx: usize, dim_lens: [usize; 2]) -> [usize; 2] {
  [lin_idx % dim_lens[0], lin_idx / dim_lens[0]]
}

/// converts cartesian index to linear index
pub fn cartesian_index2linear_index(cart_idx: [usize; 2], dim_lens: [usize; 2]) -> usize {
  debug_assert!(cart_idx[0] < dim_lens[0] && cart_idx[1] < dim_lens[1]);
  cart_idx[0] + cart_idx[1] * dim_lens[0]
}

/// The coordinate axis a face normal points along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
  X,
  Y,
}
impl Axis {
  pub fn as_usize(self) -> usize {
    match self {
      Axis::X => 0,
      Axis::Y => 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
  min: na::Vector2<f64>,
  max: na::Vector2<f64>,
}

impl Rect {
  pub fn new_min_max(min: na::Vector2<f64>, max: na::Vector2<f64>) -> Self {
    Self { min, max }
  }
  /// Box $[0, l_0] times [0, l_1]$.
  pub fn new_extents(extents: [f64; 2]) -> Self {
    let min = na::Vector2::zeros();
    let max = na::Vector2::from(extents);
    Self { min, max }
  }

  pub fn min(&self) -> &na::Vector2<f64> {
    &self.min
  }
  pub fn max(&self) -> &na::Vector2<f64> {
    &self.max
  }
  pub fn side_lengths(&self) -> na::Vector2<f64> {
    self.max - self.min
  }
}

/// Description of a uniform Cartesian grid.
///
/// Entity numbering, with $(n_x, n_y)$ cells:
/// - node $(i, j)$ is $i + j (n_x + 1)$
/// - cell $(i, j)$ is $i + j n_x$
/// - x-faces (normal along x) come first, x-face $(i, j)$ is $i + j (n_x + 1)$
/// - y-face $(i, j)$ is $(n_x + 1) n_y + i + j n_x$
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianGridInfo {
  rect: Rect,
  ncells_axis: [usize; 2],
}

// constructors
impl CartesianGridInfo {
  pub fn new(ncells_axis: [usize; 2], extents: [f64; 2]) -> Result<Self, GridError> {
    for axis in 0..DIM {
      if ncells_axis[axis] == 0 {
        return Err(GridError::EmptyAxis { axis });
      }
      let extent = extents[axis];
      if !(extent.is_finite() && extent > 0.0) {
        return Err(GridError::InvalidExtent { axis, extent });
      }
    }
    let rect = Rect::new_extents(extents);
    Ok(Self { rect, ncells_axis })
  }

  /// Cells of unit size, the box is as large as the cell counts.
  pub fn new_unit_cells(ncells_axis: [usize; 2]) -> Result<Self, GridError> {
    Self::new(ncells_axis, ncells_axis.map(|n| n as f64))
  }

  /// Same box, twice the resolution along every axis.
  pub fn refined(&self) -> Self {
    Self {
      rect: self.rect.clone(),
      ncells_axis: self.ncells_axis.map(|n| 2 * n),
    }
  }
}

// getters
impl CartesianGridInfo {
  pub fn rect(&self) -> &Rect {
    &self.rect
  }
  pub fn dim(&self) -> Dim {
    DIM
  }
  pub fn side_lengths(&self) -> na::Vector2<f64> {
    self.rect.side_lengths()
  }
  pub fn ncells_axis(&self) -> [usize; 2] {
    self.ncells_axis
  }
  pub fn nnodes_axis(&self) -> [usize; 2] {
    self.ncells_axis.map(|n| n + 1)
  }
  pub fn ncells(&self) -> usize {
    self.ncells_axis.iter().product()
  }
  pub fn nnodes(&self) -> usize {
    self.nnodes_axis().iter().product()
  }
  pub fn nfaces_axis(&self, axis: Axis) -> usize {
    let [nx, ny] = self.ncells_axis;
    match axis {
      Axis::X => (nx + 1) * ny,
      Axis::Y => nx * (ny + 1),
    }
  }
  pub fn nfaces(&self) -> usize {
    self.nfaces_axis(Axis::X) + self.nfaces_axis(Axis::Y)
  }
  /// Cell size along each axis.
  pub fn spacing(&self) -> na::Vector2<f64> {
    let lengths = self.side_lengths();
    na::Vector2::new(
      lengths[0] / self.ncells_axis[0] as f64,
      lengths[1] / self.ncells_axis[1] as f64,
    )
  }

  pub fn cell_idx(&self, cart_idx: [usize; 2]) -> usize {
    cartesian_index2linear_index(cart_idx, self.ncells_axis)
  }
  pub fn cell_cart_idx(&self, icell: usize) -> [usize; 2] {
    linear_index2cartesian_index(icell, self.ncells_axis)
  }
  pub fn node_idx(&self, cart_idx: [usize; 2]) -> usize {
    cartesian_index2linear_index(cart_idx, self.nnodes_axis())
  }
  pub fn node_cart_idx(&self, inode: usize) -> [usize; 2] {
    linear_index2cartesian_index(inode, self.nnodes_axis())
  }
  pub fn face_idx(&self, axis: Axis, cart_idx: [usize; 2]) -> usize {
    let [nx, ny] = self.ncells_axis;
    match axis {
      Axis::X => cartesian_index2linear_index(cart_idx, [nx + 1, ny]),
      Axis::Y => self.nfaces_axis(Axis::X) + cartesian_index2linear_index(cart_idx, [nx, ny + 1]),
    }
  }
  pub fn face_cart_idx(&self, iface: usize) -> (Axis, [usize; 2]) {
    let [nx, ny] = self.ncells_axis;
    let nxfaces = self.nfaces_axis(Axis::X);
    if iface < nxfaces {
      (Axis::X, linear_index2cartesian_index(iface, [nx + 1, ny]))
    } else {
      (
        Axis::Y,
        linear_index2cartesian_index(iface - nxfaces, [nx, ny + 1]),
      )
    }
  }

  pub fn node_pos(&self, inode: usize) -> na::Vector2<f64> {
    let [i, j] = self.node_cart_idx(inode);
    let h = self.spacing();
    self.rect.min() + na::Vector2::new(i as f64 * h[0], j as f64 * h[1])
  }
  pub fn cell_center(&self, icell: usize) -> na::Vector2<f64> {
    let [i, j] = self.cell_cart_idx(icell);
    let h = self.spacing();
    self.rect.min() + na::Vector2::new((i as f64 + 0.5) * h[0], (j as f64 + 0.5) * h[1])
  }
  pub fn face_center(&self, iface: usize) -> na::Vector2<f64> {
    let (axis, [i, j]) = self.face_cart_idx(iface);
    let h = self.spacing();
    let offset = match axis {
      Axis::X => na::Vector2::new(i as f64 * h[0], (j as f64 + 0.5) * h[1]),
      Axis::Y => na::Vector2::new((i as f64 + 0.5) * h[0], j as f64 * h[1]),
    };
    self.rect.min() + offset
  }
  /// Unit normal scaled by the face area, pointing in positive axis direction.
  pub fn face_normal(&self, iface: usize) -> na::Vector2<f64> {
    let (axis, _) = self.face_cart_idx(iface);
    let h = self.spacing();
    match axis {
      Axis::X => na::Vector2::new(h[1], 0.0),
      Axis::Y => na::Vector2::new(0.0, h[0]),
    }
  }

  pub fn is_face_on_boundary(&self, iface: usize) -> bool {
    let [nx, ny] = self.ncells_axis;
    match self.face_cart_idx(iface) {
      (Axis::X, [i, _]) => i == 0 || i == nx,
      (Axis::Y, [_, j]) => j == 0 || j == ny,
    }
  }
}

impl CartesianGridInfo {
  /// Signed cell-face incidence of shape `(nfaces, ncells)`.
  ///
  /// The entry is $+1$ if the face normal points out of the cell (east and
  /// north faces) and $-1$ otherwise (west and south faces).
  pub fn compute_cell_faces(&self) -> SparseMatrix {
    let mut mat = SparseMatrix::zeros(self.nfaces(), self.ncells());
    for icell in 0..self.ncells() {
      let [i, j] = self.cell_cart_idx(icell);
      mat.push(self.face_idx(Axis::X, [i, j]), icell, -1);
      mat.push(self.face_idx(Axis::X, [i + 1, j]), icell, 1);
      mat.push(self.face_idx(Axis::Y, [i, j]), icell, -1);
      mat.push(self.face_idx(Axis::Y, [i, j + 1]), icell, 1);
    }
    mat
  }

  /// Unsigned face-node incidence of shape `(nnodes, nfaces)`.
  pub fn compute_face_nodes(&self) -> SparseMatrix {
    let mut mat = SparseMatrix::zeros(self.nnodes(), self.nfaces());
    for iface in 0..self.nfaces() {
      let (axis, [i, j]) = self.face_cart_idx(iface);
      let other = match axis {
        Axis::X => [i, j + 1],
        Axis::Y => [i + 1, j],
      };
      mat.push(self.node_idx([i, j]), iface, 1);
      mat.push(self.node_idx(other), iface, 1);
    }
    mat
  }

  pub fn compute_grid(&self) -> CartGrid {
    let columns = |n: usize, f: &dyn Fn(usize) -> na::Vector2<f64>| {
      let mut mat = na::DMatrix::zeros(DIM, n);
      for (i, mut col) in mat.column_iter_mut().enumerate() {
        col.copy_from(&f(i));
      }
      mat
    };

    let nodes = columns(self.nnodes(), &|i| self.node_pos(i));
    let cell_centers = columns(self.ncells(), &|i| self.cell_center(i));
    let face_centers = columns(self.nfaces(), &|i| self.face_center(i));
    let face_normals = columns(self.nfaces(), &|i| self.face_normal(i));
    let face_areas = face_normals.column_iter().map(|n| n.norm()).collect::<Vec<_>>();
    let cell_volume = self.spacing().product();

    CartGrid::new(
      self.clone(),
      nodes,
      cell_centers,
      face_centers,
      face_normals,
      na::DVector::from_vec(face_areas),
      na::DVector::from_element(self.ncells(), cell_volume),
      self.compute_cell_faces().to_incidence(),
      self.compute_face_nodes().to_incidence(),
    )
  }
}
