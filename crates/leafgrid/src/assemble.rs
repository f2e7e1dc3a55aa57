//! Assembly of the leaf grid from the active cells of every level.
//!
//! Topology is never patched. Each level contributes the incidence of its
//! active entities, and the contributions of coarser levels are pushed
//! down the hierarchy with the single-level projections, so a coarse cell
//! ends up incident to the finer half-faces that replaced one of its faces.

use crate::{
  active::ActiveCells,
  error::LeafGridError,
  hierarchy::GridHierarchy,
  projection::Entity,
  region::RegionMap,
  stack::ProjectionStack,
};

use cartgrid::{CartGrid, GridTopology};
use common::{
  sparse::IncidenceMatrix,
  util::{concat_selected_columns, concat_selected_entries, count_flags},
};

use itertools::Itertools;
use tracing::debug;

/// Complete state of a leaf grid: topology, geometry and the projections
/// of the active entities onto the level grids.
#[derive(Debug, Clone)]
pub struct LeafState {
  active: ActiveCells,
  cell_level: Vec<usize>,
  projections: ProjectionStack,

  nodes: na::DMatrix<f64>,
  cell_centers: na::DMatrix<f64>,
  face_centers: na::DMatrix<f64>,
  face_normals: na::DMatrix<f64>,
  face_areas: na::DVector<f64>,
  cell_volumes: na::DVector<f64>,
  cell_faces: IncidenceMatrix,
  face_nodes: IncidenceMatrix,
}

impl LeafState {
  /// Leaf grid consisting of level 0 only.
  pub fn coarsest(hierarchy: &GridHierarchy) -> Result<Self, LeafGridError> {
    assemble(hierarchy, ActiveCells::coarsest(hierarchy))
  }

  pub fn active(&self) -> &ActiveCells {
    &self.active
  }
  /// Level of every active cell.
  pub fn cell_level(&self) -> &[usize] {
    &self.cell_level
  }
  pub fn projections(&self) -> &ProjectionStack {
    &self.projections
  }
}

impl GridTopology for LeafState {
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

/// Builds the leaf grid made of the given active cells.
///
/// The active cells must tile the domain, and wherever a coarse face
/// borders refined cells both of its halves must be covered.
pub fn assemble(hierarchy: &GridHierarchy, active: ActiveCells) -> Result<LeafState, LeafGridError> {
  active.check_shapes(hierarchy)?;
  check_tiling(hierarchy, &active)?;

  let face_masks = active_faces(hierarchy, &active)?;
  let node_masks = active_nodes(hierarchy, &face_masks);

  let cells = RegionMap::new(active.masks().to_vec());
  let faces = RegionMap::new(face_masks);
  let nodes = RegionMap::new(node_masks);

  let cell_faces = stitch(hierarchy, Entity::Face, &cells, &faces, |grid| grid.cell_faces());
  let face_nodes = stitch(hierarchy, Entity::Node, &faces, &nodes, |grid| grid.face_nodes());

  let grids = hierarchy.grids();
  let columns = |map: &RegionMap, attr: fn(&CartGrid) -> &na::DMatrix<f64>| {
    let blocks = grids
      .iter()
      .enumerate()
      .map(|(level, grid)| (attr(grid), map.mask(level)))
      .collect_vec();
    concat_selected_columns(&blocks, hierarchy.level(0).dim())
  };
  let entries = |map: &RegionMap, attr: fn(&CartGrid) -> &na::DVector<f64>| {
    let blocks = grids
      .iter()
      .enumerate()
      .map(|(level, grid)| (attr(grid), map.mask(level)))
      .collect_vec();
    concat_selected_entries(&blocks)
  };

  let cell_level = (0..hierarchy.nlevels())
    .flat_map(|level| itertools::repeat_n(level, cells.count(level)))
    .collect_vec();

  debug!(
    "assembled leaf grid: {} cells, {} faces, {} nodes, cells per level {:?}",
    cells.nactive(),
    faces.nactive(),
    nodes.nactive(),
    (0..hierarchy.nlevels()).map(|l| cells.count(l)).collect_vec(),
  );

  let projections = ProjectionStack::from_region_maps(hierarchy, &cells, &faces, &nodes);

  Ok(LeafState {
    cell_level,
    projections,
    nodes: columns(&nodes, |g| g.nodes()),
    cell_centers: columns(&cells, |g| g.cell_centers()),
    face_centers: columns(&faces, |g| g.face_centers()),
    face_normals: columns(&faces, |g| g.face_normals()),
    face_areas: entries(&faces, |g| g.face_areas()),
    cell_volumes: entries(&cells, |g| g.cell_volumes()),
    cell_faces,
    face_nodes,
    active,
  })
}

/// Every finest cell must lie in exactly one active cell.
fn check_tiling(hierarchy: &GridHierarchy, active: &ActiveCells) -> Result<(), LeafGridError> {
  let mut coverage = active.mask(0).iter().map(|&a| a as i32).collect_vec();
  for level in 1..hierarchy.nlevels() {
    coverage = hierarchy
      .projection(Entity::Cell, level - 1)
      .mul_vec(&coverage);
    for (c, &a) in coverage.iter_mut().zip(active.mask(level)) {
      *c += a as i32;
    }
  }

  let level = hierarchy.finest_level();
  for (cell, &c) in coverage.iter().enumerate() {
    match c {
      1 => {}
      0 => {
        return Err(LeafGridError::IncompleteRefinement {
          level,
          entity: Entity::Cell,
          index: cell,
        })
      }
      _ => return Err(LeafGridError::OverlappingCells { level, cell }),
    }
  }
  Ok(())
}

/// Active faces per level.
///
/// A face touching an active cell is active unless it was split, meaning
/// finer faces on its children replace it. Walks bottom-up, carrying the
/// faces that are covered by the finer levels.
fn active_faces(
  hierarchy: &GridHierarchy,
  active: &ActiveCells,
) -> Result<Vec<Vec<bool>>, LeafGridError> {
  let touched = hierarchy
    .grids()
    .iter()
    .zip(active.masks())
    .map(|(grid, cells)| grid.cell_faces().apply(cells))
    .collect_vec();

  let finest = hierarchy.finest_level();
  let mut masks = vec![Vec::new(); hierarchy.nlevels()];
  masks[finest] = touched[finest].clone();
  let mut below = touched[finest].clone();

  for level in (0..finest).rev() {
    let below_int = below.iter().map(|&b| b as i32).collect_vec();
    let nchildren = hierarchy
      .projection(Entity::Face, level)
      .transpose()
      .mul_vec(&below_int);

    // only reachable for active cells that do not tile the domain
    if let Some(index) = nchildren.iter().position(|&n| n == 1) {
      return Err(LeafGridError::IncompleteRefinement {
        level,
        entity: Entity::Face,
        index,
      });
    }
    let split = nchildren.iter().map(|&n| n > 0).collect_vec();
    debug!("level {level}: {} split faces", count_flags(&split));

    masks[level] = touched[level]
      .iter()
      .zip(&split)
      .map(|(&t, &s)| t && !s)
      .collect();
    below = touched[level]
      .iter()
      .zip(&split)
      .map(|(&t, &s)| t || s)
      .collect();
  }
  Ok(masks)
}

/// Active nodes per level. A node belongs to the finest level whose
/// active faces touch it.
fn active_nodes(hierarchy: &GridHierarchy, face_masks: &[Vec<bool>]) -> Vec<Vec<bool>> {
  let touched = hierarchy
    .grids()
    .iter()
    .zip(face_masks)
    .map(|(grid, faces)| grid.face_nodes().apply(faces))
    .collect_vec();

  let finest = hierarchy.finest_level();
  let mut masks = vec![Vec::new(); hierarchy.nlevels()];
  masks[finest] = touched[finest].clone();
  let mut below = touched[finest].clone();

  for level in (0..finest).rev() {
    let covered = hierarchy
      .projection(Entity::Node, level)
      .transpose()
      .apply(&below);
    masks[level] = touched[level]
      .iter()
      .zip(&covered)
      .map(|(&t, &c)| t && !c)
      .collect();
    below = touched[level]
      .iter()
      .zip(&covered)
      .map(|(&t, &c)| t || c)
      .collect();
  }
  masks
}

/// Leaf incidence between the `upper` entities (columns) and the `lower`
/// entities (rows).
///
/// $X_0 = A_0 R^u_0$ and $X_l = P_(l-1) X_(l-1) + A_l R^u_l$ collect on
/// every level the incidence of all active upper entities of that level or
/// coarser. The leaf incidence keeps the rows of the active lower entities,
/// $sum_l (R^l_l)^T X_l$.
fn stitch(
  hierarchy: &GridHierarchy,
  lower: Entity,
  upper_map: &RegionMap,
  lower_map: &RegionMap,
  incidence: impl Fn(&CartGrid) -> &IncidenceMatrix,
) -> IncidenceMatrix {
  let mut result = IncidenceMatrix::zeros(lower_map.nactive(), upper_map.nactive());
  let mut inherited: Option<IncidenceMatrix> = None;

  for (level, grid) in hierarchy.grids().iter().enumerate() {
    let own = incidence(grid) * upper_map.level(level);
    let x = match inherited {
      None => own,
      Some(prev) => &(hierarchy.projection(lower, level - 1) * &prev) + &own,
    };
    result = &result + &(&lower_map.level(level).transpose() * &x);
    inherited = Some(x);
  }
  result
}

#[cfg(test)]
mod test {
  use super::{active_faces, assemble, LeafState};
  use crate::{
    active::ActiveCells, error::LeafGridError, hierarchy::GridHierarchy, projection::Entity,
  };

  use cartgrid::{CartesianGridInfo, GridTopology};

  fn hierarchy(nlevels: usize) -> GridHierarchy {
    let base = CartesianGridInfo::new([2, 2], [1.0, 1.0]).unwrap();
    GridHierarchy::new(base, nlevels).unwrap()
  }

  #[test]
  fn coarsest_is_level_zero() {
    let hierarchy = hierarchy(3);
    let state = LeafState::coarsest(&hierarchy).unwrap();
    let level0 = hierarchy.level(0);
    assert_eq!(state.cell_faces(), level0.cell_faces());
    assert_eq!(state.face_nodes(), level0.face_nodes());
    assert_eq!(state.nodes(), level0.nodes());
    assert_eq!(state.face_normals(), level0.face_normals());
    assert_eq!(state.cell_level(), &[0; 4]);
  }

  #[test]
  fn all_fine_is_level_one() {
    let hierarchy = hierarchy(2);
    let active = ActiveCells::from_masks(&hierarchy, vec![vec![false; 4], vec![true; 16]]).unwrap();
    let state = assemble(&hierarchy, active).unwrap();
    let level1 = hierarchy.level(1);
    assert_eq!(state.cell_faces(), level1.cell_faces());
    assert_eq!(state.face_nodes(), level1.face_nodes());
    assert_eq!(state.cell_centers(), level1.cell_centers());
    assert_eq!(state.cell_level(), &[1; 16]);
  }

  #[test]
  fn gaps_and_overlaps_are_rejected() {
    let hierarchy = hierarchy(2);

    let mut fine = vec![false; 16];
    for ifine in [0, 1, 4] {
      fine[ifine] = true;
    }
    let gap = ActiveCells::from_masks(&hierarchy, vec![vec![false, true, true, true], fine]).unwrap();
    assert_eq!(
      assemble(&hierarchy, gap).unwrap_err(),
      LeafGridError::IncompleteRefinement {
        level: 1,
        entity: Entity::Cell,
        index: 5
      }
    );

    let mut fine = vec![false; 16];
    fine[0] = true;
    let overlap = ActiveCells::from_masks(&hierarchy, vec![vec![true; 4], fine]).unwrap();
    assert_eq!(
      assemble(&hierarchy, overlap).unwrap_err(),
      LeafGridError::OverlappingCells { level: 1, cell: 0 }
    );
  }

  #[test]
  fn half_covered_face_is_rejected() {
    let hierarchy = hierarchy(2);

    // a lone fine corner cell covers only one half of the coarse west face
    let mut fine = vec![false; 16];
    fine[0] = true;
    let active = ActiveCells::from_masks(&hierarchy, vec![vec![false; 4], fine]).unwrap();
    assert_eq!(
      active_faces(&hierarchy, &active).unwrap_err(),
      LeafGridError::IncompleteRefinement {
        level: 0,
        entity: Entity::Face,
        index: 0
      }
    );
  }

  #[test]
  fn refined_corner_topology() {
    let hierarchy = hierarchy(2);
    let active = ActiveCells::coarsest(&hierarchy).refine(&hierarchy, 0, &[true, false, false, false]);
    let state = assemble(&hierarchy, active).unwrap();

    assert_eq!(state.num_cells(), 7);
    assert_eq!(state.num_faces(), 20);
    assert_eq!(state.num_nodes(), 14);
    assert_eq!(state.cell_level(), &[0, 0, 0, 1, 1, 1, 1]);

    // the coarse neighbours of the refined corner see two half-faces
    assert_eq!(state.cell_faces().col_nnz(), vec![5, 5, 4, 4, 4, 4, 4]);
    assert!(state.face_nodes().col_nnz().iter().all(|&n| n == 2));
  }
}
