use crate::{
  error::LeafGridError,
  projection::{self, Entity},
};

use cartgrid::{CartGrid, CartesianGridInfo, GridTopology};
use common::sparse::IncidenceMatrix;

/// The fixed stack of uniform grids, level `l` having `2^l` times the base
/// resolution along every axis.
///
/// Level grids are built once and never change.
#[derive(Debug, Clone)]
pub struct GridHierarchy {
  grids: Vec<CartGrid>,
  /// Single-level projections, entry `l` goes from level `l` to `l + 1`.
  projections: Vec<LevelProjections>,
}

#[derive(Debug, Clone)]
struct LevelProjections {
  cells: IncidenceMatrix,
  faces: IncidenceMatrix,
  nodes: IncidenceMatrix,
}
impl LevelProjections {
  fn get(&self, entity: Entity) -> &IncidenceMatrix {
    match entity {
      Entity::Cell => &self.cells,
      Entity::Face => &self.faces,
      Entity::Node => &self.nodes,
    }
  }
}

impl GridHierarchy {
  pub fn new(base: CartesianGridInfo, nlevels: usize) -> Result<Self, LeafGridError> {
    if nlevels == 0 {
      return Err(LeafGridError::NoLevels);
    }

    let infos: Vec<_> = std::iter::successors(Some(base), |info| Some(info.refined()))
      .take(nlevels)
      .collect();

    let projections = infos[..nlevels - 1]
      .iter()
      .map(|coarse| LevelProjections {
        cells: projection::project_cells(coarse),
        faces: projection::project_faces(coarse),
        nodes: projection::project_nodes(coarse),
      })
      .collect();
    let grids = infos.iter().map(|info| info.compute_grid()).collect();

    Ok(Self { grids, projections })
  }

  pub fn nlevels(&self) -> usize {
    self.grids.len()
  }
  pub fn finest_level(&self) -> usize {
    self.nlevels() - 1
  }
  pub fn grids(&self) -> &[CartGrid] {
    &self.grids
  }
  /// Panics if the level does not exist.
  pub fn level(&self, level: usize) -> &CartGrid {
    &self.grids[level]
  }
  pub fn try_level(&self, level: usize) -> Result<&CartGrid, LeafGridError> {
    self.check_level(level)?;
    Ok(&self.grids[level])
  }
  pub fn mesh_size(&self, level: usize) -> Option<[usize; 2]> {
    self.grids.get(level).map(|g| g.ncells_axis())
  }

  pub fn nentities(&self, entity: Entity, level: usize) -> usize {
    let grid = self.level(level);
    match entity {
      Entity::Cell => grid.num_cells(),
      Entity::Face => grid.num_faces(),
      Entity::Node => grid.num_nodes(),
    }
  }

  pub fn check_level(&self, level: usize) -> Result<(), LeafGridError> {
    if level < self.nlevels() {
      Ok(())
    } else {
      Err(LeafGridError::LevelOutOfRange {
        level,
        nlevels: self.nlevels(),
      })
    }
  }

  /// Cached projection from `level` to `level + 1`.
  pub(crate) fn projection(&self, entity: Entity, level: usize) -> &IncidenceMatrix {
    self.projections[level].get(entity)
  }
}

/// Inter-level projections. Freshly computed on every call.
impl GridHierarchy {
  pub fn proj_level(
    &self,
    entity: Entity,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    if level1 as isize - level0 as isize != 1 {
      return Err(LeafGridError::InvalidLevelGap { level0, level1 });
    }
    self.check_level(level1)?;
    Ok(projection::project(entity, self.level(level0).info()))
  }

  /// Maps every fine cell of `level1` to its parent on `level0`.
  pub fn cell_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.proj_level(Entity::Cell, level0, level1)
  }
  pub fn face_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.proj_level(Entity::Face, level0, level1)
  }
  pub fn node_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.proj_level(Entity::Node, level0, level1)
  }
}

#[cfg(test)]
mod test {
  use super::GridHierarchy;
  use crate::error::LeafGridError;

  use cartgrid::{CartesianGridInfo, GridTopology};

  fn hierarchy(nlevels: usize) -> GridHierarchy {
    let base = CartesianGridInfo::new([2, 2], [1.0, 1.0]).unwrap();
    GridHierarchy::new(base, nlevels).unwrap()
  }

  #[test]
  fn strict_doubling() {
    let hierarchy = hierarchy(3);
    assert_eq!(hierarchy.mesh_size(0), Some([2, 2]));
    assert_eq!(hierarchy.mesh_size(1), Some([4, 4]));
    assert_eq!(hierarchy.mesh_size(2), Some([8, 8]));
    assert_eq!(hierarchy.mesh_size(3), None);
    assert_eq!(hierarchy.level(2).num_cells(), 64);
  }

  #[test]
  fn children_of_first_cell() {
    let proj = hierarchy(2).cell_proj_level(0, 1).unwrap();
    assert_eq!(proj.shape(), (16, 4));
    let children: Vec<_> = (0..16).filter(|&r| proj.get(r, 0) == 1).collect();
    assert_eq!(children, vec![0, 1, 4, 5]);
    assert!(proj.col_nnz().iter().all(|&n| n == 4));
  }

  #[test]
  fn only_adjacent_levels() {
    let hierarchy = hierarchy(3);
    assert_eq!(
      hierarchy.cell_proj_level(0, 2),
      Err(LeafGridError::InvalidLevelGap {
        level0: 0,
        level1: 2
      })
    );
    assert_eq!(
      hierarchy.face_proj_level(1, 0),
      Err(LeafGridError::InvalidLevelGap {
        level0: 1,
        level1: 0
      })
    );
    assert_eq!(
      hierarchy.node_proj_level(2, 3),
      Err(LeafGridError::LevelOutOfRange {
        level: 3,
        nlevels: 3
      })
    );
    assert!(hierarchy.node_proj_level(1, 2).is_ok());
  }

  #[test]
  fn cached_projections_match() {
    let hierarchy = hierarchy(3);
    for level in 0..2 {
      for entity in [
        crate::projection::Entity::Cell,
        crate::projection::Entity::Face,
        crate::projection::Entity::Node,
      ] {
        let fresh = hierarchy.proj_level(entity, level, level + 1).unwrap();
        assert_eq!(&fresh, hierarchy.projection(entity, level));
      }
    }
  }

  #[test]
  fn no_levels() {
    let base = CartesianGridInfo::new_unit_cells([1, 1]).unwrap();
    assert_eq!(
      GridHierarchy::new(base, 0).unwrap_err(),
      LeafGridError::NoLevels
    );
  }
}
