use crate::{
  active::ActiveCells,
  assemble::{assemble, LeafState},
  error::LeafGridError,
  hierarchy::GridHierarchy,
  mask::RefineMask,
  projection::Entity,
  stack::ProjectionStack,
};

use cartgrid::{CartGrid, CartesianGridInfo, GridTopology};
use common::{sparse::IncidenceMatrix, util::count_flags};

use itertools::Itertools;
use tracing::{info, warn};

/// Parameters of a leaf grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafGridInfo {
  ncells_axis: [usize; 2],
  physdims: [f64; 2],
  nlevels: usize,
}

impl LeafGridInfo {
  /// `ncells_axis` cells on level 0 over the box $[0, p_0] times [0, p_1]$,
  /// with `nlevels` levels of doubling resolution.
  pub fn new(ncells_axis: [usize; 2], physdims: [f64; 2], nlevels: usize) -> Self {
    Self {
      ncells_axis,
      physdims,
      nlevels,
    }
  }
  pub fn new_unit_cells(ncells_axis: [usize; 2], nlevels: usize) -> Self {
    Self::new(ncells_axis, ncells_axis.map(|n| n as f64), nlevels)
  }

  pub fn ncells_axis(&self) -> [usize; 2] {
    self.ncells_axis
  }
  pub fn physdims(&self) -> [f64; 2] {
    self.physdims
  }
  pub fn nlevels(&self) -> usize {
    self.nlevels
  }

  pub fn compute_leaf_grid(&self) -> Result<LeafGrid, LeafGridError> {
    LeafGrid::new(self.clone())
  }
}

/// Composite grid made of the active cells of a hierarchy of uniform
/// Cartesian grids.
///
/// Starts out as level 0 and only ever gets finer. Every refinement
/// computes a complete new state and replaces the old one at once, so a
/// failing call leaves the grid untouched.
#[derive(Debug, Clone)]
pub struct LeafGrid {
  info: LeafGridInfo,
  hierarchy: GridHierarchy,
  state: LeafState,
}

impl LeafGrid {
  pub fn new(info: LeafGridInfo) -> Result<Self, LeafGridError> {
    let base = CartesianGridInfo::new(info.ncells_axis, info.physdims)?;
    let hierarchy = GridHierarchy::new(base, info.nlevels)?;
    let state = LeafState::coarsest(&hierarchy)?;
    Ok(Self {
      info,
      hierarchy,
      state,
    })
  }

  pub fn info(&self) -> &LeafGridInfo {
    &self.info
  }
  pub fn hierarchy(&self) -> &GridHierarchy {
    &self.hierarchy
  }
  pub fn nlevels(&self) -> usize {
    self.hierarchy.nlevels()
  }
  pub fn level_grid(&self, level: usize) -> Result<&CartGrid, LeafGridError> {
    self.hierarchy.try_level(level)
  }
  pub fn mesh_size(&self, level: usize) -> Option<[usize; 2]> {
    self.hierarchy.mesh_size(level)
  }

  /// Level of every active cell.
  pub fn cell_level(&self) -> &[usize] {
    self.state.cell_level()
  }
  pub fn num_cells_per_level(&self) -> Vec<usize> {
    (0..self.nlevels())
      .map(|level| self.state.active().count(level))
      .collect()
  }
  pub fn active_cells(&self) -> &ActiveCells {
    self.state.active()
  }
  pub fn projections(&self) -> &ProjectionStack {
    self.state.projections()
  }

  pub fn cell_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.hierarchy.cell_proj_level(level0, level1)
  }
  pub fn face_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.hierarchy.face_proj_level(level0, level1)
  }
  pub fn node_proj_level(
    &self,
    level0: usize,
    level1: usize,
  ) -> Result<IncidenceMatrix, LeafGridError> {
    self.hierarchy.node_proj_level(level0, level1)
  }
}

// refinement
impl LeafGrid {
  /// Refines the flagged active cells that live on `level`.
  ///
  /// Flags on cells of other levels are ignored.
  pub fn refine_level(&mut self, level: usize, mask: &RefineMask) -> Result<(), LeafGridError> {
    mask.check_len(self.num_cells())?;
    let next = level
      .checked_add(1)
      .ok_or_else(|| LeafGridError::LevelOutOfRange {
        level,
        nlevels: self.nlevels(),
      })?;
    self.hierarchy.check_level(next)?;

    let targets = self.targets(level, mask);
    let ntargets = count_flags(&targets);
    if ntargets == 0 {
      return Ok(());
    }

    let active = self.state.active().refine(&self.hierarchy, level, &targets);
    self.state = assemble(&self.hierarchy, active)?;
    info!(
      "refined {ntargets} cells on level {level}, leaf grid has {} cells",
      self.num_cells()
    );
    Ok(())
  }

  /// Refines every flagged active cell once, whatever its level.
  ///
  /// Levels are processed from the coarsest one upward. Cells that are
  /// already on the finest level cannot be refined and are skipped.
  pub fn refine_cells(&mut self, mask: &RefineMask) -> Result<(), LeafGridError> {
    mask.check_len(self.num_cells())?;

    let finest = self.hierarchy.finest_level();
    let targets = (0..self.nlevels())
      .map(|level| self.targets(level, mask))
      .collect_vec();

    let nfinest = count_flags(&targets[finest]);
    if nfinest > 0 {
      warn!("ignoring {nfinest} flagged cells already on the finest level {finest}");
    }

    let mut active = self.state.active().clone();
    let mut nrefined = 0;
    for (level, targets) in targets.iter().enumerate().take(finest) {
      let ntargets = count_flags(targets);
      if ntargets > 0 {
        active = active.refine(&self.hierarchy, level, targets);
        nrefined += ntargets;
      }
    }
    if nrefined == 0 {
      return Ok(());
    }

    self.state = assemble(&self.hierarchy, active)?;
    info!(
      "refined {nrefined} cells, leaf grid has {} cells per level {:?}",
      self.num_cells(),
      self.num_cells_per_level()
    );
    Ok(())
  }

  /// Active cells of `level` that are flagged in the mask.
  fn targets(&self, level: usize, mask: &RefineMask) -> Vec<bool> {
    self
      .state
      .projections()
      .get(Entity::Cell, level)
      .apply(mask.flags())
      .into_iter()
      .zip(self.state.active().mask(level))
      .map(|(flagged, &active)| flagged && active)
      .collect()
  }
}

impl GridTopology for LeafGrid {
  fn nodes(&self) -> &na::DMatrix<f64> {
    self.state.nodes()
  }
  fn cell_centers(&self) -> &na::DMatrix<f64> {
    self.state.cell_centers()
  }
  fn face_centers(&self) -> &na::DMatrix<f64> {
    self.state.face_centers()
  }
  fn face_normals(&self) -> &na::DMatrix<f64> {
    self.state.face_normals()
  }
  fn face_areas(&self) -> &na::DVector<f64> {
    self.state.face_areas()
  }
  fn cell_volumes(&self) -> &na::DVector<f64> {
    self.state.cell_volumes()
  }
  fn cell_faces(&self) -> &IncidenceMatrix {
    self.state.cell_faces()
  }
  fn face_nodes(&self) -> &IncidenceMatrix {
    self.state.face_nodes()
  }
}
