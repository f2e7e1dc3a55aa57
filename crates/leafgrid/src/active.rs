use crate::{
  error::LeafGridError,
  hierarchy::GridHierarchy,
  projection::Entity,
};

use common::util::count_flags;

/// Which cells of every level grid are currently part of the leaf grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCells {
  masks: Vec<Vec<bool>>,
}

impl ActiveCells {
  /// All cells of level 0, nothing else.
  pub fn coarsest(hierarchy: &GridHierarchy) -> Self {
    let masks = (0..hierarchy.nlevels())
      .map(|level| vec![level == 0; hierarchy.nentities(Entity::Cell, level)])
      .collect();
    Self { masks }
  }

  /// Only checks the shapes. Whether the cells tile the domain is checked
  /// on assembly.
  pub fn from_masks(
    hierarchy: &GridHierarchy,
    masks: Vec<Vec<bool>>,
  ) -> Result<Self, LeafGridError> {
    let this = Self { masks };
    this.check_shapes(hierarchy)?;
    Ok(this)
  }

  pub(crate) fn check_shapes(&self, hierarchy: &GridHierarchy) -> Result<(), LeafGridError> {
    if self.masks.len() != hierarchy.nlevels() {
      return Err(LeafGridError::ActiveLevelCount {
        len: self.masks.len(),
        nlevels: hierarchy.nlevels(),
      });
    }
    for (level, mask) in self.masks.iter().enumerate() {
      let expected = hierarchy.nentities(Entity::Cell, level);
      if mask.len() != expected {
        return Err(LeafGridError::ActiveMaskShape {
          level,
          len: mask.len(),
          expected,
        });
      }
    }
    Ok(())
  }

  pub fn nlevels(&self) -> usize {
    self.masks.len()
  }
  pub fn mask(&self, level: usize) -> &[bool] {
    &self.masks[level]
  }
  pub fn masks(&self) -> &[Vec<bool>] {
    &self.masks
  }
  pub fn into_masks(self) -> Vec<Vec<bool>> {
    self.masks
  }
  pub fn count(&self, level: usize) -> usize {
    count_flags(&self.masks[level])
  }
  pub fn total(&self) -> usize {
    (0..self.nlevels()).map(|level| self.count(level)).sum()
  }
  /// The finest level with an active cell.
  pub fn max_level(&self) -> usize {
    (0..self.nlevels())
      .rev()
      .find(|&level| self.count(level) > 0)
      .unwrap_or(0)
  }

  /// Replaces the targeted cells of `level` by their four children.
  ///
  /// `targets` must be a subset of the active cells of `level`, and
  /// `level + 1` must exist.
  pub(crate) fn refine(&self, hierarchy: &GridHierarchy, level: usize, targets: &[bool]) -> Self {
    let mut masks = self.masks.clone();
    let children = hierarchy.projection(Entity::Cell, level).apply(targets);

    for (active, &target) in masks[level].iter_mut().zip(targets) {
      debug_assert!(!target || *active);
      *active &= !target;
    }
    for (active, child) in masks[level + 1].iter_mut().zip(children) {
      *active |= child;
    }
    Self { masks }
  }
}
