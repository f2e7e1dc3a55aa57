use crate::projection::Entity;

use cartgrid::GridError;
use thiserror::Error;

/// Errors of the leaf grid. All of them abort the current operation
/// and leave the grid untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LeafGridError {
  /// Projections only exist between adjacent levels.
  /// Larger gaps are obtained by composing single-level projections.
  #[error("projection requested from level {level0} to level {level1}, levels must be exactly one apart")]
  InvalidLevelGap { level0: usize, level1: usize },
  #[error("level {level} does not exist, the hierarchy has {nlevels} levels")]
  LevelOutOfRange { level: usize, nlevels: usize },
  #[error("a grid hierarchy needs at least one level")]
  NoLevels,
  #[error(transparent)]
  Grid(#[from] GridError),

  #[error("refine mask has length {len}, but the grid has {num_cells} active cells")]
  InconsistentMask { len: usize, num_cells: usize },
  #[error("cell {cell} is out of range, the grid has {num_cells} active cells")]
  CellOutOfRange { cell: usize, num_cells: usize },

  /// The active cells leave a gap, or a coarse face has only one refined half.
  #[error("incomplete refinement: {entity} {index} on level {level} is only partially covered")]
  IncompleteRefinement {
    level: usize,
    entity: Entity,
    index: usize,
  },
  #[error("cell {cell} on level {level} is covered by more than one active cell")]
  OverlappingCells { level: usize, cell: usize },
  #[error("got active masks for {len} levels, the hierarchy has {nlevels}")]
  ActiveLevelCount { len: usize, nlevels: usize },
  #[error("active mask of level {level} has length {len}, expected {expected}")]
  ActiveMaskShape {
    level: usize,
    len: usize,
    expected: usize,
  },
}
