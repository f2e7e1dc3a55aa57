use crate::error::LeafGridError;

use common::util::{count_flags, flags_to_indicies};

/// Boolean mask over the active cells of a leaf grid, selecting the cells
/// to refine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineMask {
  flags: Vec<bool>,
}

impl RefineMask {
  /// Duplicate indices are allowed.
  pub fn from_indices(indices: &[usize], num_cells: usize) -> Result<Self, LeafGridError> {
    let mut flags = vec![false; num_cells];
    for &cell in indices {
      if cell >= num_cells {
        return Err(LeafGridError::CellOutOfRange { cell, num_cells });
      }
      flags[cell] = true;
    }
    Ok(Self { flags })
  }
  pub fn from_flags(flags: Vec<bool>) -> Self {
    Self { flags }
  }
  pub fn none(num_cells: usize) -> Self {
    Self::from_flags(vec![false; num_cells])
  }
  pub fn all(num_cells: usize) -> Self {
    Self::from_flags(vec![true; num_cells])
  }

  pub fn len(&self) -> usize {
    self.flags.len()
  }
  /// Whether no cell is selected. A mask of nonzero length can be empty.
  pub fn is_empty(&self) -> bool {
    self.count() == 0
  }
  pub fn count(&self) -> usize {
    count_flags(&self.flags)
  }
  pub fn flags(&self) -> &[bool] {
    &self.flags
  }
  pub fn indices(&self) -> Vec<usize> {
    flags_to_indicies(&self.flags)
  }

  pub(crate) fn check_len(&self, num_cells: usize) -> Result<(), LeafGridError> {
    if self.len() == num_cells {
      Ok(())
    } else {
      Err(LeafGridError::InconsistentMask {
        len: self.len(),
        num_cells,
      })
    }
  }
}

impl From<Vec<bool>> for RefineMask {
  fn from(flags: Vec<bool>) -> Self {
    Self::from_flags(flags)
  }
}

#[cfg(test)]
mod test {
  use super::RefineMask;
  use crate::error::LeafGridError;

  #[test]
  fn indices_and_flags_agree() {
    let a = RefineMask::from_indices(&[4, 1, 4], 6).unwrap();
    let b = RefineMask::from_flags(vec![false, true, false, false, true, false]);
    assert_eq!(a, b);
    assert_eq!(a.indices(), vec![1, 4]);
    assert_eq!(a.count(), 2);
    assert_eq!(a.len(), 6);
    assert!(!a.is_empty());
    assert!(RefineMask::none(3).is_empty());
    assert_eq!(RefineMask::all(3).count(), 3);
  }

  #[test]
  fn out_of_range() {
    assert_eq!(
      RefineMask::from_indices(&[0, 7], 7),
      Err(LeafGridError::CellOutOfRange {
        cell: 7,
        num_cells: 7
      })
    );
    assert_eq!(
      RefineMask::none(3).check_len(4),
      Err(LeafGridError::InconsistentMask {
        len: 3,
        num_cells: 4
      })
    );
  }
}
