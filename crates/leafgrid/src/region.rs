use common::{sparse::IncidenceMatrix, util::count_flags};

/// Renumbering of the selected entities of every level into one merged
/// index space.
///
/// Level 0 entities come first, then level 1 and so on. Within a level the
/// level grid order is kept.
#[derive(Debug, Clone)]
pub struct RegionMap {
  masks: Vec<Vec<bool>>,
  levels: Vec<IncidenceMatrix>,
  offsets: Vec<usize>,
  nactive: usize,
}

impl RegionMap {
  pub fn new(masks: Vec<Vec<bool>>) -> Self {
    let counts: Vec<usize> = masks.iter().map(|mask| count_flags(mask)).collect();
    let nactive = counts.iter().sum();

    let mut offsets = Vec::with_capacity(masks.len());
    let mut offset = 0;
    for count in &counts {
      offsets.push(offset);
      offset += count;
    }

    let levels = masks
      .iter()
      .zip(&offsets)
      .map(|(mask, &offset)| IncidenceMatrix::selection(mask, offset, nactive))
      .collect();

    Self {
      masks,
      levels,
      offsets,
      nactive,
    }
  }

  pub fn nlevels(&self) -> usize {
    self.masks.len()
  }
  pub fn nactive(&self) -> usize {
    self.nactive
  }
  /// Selection matrix of shape `(nentities(level), nactive)`.
  pub fn level(&self, level: usize) -> &IncidenceMatrix {
    &self.levels[level]
  }
  pub fn mask(&self, level: usize) -> &[bool] {
    &self.masks[level]
  }
  pub fn masks(&self) -> &[Vec<bool>] {
    &self.masks
  }
  pub fn offset(&self, level: usize) -> usize {
    self.offsets[level]
  }
  pub fn count(&self, level: usize) -> usize {
    self.level(level).nnz()
  }
}

#[cfg(test)]
mod test {
  use super::RegionMap;

  #[test]
  fn levels_are_appended() {
    let map = RegionMap::new(vec![
      vec![false, true, true],
      vec![true, false, false, false, true],
    ]);
    assert_eq!(map.nactive(), 4);
    assert_eq!(map.offset(1), 2);
    assert_eq!(map.count(0), 2);
    assert_eq!(map.count(1), 2);

    assert_eq!(map.level(0).shape(), (3, 4));
    assert_eq!(map.level(0).get(1, 0), 1);
    assert_eq!(map.level(0).get(2, 1), 1);
    assert_eq!(map.level(1).shape(), (5, 4));
    assert_eq!(map.level(1).get(0, 2), 1);
    assert_eq!(map.level(1).get(4, 3), 1);

    // every merged index is hit exactly once
    let total: Vec<usize> = (0..map.nlevels())
      .map(|l| map.level(l).col_nnz())
      .fold(vec![0; 4], |acc, c| acc.iter().zip(c).map(|(a, b)| a + b).collect());
    assert_eq!(total, vec![1; 4]);
  }
}
