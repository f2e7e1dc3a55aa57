pub trait CumsumExt {
  fn cumsum(self) -> impl Iterator<Item = usize>;
}
impl<I: IntoIterator<Item = usize>> CumsumExt for I {
  fn cumsum(self) -> impl Iterator<Item = usize> {
    self.into_iter().scan(0, |acc, x| {
      *acc += x;
      Some(*acc)
    })
  }
}

pub fn indicies_to_flags(indicies: &[usize], len: usize) -> Vec<bool> {
  let mut flags = vec![false; len];
  indicies.iter().for_each(|&i| flags[i] = true);
  flags
}

pub fn flags_to_indicies(flags: &[bool]) -> Vec<usize> {
  flags
    .iter()
    .enumerate()
    .filter_map(|(i, &flag)| flag.then_some(i))
    .collect()
}

pub fn count_flags(flags: &[bool]) -> usize {
  flags.iter().filter(|&&f| f).count()
}

/// Concatenates the flagged columns of several matrices, block after block.
///
/// All matrices must have the same number of rows.
pub fn concat_selected_columns(
  blocks: &[(&na::DMatrix<f64>, &[bool])],
  nrows: usize,
) -> na::DMatrix<f64> {
  let ncols = blocks.iter().map(|(_, flags)| count_flags(flags)).sum();
  let mut out = na::DMatrix::zeros(nrows, ncols);
  let mut icol_out = 0;
  for &(mat, flags) in blocks {
    assert_eq!(mat.nrows(), nrows);
    assert_eq!(mat.ncols(), flags.len());
    for icol in flags_to_indicies(flags) {
      out.column_mut(icol_out).copy_from(&mat.column(icol));
      icol_out += 1;
    }
  }
  out
}

/// Concatenates the flagged entries of several vectors, block after block.
pub fn concat_selected_entries(blocks: &[(&na::DVector<f64>, &[bool])]) -> na::DVector<f64> {
  let values: Vec<f64> = blocks
    .iter()
    .flat_map(|&(vec, flags)| {
      assert_eq!(vec.len(), flags.len());
      flags_to_indicies(flags).into_iter().map(move |i| vec[i])
    })
    .collect();
  na::DVector::from_vec(values)
}
