//! Sparse integer matrices for topological incidence.
//!
//! Incidence between mesh entities (cell-face, face-node, fine-coarse) is
//! always a matrix with entries in $\{-1, 0, 1\}$, so everything here is
//! `i32` valued. [`SparseMatrix`] is a triplet builder, [`IncidenceMatrix`]
//! the compressed (CSR) form all the algebra happens on.

use std::ops::{Add, Mul};

use crate::util::CumsumExt;

#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, i32)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, i32)>) -> Self {
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn triplets(&self) -> &[(usize, usize, i32)] {
    &self.triplets
  }

  pub fn push(&mut self, r: usize, c: usize, v: i32) {
    assert!(r < self.nrows() && c < self.ncols());
    if v != 0 {
      self.triplets.push((r, c, v));
    }
  }

  pub fn transpose(&self) -> SparseMatrix {
    let mut triplets = self.triplets.clone();
    for t in &mut triplets {
      std::mem::swap(&mut t.0, &mut t.1);
    }
    Self::new(self.ncols, self.nrows, triplets)
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<i32> {
    let mut coo = nas::CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  /// Duplicate entries are summed.
  pub fn to_nalgebra_csr(&self) -> nas::CsrMatrix<i32> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_incidence(&self) -> IncidenceMatrix {
    IncidenceMatrix::from_csr(self.to_nalgebra_csr())
  }
}

/// Compressed sparse incidence matrix.
///
/// Explicit zeros are never stored, so two matrices compare equal iff they
/// have the same nonzero entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
  raw: nas::CsrMatrix<i32>,
}

// constructors
impl IncidenceMatrix {
  pub fn from_csr(raw: nas::CsrMatrix<i32>) -> Self {
    Self { raw }.pruned()
  }
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self {
      raw: nas::CsrMatrix::zeros(nrows, ncols),
    }
  }
  pub fn identity(n: usize) -> Self {
    Self {
      raw: nas::CsrMatrix::identity(n),
    }
  }

  /// Selection matrix of shape `(flags.len(), ncols)`.
  ///
  /// The k-th flagged row gets a single one in column `offset + k`.
  /// This is the renumbering of a subset of entities into a contiguous
  /// block of a larger index space.
  pub fn selection(flags: &[bool], offset: usize, ncols: usize) -> Self {
    let nselected = flags.iter().filter(|&&f| f).count();
    assert!(offset + nselected <= ncols, "selection exceeds column space");

    let mut mat = SparseMatrix::zeros(flags.len(), ncols);
    let ranks = flags.iter().map(|&f| f as usize).cumsum();
    for (irow, (&flag, rank)) in flags.iter().zip(ranks).enumerate() {
      if flag {
        mat.push(irow, offset + rank - 1, 1);
      }
    }
    mat.to_incidence()
  }
}

// getters
impl IncidenceMatrix {
  pub fn raw(&self) -> &nas::CsrMatrix<i32> {
    &self.raw
  }
  pub fn nrows(&self) -> usize {
    self.raw.nrows()
  }
  pub fn ncols(&self) -> usize {
    self.raw.ncols()
  }
  pub fn nnz(&self) -> usize {
    self.raw.nnz()
  }
  pub fn shape(&self) -> (usize, usize) {
    (self.nrows(), self.ncols())
  }

  pub fn get(&self, r: usize, c: usize) -> i32 {
    self
      .raw
      .get_entry(r, c)
      .map_or(0, |entry| entry.into_value())
  }

  /// Nonzero `(column, value)` pairs of a row.
  pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, i32)> + '_ {
    let row = self.raw.row(r);
    row
      .col_indices()
      .iter()
      .copied()
      .zip(row.values().iter().copied())
      .collect::<Vec<_>>()
      .into_iter()
  }

  pub fn triplet_iter(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
    self.raw.triplet_iter().map(|(r, c, &v)| (r, c, v))
  }

  pub fn row_nnz(&self) -> Vec<usize> {
    (0..self.nrows()).map(|r| self.raw.row(r).nnz()).collect()
  }
  pub fn col_nnz(&self) -> Vec<usize> {
    let mut counts = vec![0; self.ncols()];
    for &c in self.raw.col_indices() {
      counts[c] += 1;
    }
    counts
  }
  pub fn row_sums(&self) -> Vec<i32> {
    (0..self.nrows())
      .map(|r| self.raw.row(r).values().iter().sum())
      .collect()
  }
}

// algebra
impl IncidenceMatrix {
  pub fn transpose(&self) -> Self {
    Self {
      raw: self.raw.transpose(),
    }
  }

  /// Entrywise absolute value, forgetting orientation.
  pub fn abs(&self) -> Self {
    let mut raw = self.raw.clone();
    for v in raw.values_mut() {
      *v = v.abs();
    }
    Self { raw }
  }

  /// Sparsity pattern, every nonzero becomes one.
  pub fn pattern(&self) -> Self {
    let mut raw = self.raw.clone();
    for v in raw.values_mut() {
      *v = 1;
    }
    Self { raw }
  }

  /// Boolean matrix-vector product.
  ///
  /// Row `i` is set iff it has a nonzero in some flagged column.
  pub fn apply(&self, flags: &[bool]) -> Vec<bool> {
    assert_eq!(flags.len(), self.ncols(), "flag vector has wrong length");
    (0..self.nrows())
      .map(|r| {
        let row = self.raw.row(r);
        row
          .col_indices()
          .iter()
          .zip(row.values())
          .any(|(&c, &v)| v != 0 && flags[c])
      })
      .collect()
  }

  /// Integer matrix-vector product.
  pub fn mul_vec(&self, x: &[i32]) -> Vec<i32> {
    assert_eq!(x.len(), self.ncols(), "vector has wrong length");
    (0..self.nrows())
      .map(|r| {
        let row = self.raw.row(r);
        row
          .col_indices()
          .iter()
          .zip(row.values())
          .map(|(&c, &v)| v * x[c])
          .sum()
      })
      .collect()
  }

  /// Keeps only the rows that are flagged, all others become empty.
  /// Same as multiplying from the left by `diag(flags)`.
  pub fn mask_rows(&self, flags: &[bool]) -> Self {
    assert_eq!(flags.len(), self.nrows(), "flag vector has wrong length");
    let triplets = self
      .triplet_iter()
      .filter(|&(r, _, _)| flags[r])
      .collect();
    SparseMatrix::new(self.nrows(), self.ncols(), triplets).to_incidence()
  }

  pub fn to_dense(&self) -> na::DMatrix<i32> {
    (&self.raw).into()
  }

  fn pruned(self) -> Self {
    if self.raw.values().iter().all(|&v| v != 0) {
      return self;
    }
    let triplets = self.triplet_iter().filter(|&(_, _, v)| v != 0).collect();
    let mat = SparseMatrix::new(self.nrows(), self.ncols(), triplets);
    Self {
      raw: mat.to_nalgebra_csr(),
    }
  }
}

impl Mul for &IncidenceMatrix {
  type Output = IncidenceMatrix;

  fn mul(self, rhs: &IncidenceMatrix) -> IncidenceMatrix {
    assert_eq!(self.ncols(), rhs.nrows(), "incompatible incidence shapes");
    IncidenceMatrix::from_csr(&self.raw * &rhs.raw)
  }
}

impl Add for &IncidenceMatrix {
  type Output = IncidenceMatrix;

  fn add(self, rhs: &IncidenceMatrix) -> IncidenceMatrix {
    assert_eq!(self.shape(), rhs.shape(), "incompatible incidence shapes");
    IncidenceMatrix::from_csr(&self.raw + &rhs.raw)
  }
}

impl From<SparseMatrix> for IncidenceMatrix {
  fn from(mat: SparseMatrix) -> Self {
    mat.to_incidence()
  }
}
