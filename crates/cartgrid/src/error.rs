use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
  #[error("grid needs at least one cell along axis {axis}")]
  EmptyAxis { axis: usize },
  #[error("physical extent {extent} along axis {axis} must be positive and finite")]
  InvalidExtent { axis: usize, extent: f64 },
}
