//! Grid-subsystem error type.

use thiserror::Error;

/// Errors produced by `fr-grid`.  All of them are construction-time
/// configuration failures; the solver itself never fails once built.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("field length {got} does not match grid shape {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize, got: usize },

    #[error("transfer coefficient k must be > 0, got {0}")]
    NonPositiveCoefficient(f64),

    #[error("rainfall must be finite and >= 0, got {0}")]
    InvalidRainfall(f64),
}

pub type GridResult<T> = Result<T, GridError>;
