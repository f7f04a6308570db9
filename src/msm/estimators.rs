//! Estimator seams — interfaces to the external estimation layer.
//!
//! Transition-matrix fitting and effective-count computation live outside
//! this crate. They are consumed through two small traits so a
//! [`ConnectivityModel`](crate::msm::ConnectivityModel) can request them
//! on demand, plus [`submatrix`], the restriction helper used to bring
//! full-space matrices onto the active set.
use crate::msm::errors::{MsmError, MsmResult};
use ndarray::{Array2, ArrayView2};

/// Fits a row-stochastic transition matrix to a count matrix.
pub trait TransitionEstimator {
    /// Estimate `P` from `counts` (square, non-negative).
    ///
    /// Implementations report failures through `MsmError::Estimator`.
    fn estimate(&self, counts: &ArrayView2<f64>) -> MsmResult<Array2<f64>>;
}

/// Computes statistically effective (decorrelated) transition counts.
pub trait EffectiveCountEstimator {
    /// Effective count matrix over the *full* state space, shape
    /// `(nstates, nstates)`, for trajectories at lag `lag`.
    fn effective_counts(
        &self, trajectories: &[Vec<usize>], lag: usize, nstates: usize,
    ) -> MsmResult<Array2<f64>>;
}

/// submatrix — restrict a square matrix to `indices` (rows and columns).
///
/// Entry `(a, b)` of the result is `matrix[indices[a], indices[b]]`, so the
/// result follows the order of `indices`.
///
/// Errors
/// ------
/// - `MsmError::NotSquare` if `matrix` is not square.
/// - `MsmError::DimensionMismatch` if an index is out of range.
pub fn submatrix(matrix: &ArrayView2<f64>, indices: &[usize]) -> MsmResult<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(MsmError::NotSquare { rows, cols });
    }
    if let Some(&bad) = indices.iter().find(|&&i| i >= rows) {
        return Err(MsmError::DimensionMismatch {
            expected: rows,
            actual: bad + 1,
            what: "submatrix index range",
        });
    }
    let k = indices.len();
    Ok(Array2::from_shape_fn((k, k), |(a, b)| matrix[[indices[a], indices[b]]]))
}
