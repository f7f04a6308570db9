//! msm::transition — row-stochastic matrices and their stationary vectors.
//!
//! Purpose
//! -------
//! Validate transition matrices handed in by an external estimator and
//! compute the two quantities every other component depends on: the
//! stationary distribution and the detailed-balance (reversibility) check.
//!
//! Key behaviors
//! -------------
//! - [`validate_transition_matrix`] checks shape, finiteness, non-negativity
//!   and row sums against [`ROW_SUM_TOL`].
//! - [`stationary_distribution`] solves `π (P − I) = 0`, `Σ π = 1` with a
//!   dense LU factorization (`nalgebra`), then clips round-off negatives.
//! - [`is_reversible`] checks `π_i P_ij = π_j P_ji` within a tolerance.
//!
//! Invariants & assumptions
//! ------------------------
//! - A returned stationary distribution is finite, non-negative and sums to
//!   one within `1e-12` after renormalization.
//! - Reducible matrices (more than one closed class) yield a singular system
//!   and are reported as [`MsmError::NoStationaryDistribution`].
use crate::msm::errors::{MsmError, MsmResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Absolute tolerance on `|Σ_j P_ij − 1|`.
pub const ROW_SUM_TOL: f64 = 1e-8;

/// Absolute tolerance on `|π_i P_ij − π_j P_ji|`.
pub const REVERSIBILITY_TOL: f64 = 1e-10;

/// Largest negative stationary weight that is treated as round-off.
const STATIONARY_CLIP_TOL: f64 = 1e-10;

/// validate_transition_matrix — check the row-stochastic contract.
///
/// Errors
/// ------
/// - `MsmError::EmptyMatrix` / `MsmError::NotSquare` for bad shapes.
/// - `MsmError::NonFiniteEntry` / `MsmError::NegativeEntry` for the first
///   offending entry in row-major order.
/// - `MsmError::NotStochastic` for the first row whose sum differs from one
///   by more than `tol`.
pub fn validate_transition_matrix(p: &ArrayView2<f64>, tol: f64) -> MsmResult<()> {
    let (rows, cols) = p.dim();
    if rows == 0 {
        return Err(MsmError::EmptyMatrix);
    }
    if rows != cols {
        return Err(MsmError::NotSquare { rows, cols });
    }
    for (row, p_row) in p.rows().into_iter().enumerate() {
        let mut sum = 0.0;
        for (col, &value) in p_row.iter().enumerate() {
            if !value.is_finite() {
                return Err(MsmError::NonFiniteEntry { row, col, value });
            }
            if value < 0.0 {
                return Err(MsmError::NegativeEntry { row, col, value });
            }
            sum += value;
        }
        if (sum - 1.0).abs() > tol {
            return Err(MsmError::NotStochastic { row, sum });
        }
    }
    Ok(())
}

/// stationary_distribution — left eigenvector of eigenvalue one.
///
/// Solves the linear system obtained from `(Pᵀ − I) π = 0` by replacing its
/// last equation with the normalization `Σ π = 1`. The input is assumed to
/// have passed [`validate_transition_matrix`].
///
/// Errors
/// ------
/// - `MsmError::NoStationaryDistribution` if the system is singular or the
///   solution has materially negative or non-finite entries.
pub fn stationary_distribution(p: &ArrayView2<f64>) -> MsmResult<Array1<f64>> {
    let n = p.nrows();
    if n == 1 {
        return Ok(Array1::ones(1));
    }
    let mut system = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            system[(i, j)] = p[[j, i]] - if i == j { 1.0 } else { 0.0 };
        }
    }
    for j in 0..n {
        system[(n - 1, j)] = 1.0;
    }
    let mut rhs = DVector::<f64>::zeros(n);
    rhs[n - 1] = 1.0;

    let solution = system.lu().solve(&rhs).ok_or(MsmError::NoStationaryDistribution)?;

    let mut pi = Array1::from_iter(solution.iter().copied());
    if pi.iter().any(|&v| !v.is_finite() || v < -STATIONARY_CLIP_TOL) {
        return Err(MsmError::NoStationaryDistribution);
    }
    pi.mapv_inplace(|v| v.max(0.0));
    let total = pi.sum();
    if total <= 0.0 {
        return Err(MsmError::NoStationaryDistribution);
    }
    pi /= total;
    Ok(pi)
}

/// is_reversible — detailed balance `π_i P_ij = π_j P_ji` within `tol`.
pub fn is_reversible(p: &ArrayView2<f64>, pi: &ArrayView1<f64>, tol: f64) -> bool {
    let n = p.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (pi[i] * p[[i, j]] - pi[j] * p[[j, i]]).abs() > tol {
                return false;
            }
        }
    }
    true
}
