//! msm::model — a validated transition matrix and its derived functionals.
//!
//! Purpose
//! -------
//! [`MarkovModel`] owns one row-stochastic transition matrix at a fixed lag
//! time together with the quantities derived from it: stationary
//! distribution, reversibility flag, and (lazily) the spectral
//! decomposition. It is both the model inside a
//! [`ConnectivityModel`](crate::msm::ConnectivityModel) and the member type
//! of a Bayesian [`Ensemble`](crate::ensemble::Ensemble).
//!
//! Key behaviors
//! -------------
//! - Construction validates `P` and computes `π` eagerly; a model that
//!   exists always has a stationary distribution.
//! - The spectral decomposition is computed on first use and cached in a
//!   `OnceLock` for the lifetime of the model. A failure is cached too, so
//!   every later call reports the same error.
//!
//! Invariants & assumptions
//! ------------------------
//! - `P` is square, finite, non-negative, with row sums within
//!   [`ROW_SUM_TOL`] of one.
//! - `π` is non-negative and sums to one.
//! - `lag >= 1`.
use crate::msm::{
    errors::{MsmError, MsmResult},
    estimators::TransitionEstimator,
    spectral::SpectralDecomposition,
    transition::{
        REVERSIBILITY_TOL, ROW_SUM_TOL, is_reversible, stationary_distribution,
        validate_transition_matrix,
    },
};
use ndarray::{Array1, Array2, ArrayView2};
use std::sync::OnceLock;

/// MarkovModel — transition matrix at lag `lag` plus cached functionals.
///
/// Fields
/// ------
/// - `transition`: `Array2<f64>`, the row-stochastic matrix `P`.
/// - `stationary`: `Array1<f64>`, its stationary distribution `π`.
/// - `reversible`: whether `π_i P_ij = π_j P_ji` within
///   [`REVERSIBILITY_TOL`].
/// - `lag`: lag time in trajectory steps.
/// - `spectral`: compute-once cache of the eigendecomposition.
#[derive(Debug, Clone)]
pub struct MarkovModel {
    transition: Array2<f64>,
    stationary: Array1<f64>,
    reversible: bool,
    lag: usize,
    spectral: OnceLock<MsmResult<SpectralDecomposition>>,
}

impl MarkovModel {
    /// Validate `transition` and compute its stationary distribution.
    ///
    /// Errors
    /// ------
    /// - `MsmError::InvalidLag` if `lag == 0`.
    /// - Any validation error from
    ///   [`validate_transition_matrix`](crate::msm::transition::validate_transition_matrix).
    /// - `MsmError::NoStationaryDistribution` for reducible matrices.
    pub fn new(transition: Array2<f64>, lag: usize) -> MsmResult<Self> {
        if lag == 0 {
            return Err(MsmError::InvalidLag { lag });
        }
        validate_transition_matrix(&transition.view(), ROW_SUM_TOL)?;
        let stationary = stationary_distribution(&transition.view())?;
        let reversible = is_reversible(&transition.view(), &stationary.view(), REVERSIBILITY_TOL);
        Ok(MarkovModel { transition, stationary, reversible, lag, spectral: OnceLock::new() })
    }

    /// Fit a model to `counts` with an external estimator.
    pub fn from_estimator<E: TransitionEstimator>(
        estimator: &E, counts: &ArrayView2<f64>, lag: usize,
    ) -> MsmResult<Self> {
        let transition = estimator.estimate(counts)?;
        if transition.dim() != counts.dim() {
            return Err(MsmError::DimensionMismatch {
                expected: counts.nrows(),
                actual: transition.nrows(),
                what: "estimated transition matrix",
            });
        }
        MarkovModel::new(transition, lag)
    }

    pub fn transition_matrix(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn stationary_distribution(&self) -> &Array1<f64> {
        &self.stationary
    }

    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn n_states(&self) -> usize {
        self.transition.nrows()
    }

    /// Cached spectral decomposition, computed on first access.
    pub fn spectral(&self) -> MsmResult<&SpectralDecomposition> {
        self.spectral
            .get_or_init(|| {
                SpectralDecomposition::decompose(
                    &self.transition.view(),
                    &self.stationary.view(),
                    self.reversible,
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Eigenvalues ordered by descending modulus; the first is one.
    pub fn eigenvalues(&self) -> MsmResult<&Array1<f64>> {
        Ok(&self.spectral()?.eigenvalues)
    }

    /// Left eigenvectors as rows; row 0 is `π`.
    pub fn eigenvectors_left(&self) -> MsmResult<&Array2<f64>> {
        Ok(&self.spectral()?.left)
    }

    /// Right eigenvectors as columns; column 0 is all ones.
    pub fn eigenvectors_right(&self) -> MsmResult<&Array2<f64>> {
        Ok(&self.spectral()?.right)
    }

    /// Implied timescales in trajectory steps (`n_states − 1` entries).
    pub fn timescales(&self) -> MsmResult<Array1<f64>> {
        Ok(self.spectral()?.timescales(self.lag))
    }

    /// Propagate a distribution `k` model steps: `p0 · P^k`.
    ///
    /// Errors
    /// ------
    /// - `MsmError::DimensionMismatch` if `p0` has the wrong length.
    pub fn propagate(&self, p0: &Array1<f64>, k: usize) -> MsmResult<Array1<f64>> {
        if p0.len() != self.n_states() {
            return Err(MsmError::DimensionMismatch {
                expected: self.n_states(),
                actual: p0.len(),
                what: "initial distribution",
            });
        }
        let mut p = p0.clone();
        for _ in 0..k {
            p = p.dot(&self.transition);
        }
        Ok(p)
    }
}
