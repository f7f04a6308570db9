//! Errors for ensemble statistics over sampled models.
//!
//! [`EnsembleError`] covers malformed ensembles (empty, or members whose
//! functionals disagree in shape), unusable statistics requests, and
//! failures raised by members while evaluating a functional.
use crate::msm::errors::MsmError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for ensemble operations that may produce [`EnsembleError`].
pub type EnsembleResult<T> = Result<T, EnsembleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EnsembleError {
    /// The ensemble has no members.
    EmptyEnsemble,

    /// Member `index` produced a functional of a different shape than
    /// member 0.
    ShapeMismatch { index: usize, expected: Vec<usize>, actual: Vec<usize> },

    /// The statistic needs more samples than the ensemble holds.
    InsufficientSamples { needed: usize, got: usize },

    /// Confidence level outside the open interval (0, 1).
    InvalidConfidence { value: f64 },

    /// Functional name not recognized.
    UnknownFunctional { name: String },

    /// A member failed to evaluate a functional.
    Model(MsmError),
}

impl std::error::Error for EnsembleError {}

impl std::fmt::Display for EnsembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnsembleError::EmptyEnsemble => write!(f, "Ensemble must contain at least one model."),
            EnsembleError::ShapeMismatch { index, expected, actual } => write!(
                f,
                "Ensemble member {index} has shape {actual:?}; expected {expected:?} like member 0."
            ),
            EnsembleError::InsufficientSamples { needed, got } => {
                write!(f, "Statistic needs at least {needed} samples; ensemble has {got}.")
            }
            EnsembleError::InvalidConfidence { value } => {
                write!(f, "Confidence must lie in (0, 1); got: {value}")
            }
            EnsembleError::UnknownFunctional { name } => write!(
                f,
                "Unknown functional {name:?}; expected one of transition_matrix, eigenvalues, eigenvectors_left, eigenvectors_right, stationary_distribution, timescales."
            ),
            EnsembleError::Model(err) => write!(f, "{err}"),
        }
    }
}

impl From<MsmError> for EnsembleError {
    fn from(err: MsmError) -> Self {
        EnsembleError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<EnsembleError> for PyErr {
    fn from(err: EnsembleError) -> PyErr {
        PyValueError::new_err(format!("EnsembleError: {err}"))
    }
}
