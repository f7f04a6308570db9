//! Errors for Markov models (transition-matrix validation, spectral
//! analysis, count-matrix consistency, and model configuration).
//!
//! This module defines [`MsmError`], used by every type under `msm`, and the
//! result alias [`MsmResult`]. State-space failures raised while building a
//! model are wrapped through `From<StateError>` so callers see one error
//! type per subtree.
//!
//! ## Conventions
//! - **Indices are 0-based**.
//! - Row-sum and detailed-balance checks use absolute tolerances; the
//!   offending value is carried in the variant for diagnostics.
use crate::states::errors::StateError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for Markov-model operations that may produce [`MsmError`].
pub type MsmResult<T> = Result<T, MsmError>;

/// Unified error type for Markov-model construction and analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum MsmError {
    // ---- Matrix validation ----
    /// Matrix is not square.
    NotSquare { rows: usize, cols: usize },

    /// Matrix has no rows.
    EmptyMatrix,

    /// A matrix entry is NaN/±inf.
    NonFiniteEntry { row: usize, col: usize, value: f64 },

    /// A transition probability is negative.
    NegativeEntry { row: usize, col: usize, value: f64 },

    /// A row of the transition matrix does not sum to one.
    NotStochastic { row: usize, sum: f64 },

    /// Two objects that must agree in size do not.
    DimensionMismatch { expected: usize, actual: usize, what: &'static str },

    // ---- Count matrices and connectivity ----
    /// Active count matrix differs from the full count matrix restricted to
    /// the active set.
    InconsistentCounts { row: usize, col: usize },

    /// Connected sets overlap, contain out-of-range labels, or are not
    /// sorted by descending size.
    InvalidConnectedSets { reason: &'static str },

    // ---- Spectral analysis ----
    /// No unique stationary distribution could be computed.
    NoStationaryDistribution,

    /// Non-reversible matrix has a complex eigenvalue pair.
    ComplexSpectrum { index: usize, imag: f64 },

    /// Eigenvector normalization failed (e.g. degenerate eigenvalues).
    SpectralFailure { reason: &'static str },

    // ---- Configuration ----
    /// Lag time must be at least one step.
    InvalidLag { lag: usize },

    /// Time unit string could not be parsed.
    InvalidTimeUnit { input: String },

    /// Connectivity mode string could not be parsed.
    InvalidConnectivity { input: String },

    /// Failure reported by an injected estimator.
    Estimator { reason: String },

    // ---- Wrapped ----
    State(StateError),
}

impl std::error::Error for MsmError {}

impl std::fmt::Display for MsmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Matrix validation ----
            MsmError::NotSquare { rows, cols } => {
                write!(f, "Matrix must be square; got {rows}x{cols}.")
            }
            MsmError::EmptyMatrix => write!(f, "Matrix must have at least one row."),
            MsmError::NonFiniteEntry { row, col, value } => {
                write!(f, "Matrix entry ({row}, {col}) is non-finite: {value}")
            }
            MsmError::NegativeEntry { row, col, value } => {
                write!(f, "Transition probability ({row}, {col}) is negative: {value}")
            }
            MsmError::NotStochastic { row, sum } => {
                write!(f, "Row {row} of the transition matrix sums to {sum}, expected 1.")
            }
            MsmError::DimensionMismatch { expected, actual, what } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, got {actual}.")
            }
            // ---- Count matrices and connectivity ----
            MsmError::InconsistentCounts { row, col } => write!(
                f,
                "Active count matrix entry ({row}, {col}) differs from the full count matrix restricted to the active set."
            ),
            MsmError::InvalidConnectedSets { reason } => {
                write!(f, "Invalid connected sets: {reason}")
            }
            // ---- Spectral analysis ----
            MsmError::NoStationaryDistribution => {
                write!(f, "Transition matrix has no unique stationary distribution.")
            }
            MsmError::ComplexSpectrum { index, imag } => write!(
                f,
                "Eigenvalue {index} has a non-zero imaginary part ({imag}); real spectral decomposition is undefined."
            ),
            MsmError::SpectralFailure { reason } => {
                write!(f, "Spectral decomposition failed: {reason}")
            }
            // ---- Configuration ----
            MsmError::InvalidLag { lag } => write!(f, "Lag time must be >= 1; got: {lag}"),
            MsmError::InvalidTimeUnit { input } => write!(
                f,
                "Invalid time unit {input:?}; expected '<number> <unit>' with unit in fs, ps, ns, us, ms, s or step."
            ),
            MsmError::InvalidConnectivity { input } => write!(
                f,
                "Invalid connectivity {input:?}; expected 'largest', 'all' or 'none'."
            ),
            MsmError::Estimator { reason } => write!(f, "Estimator failed: {reason}"),
            // ---- Wrapped ----
            MsmError::State(err) => write!(f, "{err}"),
        }
    }
}

impl From<StateError> for MsmError {
    fn from(err: StateError) -> Self {
        MsmError::State(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<MsmError> for PyErr {
    fn from(err: MsmError) -> PyErr {
        PyValueError::new_err(format!("MsmError: {err}"))
    }
}
