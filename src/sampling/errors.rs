//! Errors for frame sampling, trajectory reweighting and chain simulation.
//!
//! This module defines [`SamplingError`], used by everything under
//! `sampling`, and the result alias [`SamplingResult`]. Sampling calls are
//! all-or-nothing: an error means no partial result was produced.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to the active state space unless a
//!   variant says otherwise.
//! - Distribution checks use the absolute tolerance
//!   [`DISTRIBUTION_TOL`](crate::sampling::state_sampler::DISTRIBUTION_TOL).
use crate::{msm::errors::MsmError, states::errors::StateError};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for sampling operations that may produce [`SamplingError`].
pub type SamplingResult<T> = Result<T, SamplingError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// Distribution `index` of a batch is malformed.
    InvalidDistribution { index: usize, reason: &'static str },

    /// Trajectory weights cannot be normalized (total mass zero or
    /// non-finite).
    DegenerateWeights { total: f64 },

    /// A draw was requested from a state with no observed frames.
    EmptyPool { state: usize },

    /// An active state index is outside `0..n_states`.
    InvalidState { state: usize, n_states: usize },

    /// Two objects that must agree in size do not.
    DimensionMismatch { expected: usize, actual: usize, what: &'static str },

    /// Simulation stride must be at least one.
    InvalidStride { stride: usize },

    // ---- Wrapped ----
    State(StateError),
    Model(MsmError),
}

impl std::error::Error for SamplingError {}

impl std::fmt::Display for SamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingError::InvalidDistribution { index, reason } => {
                write!(f, "Distribution {index} is invalid: {reason}")
            }
            SamplingError::DegenerateWeights { total } => write!(
                f,
                "Trajectory weights cannot be normalized; total stationary mass is {total}."
            ),
            SamplingError::EmptyPool { state } => {
                write!(f, "Active state {state} has no observed frames to sample from.")
            }
            SamplingError::InvalidState { state, n_states } => {
                write!(f, "Active state {state} is outside 0..{n_states}.")
            }
            SamplingError::DimensionMismatch { expected, actual, what } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, got {actual}.")
            }
            SamplingError::InvalidStride { stride } => {
                write!(f, "Stride must be >= 1; got: {stride}")
            }
            SamplingError::State(err) => write!(f, "{err}"),
            SamplingError::Model(err) => write!(f, "{err}"),
        }
    }
}

impl From<StateError> for SamplingError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::EmptyPool { state } => SamplingError::EmptyPool { state },
            other => SamplingError::State(other),
        }
    }
}

impl From<MsmError> for SamplingError {
    fn from(err: MsmError) -> Self {
        SamplingError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<SamplingError> for PyErr {
    fn from(err: SamplingError) -> PyErr {
        PyValueError::new_err(format!("SamplingError: {err}"))
    }
}
