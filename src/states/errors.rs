//! states::errors — error type for state-space mapping and index tables.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used by the full↔active state
//! mapping and the active-state index table. These failures are all input
//! validation problems: labels outside the declared full space, malformed
//! active sets, or requests against states that were never observed.
//!
//! Conventions
//! -----------
//! - Labels and indices are 0-based `usize` values.
//! - "Label" always refers to the full state space; "state" or "index"
//!   refers to the active state space.
//! - At the Python boundary every variant maps to `ValueError` with the
//!   `Display` message preserved.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type StateResult<T> = Result<T, StateError>;

/// StateError — failures while mapping or indexing discrete states.
///
/// Variants
/// --------
/// - `InvalidState { label, nstates }`
///   A label (or active index) is outside `0..nstates`.
/// - `UnsortedActiveSet { position }`
///   The active set is not strictly increasing at `position`.
/// - `EmptyActiveSet`
///   The active set has no states; nothing can be mapped.
/// - `EmptyPool { state }`
///   The active state `state` has no observed frames to draw from.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    InvalidState { label: usize, nstates: usize },
    UnsortedActiveSet { position: usize },
    EmptyActiveSet,
    EmptyPool { state: usize },
}

impl std::error::Error for StateError {}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::InvalidState { label, nstates } => {
                write!(f, "State {label} is outside the state space of size {nstates}.")
            }
            StateError::UnsortedActiveSet { position } => {
                write!(f, "Active set must be strictly increasing; violated at position {position}.")
            }
            StateError::EmptyActiveSet => write!(f, "Active set must contain at least one state."),
            StateError::EmptyPool { state } => {
                write!(f, "Active state {state} has no observed frames to sample from.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<StateError> for PyErr {
    fn from(err: StateError) -> PyErr {
        PyValueError::new_err(format!("StateError: {err}"))
    }
}
