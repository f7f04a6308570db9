//! msm — Markov models, their spectral functionals and the estimated-model
//! view tied to input data.
//!
//! Purpose
//! -------
//! Hold a transition matrix estimated elsewhere and derive everything the
//! post-estimation layer needs from it: stationary distribution,
//! reversibility, eigendecomposition, implied timescales and time units.
//! [`ConnectivityModel`] binds a [`MarkovModel`] to the trajectories and
//! count matrices it was estimated from.
//!
//! Key behaviors
//! -------------
//! - [`transition`] validates row-stochastic matrices and solves for `π`.
//! - [`spectral`] computes ordered, sign-fixed eigendecompositions.
//! - [`model::MarkovModel`] caches the decomposition for its lifetime.
//! - [`connectivity::ConnectivityModel`] validates estimation inputs and
//!   exposes coverage, reweighting, sampling and simulation.
//! - [`estimators`] defines the seams to external fitting code.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models exist only in a fully validated state; there is no
//!   "not yet estimated" variant.
//! - Caches are filled at most once and never invalidated.

pub mod connectivity;
pub mod errors;
pub mod estimators;
pub mod model;
pub mod options;
pub mod spectral;
pub mod transition;
pub mod units;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::connectivity::{ConnectivityModel, EstimationData};
pub use self::errors::{MsmError, MsmResult};
pub use self::estimators::{EffectiveCountEstimator, TransitionEstimator, submatrix};
pub use self::model::MarkovModel;
pub use self::options::{Connectivity, ModelOptions};
pub use self::spectral::SpectralDecomposition;
pub use self::transition::{
    REVERSIBILITY_TOL, ROW_SUM_TOL, is_reversible, stationary_distribution,
    validate_transition_matrix,
};
pub use self::units::{TimeUnit, Unit};
