//! ensemble — statistics over ensembles of sampled Markov models.
//!
//! Purpose
//! -------
//! Summarize the uncertainty of model functionals when many plausible
//! transition matrices are available (e.g. posterior samples of a Bayesian
//! estimator). Sampling the matrices is external; this subtree evaluates,
//! canonicalizes and reduces.
//!
//! Key behaviors
//! -------------
//! - [`Functional`] names the aggregatable quantities; [`SampledModel`] is
//!   the member interface, implemented for
//!   [`MarkovModel`](crate::msm::MarkovModel).
//! - [`Ensemble`] evaluates members in parallel and exposes sample values,
//!   mean, standard deviation, confidence intervals and an
//!   [`EnsembleSummary`].
//! - [`canonical`] fixes eigenvalue order and eigenvector signs before any
//!   cross-sample arithmetic.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ensembles are non-empty and immutable.
//! - Every member returns identically shaped values for a functional.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; the Dirichlet-sampled two-state
//!   scenario is an integration test under `tests/`.

pub mod canonical;
pub mod errors;
pub mod functional;
pub mod options;
pub mod statistics;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::canonical::{canonicalize, order_by_modulus};
pub use self::errors::{EnsembleError, EnsembleResult};
pub use self::functional::{Functional, SampledModel};
pub use self::options::{DEFAULT_CONFIDENCE, StatisticsOptions, validate_confidence};
pub use self::statistics::{
    Ensemble, EnsembleSummary, confidence_bounds, sample_confidence, sample_mean, sample_std,
    stack_samples,
};
