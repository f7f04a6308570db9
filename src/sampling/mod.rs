//! sampling — reweighting, frame sampling and chain simulation.
//!
//! Purpose
//! -------
//! Bring model-level statements back to the input data: weight every frame
//! by the stationary distribution, draw concrete `(trajectory, time)` frames
//! for states or distributions over states, and generate synthetic
//! trajectories from the transition matrix.
//!
//! Key behaviors
//! -------------
//! - [`trajectory_weights`] — normalized per-frame stationary weights.
//! - [`sample_by_state`], [`sample_by_distributions`],
//!   [`sample_by_sequence`] — frame draws from an active-state index table.
//! - [`generate`] — chain simulation with optional stop set, configured by
//!   [`SimulationOptions`].
//!
//! Conventions
//! -----------
//! - Random sources are injected (`&mut R: rand::Rng`), never created
//!   internally.
//! - Every call is all-or-nothing; the only short result is the documented
//!   truncation of sampling without replacement.

pub mod chain;
pub mod errors;
pub mod state_sampler;
pub mod weights;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::chain::{SimulatedChain, SimulationOptions, StopReason, generate, simulate_states};
pub use self::errors::{SamplingError, SamplingResult};
pub use self::state_sampler::{
    DISTRIBUTION_TOL, sample_by_distributions, sample_by_sequence, sample_by_state,
};
pub use self::weights::trajectory_weights;
