//! states — full↔active state mapping and per-state frame index tables.
//!
//! Purpose
//! -------
//! Own the bookkeeping between the full discrete label space of the input
//! trajectories and the reduced *active* space on which a Markov model is
//! defined. This subtree is pure computation over its inputs: no randomness,
//! no caching, no I/O.
//!
//! Key behaviors
//! -------------
//! - [`ActiveSet`] validates an active set against the full label space.
//! - [`StateMap`] maps full labels to active indices (or unmapped).
//! - [`ActiveStateIndex`] and [`build_index`] tabulate, per active state,
//!   every `(trajectory, time)` frame observed in that state.
//! - [`count_states`] histograms label visits.
//!
//! Invariants & assumptions
//! ------------------------
//! - `map[active[i]] == i` for every active position `i`; every other label
//!   is unmapped.
//! - Index-table pools are ordered by trajectory, then time.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`mapping`] and [`index`] cover validation, the signed
//!   map encoding, pool contents, and pool ordering.

pub mod errors;
pub mod index;
pub mod mapping;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{StateError, StateResult};
pub use self::index::{ActiveStateIndex, FrameIndex, build_index, frames_to_array};
pub use self::mapping::{ActiveSet, StateMap, UNMAPPED, count_states};
