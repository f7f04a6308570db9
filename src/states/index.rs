//! states::index — per-state tables of trajectory frames.
//!
//! Purpose
//! -------
//! Build the *active-state index table*: for every active state, the ordered
//! list of `(trajectory, time)` pairs at which that state was observed. The
//! table is the common substrate for frame sampling, synthetic trajectory
//! generation, and any other operation that needs to go from a state back to
//! concrete input frames.
//!
//! Key behaviors
//! -------------
//! - [`build_index`] validates the active set and builds the table in a
//!   single O(total frames) pass.
//! - Within each state's pool, entries are ordered first by trajectory index
//!   and then by time. Seeded sampling reproducibility depends on this order.
//! - Frames whose label is inactive or outside the full space are skipped.
//!
//! Invariants & assumptions
//! ------------------------
//! - `pool(i)` only contains pairs `(k, t)` with
//!   `full_to_active(trajectories[k][t]) == Some(i)`.
//! - The table is immutable after construction; owners cache it rather than
//!   rebuild it.
//!
//! Downstream usage
//! ----------------
//! - `sampling::state_sampler` draws from [`ActiveStateIndex::pool`].
//! - `msm::connectivity::ConnectivityModel::active_state_indexes` caches one
//!   instance per model.
use crate::states::{
    errors::{StateError, StateResult},
    mapping::{ActiveSet, StateMap},
};
use ndarray::Array2;

/// A `(trajectory index, time index)` pair identifying one input frame.
pub type FrameIndex = (usize, usize);

/// ActiveStateIndex — ordered frame pools for every active state.
///
/// Fields
/// ------
/// - `pools`: `Vec<Vec<FrameIndex>>`
///   `pools[i]` holds every frame mapped to active state `i`, ordered by
///   trajectory and then time.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStateIndex {
    pools: Vec<Vec<FrameIndex>>,
}

impl ActiveStateIndex {
    /// Build the table for an already validated full→active map.
    pub fn from_map(trajectories: &[Vec<usize>], map: &StateMap) -> Self {
        let mut pools = vec![Vec::new(); map.n_active()];
        for (k, traj) in trajectories.iter().enumerate() {
            for (t, &label) in traj.iter().enumerate() {
                if let Some(i) = map.full_to_active(label) {
                    pools[i].push((k, t));
                }
            }
        }
        ActiveStateIndex { pools }
    }

    /// Number of active states covered by the table.
    pub fn n_states(&self) -> usize {
        self.pools.len()
    }

    /// Frames of active state `state`.
    ///
    /// Errors
    /// ------
    /// - `StateError::InvalidState` if `state >= n_states()`.
    pub fn pool(&self, state: usize) -> StateResult<&[FrameIndex]> {
        self.pools
            .get(state)
            .map(Vec::as_slice)
            .ok_or(StateError::InvalidState { label: state, nstates: self.pools.len() })
    }

    pub fn pool_size(&self, state: usize) -> StateResult<usize> {
        self.pool(state).map(<[FrameIndex]>::len)
    }

    /// Frames of `state` as an `(n, 2)` array of `[traj, t]` rows.
    pub fn pool_array(&self, state: usize) -> StateResult<Array2<usize>> {
        Ok(frames_to_array(self.pool(state)?))
    }

    /// Total number of frames that fall into any active state.
    pub fn total_frames(&self) -> usize {
        self.pools.iter().map(Vec::len).sum()
    }

    pub fn pools(&self) -> &[Vec<FrameIndex>] {
        &self.pools
    }
}

/// build_index — validate an active set and index the trajectories against it.
///
/// Parameters
/// ----------
/// - `trajectories`: `&[Vec<usize>]`
///   Discrete trajectories with labels in the full space.
/// - `active_states`: `&[usize]`
///   Strictly increasing active labels.
/// - `nstates_full`: `usize`
///   Size of the full label space.
///
/// Errors
/// ------
/// - `StateError::InvalidState` if an active label is `>= nstates_full`.
/// - `StateError::UnsortedActiveSet` / `StateError::EmptyActiveSet` for a
///   malformed active set.
pub fn build_index(
    trajectories: &[Vec<usize>], active_states: &[usize], nstates_full: usize,
) -> StateResult<ActiveStateIndex> {
    let active = ActiveSet::new(active_states.to_vec(), nstates_full)?;
    Ok(ActiveStateIndex::from_map(trajectories, &active.state_map()))
}

/// Pack frame pairs into an `(n, 2)` array of `[traj, t]` rows.
pub fn frames_to_array(frames: &[FrameIndex]) -> Array2<usize> {
    let mut out = Array2::zeros((frames.len(), 2));
    for (row, &(k, t)) in frames.iter().enumerate() {
        out[[row, 0]] = k;
        out[[row, 1]] = t;
    }
    out
}
