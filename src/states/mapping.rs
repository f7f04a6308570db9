//! states::mapping — validated active sets and the full→active label map.
//!
//! Purpose
//! -------
//! Represent the subset of discrete states on which a Markov model is
//! defined (the *active set*) and the total map from full-space labels to
//! active-space indices. Everything downstream (index tables, reweighting,
//! sampling) goes through [`StateMap`] so the mapping invariants are checked
//! exactly once.
//!
//! Key behaviors
//! -------------
//! - [`ActiveSet::new`] validates that labels are strictly increasing and
//!   inside `0..nstates_full`.
//! - [`StateMap`] answers `full_to_active` queries in O(1) and exports the
//!   signed form with [`UNMAPPED`] as the sentinel for inactive labels.
//! - [`count_states`] builds a label histogram over a trajectory set.
//!
//! Invariants & assumptions
//! ------------------------
//! - `map[active[i]] == Some(i)` for every active position `i`.
//! - `map[s] == None` for every `s` outside the active set.
//! - Labels `>= nstates_full` are never active; they map to `None` instead
//!   of panicking so stray trajectory frames can be treated as unmapped.
//!
//! Conventions
//! -----------
//! - Labels are `usize`; the signed export uses `i64` so the `-1` sentinel
//!   can be represented.
use crate::states::errors::{StateError, StateResult};

/// Sentinel used by the signed full→active export for inactive labels.
pub const UNMAPPED: i64 = -1;

/// ActiveSet — strictly increasing subset of the full label space.
///
/// Fields
/// ------
/// - `states`: `Vec<usize>`
///   Active labels in increasing order; position `i` is active index `i`.
/// - `nstates_full`: `usize`
///   Size of the full label space the set was validated against.
///
/// Invariants
/// ----------
/// - `states` is non-empty and strictly increasing.
/// - Every label satisfies `label < nstates_full`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSet {
    states: Vec<usize>,
    nstates_full: usize,
}

impl ActiveSet {
    /// Validate and wrap an active set.
    ///
    /// Errors
    /// ------
    /// - `StateError::EmptyActiveSet` if `states` is empty.
    /// - `StateError::InvalidState` for the first label `>= nstates_full`.
    /// - `StateError::UnsortedActiveSet` if labels are not strictly increasing.
    pub fn new(states: Vec<usize>, nstates_full: usize) -> StateResult<Self> {
        if states.is_empty() {
            return Err(StateError::EmptyActiveSet);
        }
        for (position, &label) in states.iter().enumerate() {
            if label >= nstates_full {
                return Err(StateError::InvalidState { label, nstates: nstates_full });
            }
            if position > 0 && states[position - 1] >= label {
                return Err(StateError::UnsortedActiveSet { position });
            }
        }
        Ok(ActiveSet { states, nstates_full })
    }

    /// Active set covering every label of the full space.
    pub fn full(nstates_full: usize) -> StateResult<Self> {
        ActiveSet::new((0..nstates_full).collect(), nstates_full)
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn nstates_full(&self) -> usize {
        self.nstates_full
    }

    pub fn contains(&self, label: usize) -> bool {
        self.states.binary_search(&label).is_ok()
    }

    /// Build the full→active map for this set.
    pub fn state_map(&self) -> StateMap {
        let mut full2active = vec![None; self.nstates_full];
        for (i, &label) in self.states.iter().enumerate() {
            full2active[label] = Some(i);
        }
        StateMap { full2active }
    }
}

/// StateMap — total map from full-space labels to active indices.
///
/// Key behaviors
/// -------------
/// - `full_to_active(label)` is O(1) and returns `None` for inactive or
///   out-of-range labels.
/// - `as_signed()` exports the map as `Vec<i64>` with [`UNMAPPED`] for
///   inactive labels, matching the conventional integer encoding.
/// - `map_trajectory(traj)` maps a whole trajectory into the signed encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMap {
    full2active: Vec<Option<usize>>,
}

impl StateMap {
    #[inline]
    pub fn full_to_active(&self, label: usize) -> Option<usize> {
        self.full2active.get(label).copied().flatten()
    }

    pub fn nstates_full(&self) -> usize {
        self.full2active.len()
    }

    pub fn n_active(&self) -> usize {
        self.full2active.iter().filter(|s| s.is_some()).count()
    }

    pub fn as_signed(&self) -> Vec<i64> {
        self.full2active.iter().map(|s| s.map_or(UNMAPPED, |i| i as i64)).collect()
    }

    pub fn map_trajectory(&self, traj: &[usize]) -> Vec<i64> {
        traj.iter().map(|&label| self.full_to_active(label).map_or(UNMAPPED, |i| i as i64)).collect()
    }
}

/// count_states — histogram of label visits across all trajectories.
///
/// Returns a vector of length `nstates` where entry `s` counts frames whose
/// label equals `s`. Labels `>= nstates` are reported as an error since the
/// histogram would silently drop them otherwise.
pub fn count_states(trajectories: &[Vec<usize>], nstates: usize) -> StateResult<Vec<usize>> {
    let mut hist = vec![0usize; nstates];
    for traj in trajectories {
        for &label in traj {
            match hist.get_mut(label) {
                Some(slot) => *slot += 1,
                None => return Err(StateError::InvalidState { label, nstates }),
            }
        }
    }
    Ok(hist)
}
