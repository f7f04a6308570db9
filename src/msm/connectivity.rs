//! msm::connectivity — an estimated Markov model tied to its input data.
//!
//! Purpose
//! -------
//! [`ConnectivityModel`] is the post-estimation view of a Markov state
//! model: the transition matrix on the active set together with the
//! discrete trajectories, count matrices and connectivity metadata it was
//! estimated from. It answers questions that need both the model and the
//! data: how much of the data the active set covers, how frames are weighted
//! at equilibrium, which frames realize a state, and what a synthetic
//! trajectory looks like in terms of real frames.
//!
//! Key behaviors
//! -------------
//! - [`ConnectivityModel::new`] validates every input once: labels against
//!   the full space, the active set, the count matrices against each other,
//!   the connected-set partition, and the model size and lag.
//! - The active-state index table and the active-mapped trajectories are
//!   computed on first access and cached in `OnceLock`s; nothing else is
//!   mutable after construction.
//! - Sampling and simulation delegate to [`crate::sampling`] with the cached
//!   index table.
//!
//! Invariants & assumptions
//! ------------------------
//! - `model.n_states() == active_set.len()` and `model.lag() == options.lag`.
//! - `count_matrix_active == submatrix(count_matrix_full, active_set)`.
//! - Connected sets are non-empty, disjoint, in range, and sorted by
//!   non-increasing size; the first one is the largest connected set.
//! - Under `Connectivity::Largest` the active set is the largest connected
//!   set; under `Connectivity::All` it is the union of all connected sets.
//! - Every trajectory label is `< nstates_full`.
//!
//! Conventions
//! -----------
//! - `nstates_full` is the dimension of the full count matrix.
//! - Count matrices are `f64` arrays holding integer-valued counts.
use crate::{
    msm::{
        errors::{MsmError, MsmResult},
        estimators::{EffectiveCountEstimator, submatrix},
        model::MarkovModel,
        options::{Connectivity, ModelOptions},
        units::TimeUnit,
    },
    sampling::{
        chain::{SimulatedChain, SimulationOptions, generate},
        errors::SamplingResult,
        state_sampler::{sample_by_distributions, sample_by_state},
        weights::trajectory_weights,
    },
    states::{
        errors::StateError,
        index::ActiveStateIndex,
        mapping::{ActiveSet, StateMap, count_states},
    },
};
use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use std::sync::OnceLock;

/// EstimationData — data-side inputs of a [`ConnectivityModel`].
///
/// Fields
/// ------
/// - `trajectories`: discrete trajectories in the full label space.
/// - `active_set`: strictly increasing active labels.
/// - `connected_sets`: connected-set partition, largest first.
/// - `count_matrix_full`: `(nstates_full, nstates_full)` counts.
/// - `count_matrix_active`: counts on the active set; `None` derives them
///   from the full matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationData {
    pub trajectories: Vec<Vec<usize>>,
    pub active_set: Vec<usize>,
    pub connected_sets: Vec<Vec<usize>>,
    pub count_matrix_full: Array2<f64>,
    pub count_matrix_active: Option<Array2<f64>>,
}

/// ConnectivityModel — Markov model plus the data it was estimated from.
#[derive(Debug)]
pub struct ConnectivityModel {
    model: MarkovModel,
    options: ModelOptions,
    trajectories: Vec<Vec<usize>>,
    active_set: ActiveSet,
    state_map: StateMap,
    connected_sets: Vec<Vec<usize>>,
    count_full: Array2<f64>,
    count_active: Array2<f64>,
    index: OnceLock<ActiveStateIndex>,
    trajectories_active: OnceLock<Vec<Vec<i64>>>,
}

impl ConnectivityModel {
    /// Validate and assemble an estimated model.
    ///
    /// Errors
    /// ------
    /// - `MsmError::NotSquare` / `MsmError::EmptyMatrix` /
    ///   `MsmError::NonFiniteEntry` / `MsmError::NegativeEntry` for a bad
    ///   full count matrix.
    /// - `MsmError::State` for trajectory labels outside the full space or a
    ///   malformed active set.
    /// - `MsmError::InconsistentCounts` if the active counts disagree with
    ///   the restricted full counts.
    /// - `MsmError::InvalidConnectedSets` for a malformed partition, or an
    ///   active set that disagrees with the connectivity mode.
    /// - `MsmError::DimensionMismatch` if the model size or lag disagrees
    ///   with the active set or options.
    pub fn new(data: EstimationData, model: MarkovModel, options: ModelOptions) -> MsmResult<Self> {
        let EstimationData {
            trajectories,
            active_set,
            connected_sets,
            count_matrix_full,
            count_matrix_active,
        } = data;

        validate_counts(&count_matrix_full.view())?;
        let nstates_full = count_matrix_full.nrows();
        count_states(&trajectories, nstates_full)?;
        let active_set = ActiveSet::new(active_set, nstates_full)?;
        if model.n_states() != active_set.len() {
            return Err(MsmError::DimensionMismatch {
                expected: active_set.len(),
                actual: model.n_states(),
                what: "transition matrix on the active set",
            });
        }
        if model.lag() != options.lag {
            return Err(MsmError::DimensionMismatch {
                expected: options.lag,
                actual: model.lag(),
                what: "model lag time",
            });
        }

        let restricted = submatrix(&count_matrix_full.view(), active_set.states())?;
        let count_active = match count_matrix_active {
            Some(active) => {
                check_active_counts(&active.view(), &restricted.view())?;
                active
            }
            None => restricted,
        };
        validate_connected_sets(&connected_sets, nstates_full)?;
        check_connectivity(active_set.states(), &connected_sets, options.connectivity)?;

        let state_map = active_set.state_map();
        Ok(ConnectivityModel {
            model,
            options,
            trajectories,
            active_set,
            state_map,
            connected_sets,
            count_full: count_matrix_full,
            count_active,
            index: OnceLock::new(),
            trajectories_active: OnceLock::new(),
        })
    }

    // ---- Metadata ----

    pub fn model(&self) -> &MarkovModel {
        &self.model
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn lag(&self) -> usize {
        self.options.lag
    }

    pub fn connectivity(&self) -> Connectivity {
        self.options.connectivity
    }

    pub fn nstates_full(&self) -> usize {
        self.count_full.nrows()
    }

    pub fn n_active(&self) -> usize {
        self.active_set.len()
    }

    pub fn active_set(&self) -> &[usize] {
        self.active_set.states()
    }

    pub fn state_map(&self) -> &StateMap {
        &self.state_map
    }

    pub fn connected_sets(&self) -> &[Vec<usize>] {
        &self.connected_sets
    }

    /// First (largest) connected set.
    pub fn largest_connected_set(&self) -> &[usize] {
        self.connected_sets.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Time of one trajectory step.
    pub fn dt_traj(&self) -> TimeUnit {
        self.options.dt_traj
    }

    /// Time of one model step, `dt_traj · lag`.
    pub fn dt_model(&self) -> TimeUnit {
        self.options.dt_model()
    }

    // ---- Counts and coverage ----

    pub fn count_matrix_full(&self) -> &Array2<f64> {
        &self.count_full
    }

    /// Sliding-window counts on the active set. These overcount
    /// uncorrelated transitions by roughly a factor of `lag`; use
    /// [`effective_count_matrix`](Self::effective_count_matrix) for
    /// uncertainty estimates.
    pub fn count_matrix_active(&self) -> &Array2<f64> {
        &self.count_active
    }

    /// Effective (decorrelated) counts restricted to the active set.
    ///
    /// Errors
    /// ------
    /// - Errors reported by `estimator`.
    /// - `MsmError::DimensionMismatch` if the estimator does not return an
    ///   `(nstates_full, nstates_full)` matrix.
    pub fn effective_count_matrix<E: EffectiveCountEstimator>(
        &self, estimator: &E,
    ) -> MsmResult<Array2<f64>> {
        let nstates_full = self.nstates_full();
        let full = estimator.effective_counts(&self.trajectories, self.lag(), nstates_full)?;
        if full.dim() != (nstates_full, nstates_full) {
            return Err(MsmError::DimensionMismatch {
                expected: nstates_full,
                actual: full.nrows(),
                what: "effective count matrix",
            });
        }
        submatrix(&full.view(), self.active_set.states())
    }

    /// Fraction of full-space states that are active.
    pub fn active_state_fraction(&self) -> f64 {
        self.n_active() as f64 / self.nstates_full() as f64
    }

    /// Fraction of trajectory frames whose label is active; `0` when there
    /// are no frames.
    pub fn active_count_fraction(&self) -> f64 {
        let mut total = 0usize;
        let mut active = 0usize;
        for traj in &self.trajectories {
            for &label in traj {
                total += 1;
                if self.state_map.full_to_active(label).is_some() {
                    active += 1;
                }
            }
        }
        if total == 0 { 0.0 } else { active as f64 / total as f64 }
    }

    /// Per-label visit histogram over the full space.
    pub fn state_histogram(&self) -> MsmResult<Vec<usize>> {
        Ok(count_states(&self.trajectories, self.nstates_full())?)
    }

    // ---- Trajectories ----

    pub fn discrete_trajectories_full(&self) -> &[Vec<usize>] {
        &self.trajectories
    }

    /// Trajectories mapped to active indices, `-1` for inactive frames.
    pub fn discrete_trajectories_active(&self) -> &[Vec<i64>] {
        self.trajectories_active.get_or_init(|| {
            self.trajectories.iter().map(|traj| self.state_map.map_trajectory(traj)).collect()
        })
    }

    /// Per-frame stationary weights normalized to one over all frames.
    pub fn trajectory_weights(&self) -> SamplingResult<Vec<Array1<f64>>> {
        trajectory_weights(
            &self.model.stationary_distribution().view(),
            &self.trajectories,
            &self.state_map,
        )
    }

    /// Cached active-state index table.
    pub fn active_state_indexes(&self) -> &ActiveStateIndex {
        self.index.get_or_init(|| ActiveStateIndex::from_map(&self.trajectories, &self.state_map))
    }

    // ---- Sampling and simulation ----

    /// See [`crate::sampling::sample_by_state`].
    pub fn sample_by_state<R: Rng + ?Sized>(
        &self, n_per_state: usize, subset: Option<&[usize]>, replace: bool, rng: &mut R,
    ) -> SamplingResult<Vec<(usize, Array2<usize>)>> {
        sample_by_state(self.active_state_indexes(), n_per_state, subset, replace, rng)
    }

    /// See [`crate::sampling::sample_by_distributions`].
    pub fn sample_by_distributions<R: Rng + ?Sized>(
        &self, distributions: &ArrayView2<f64>, n_samples: usize, rng: &mut R,
    ) -> SamplingResult<Vec<Array2<usize>>> {
        sample_by_distributions(self.active_state_indexes(), distributions, n_samples, rng)
    }

    /// Synthetic trajectory of frames; see [`crate::sampling::generate`].
    pub fn generate_traj<R: Rng + ?Sized>(
        &self, opts: &SimulationOptions, rng: &mut R,
    ) -> SamplingResult<SimulatedChain> {
        generate(&self.model, self.active_state_indexes(), opts, rng)
    }

    // ---- Model functionals ----

    pub fn transition_matrix(&self) -> &Array2<f64> {
        self.model.transition_matrix()
    }

    pub fn stationary_distribution(&self) -> &Array1<f64> {
        self.model.stationary_distribution()
    }

    pub fn is_reversible(&self) -> bool {
        self.model.is_reversible()
    }

    pub fn eigenvalues(&self) -> MsmResult<&Array1<f64>> {
        self.model.eigenvalues()
    }

    pub fn eigenvectors_left(&self) -> MsmResult<&Array2<f64>> {
        self.model.eigenvectors_left()
    }

    pub fn eigenvectors_right(&self) -> MsmResult<&Array2<f64>> {
        self.model.eigenvectors_right()
    }

    /// Implied timescales in trajectory steps.
    pub fn timescales(&self) -> MsmResult<Array1<f64>> {
        self.model.timescales()
    }
}

// ---- Helper methods ----

fn validate_counts(counts: &ArrayView2<f64>) -> MsmResult<()> {
    let (rows, cols) = counts.dim();
    if rows == 0 {
        return Err(MsmError::EmptyMatrix);
    }
    if rows != cols {
        return Err(MsmError::NotSquare { rows, cols });
    }
    for ((row, col), &value) in counts.indexed_iter() {
        if !value.is_finite() {
            return Err(MsmError::NonFiniteEntry { row, col, value });
        }
        if value < 0.0 {
            return Err(MsmError::NegativeEntry { row, col, value });
        }
    }
    Ok(())
}

fn check_active_counts(active: &ArrayView2<f64>, restricted: &ArrayView2<f64>) -> MsmResult<()> {
    if active.dim() != restricted.dim() {
        return Err(MsmError::DimensionMismatch {
            expected: restricted.nrows(),
            actual: active.nrows(),
            what: "active count matrix",
        });
    }
    match active.indexed_iter().find(|&(ij, &v)| v != restricted[ij]) {
        Some(((row, col), _)) => Err(MsmError::InconsistentCounts { row, col }),
        None => Ok(()),
    }
}

/// The active set must be the largest connected set under `Largest` and
/// the union of all connected sets under `All`.
fn check_connectivity(
    active: &[usize], sets: &[Vec<usize>], mode: Connectivity,
) -> MsmResult<()> {
    let (mut expected, reason) = match mode {
        Connectivity::Largest => (
            sets.first().cloned().unwrap_or_default(),
            "active set must equal the largest connected set",
        ),
        Connectivity::All => (sets.concat(), "active set must equal the union of the connected sets"),
        Connectivity::None => return Ok(()),
    };
    expected.sort_unstable();
    if expected != active {
        return Err(MsmError::InvalidConnectedSets { reason });
    }
    Ok(())
}

fn validate_connected_sets(sets: &[Vec<usize>], nstates_full: usize) -> MsmResult<()> {
    let invalid = |reason| Err(MsmError::InvalidConnectedSets { reason });
    if sets.is_empty() {
        return invalid("at least one connected set is required");
    }
    let mut seen = vec![false; nstates_full];
    for (k, set) in sets.iter().enumerate() {
        if set.is_empty() {
            return invalid("connected sets must be non-empty");
        }
        if k > 0 && set.len() > sets[k - 1].len() {
            return invalid("connected sets must be sorted by non-increasing size");
        }
        for &label in set {
            match seen.get_mut(label) {
                None => {
                    return Err(MsmError::State(StateError::InvalidState {
                        label,
                        nstates: nstates_full,
                    }));
                }
                Some(true) => return invalid("connected sets must be disjoint"),
                Some(slot) => *slot = true,
            }
        }
    }
    Ok(())
}
