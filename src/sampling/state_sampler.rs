//! sampling::state_sampler — draw concrete trajectory frames for states.
//!
//! Purpose
//! -------
//! Turn statements about *states* into concrete `(trajectory, time)` frames
//! using an [`ActiveStateIndex`]. Three request shapes are supported:
//! a fixed number of frames per state, frames drawn through probability
//! distributions over states, and one frame per entry of a state sequence.
//!
//! Key behaviors
//! -------------
//! - [`sample_by_state`] draws `n` frames from each requested pool, with or
//!   without replacement. Without replacement, a pool with fewer than `n`
//!   frames is returned whole (in pool order); this truncation is the one
//!   documented case where fewer samples than requested come back.
//! - [`sample_by_distributions`] draws states from each distribution with a
//!   categorical sampler, then one uniform frame per drawn state.
//! - [`sample_by_sequence`] maps a state sequence to one uniform frame per
//!   entry.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every returned row `[k, t]` belongs to the pool of the state it was
//!   drawn for.
//! - Inputs are fully validated before any random draw, so a failing call
//!   consumes no randomness and returns nothing.
//!
//! Conventions
//! -----------
//! - Randomness is injected as `&mut R: Rng`; a seeded generator gives
//!   reproducible output because pools have a fixed order.
//! - Results use `(n, 2)` arrays of `[trajectory, time]` rows.
use crate::{
    sampling::errors::{SamplingError, SamplingResult},
    states::index::{ActiveStateIndex, FrameIndex, frames_to_array},
};
use ndarray::{Array2, ArrayView2};
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
    seq::index::sample,
};

/// Absolute tolerance on `|Σ p − 1|` for sampling distributions.
pub const DISTRIBUTION_TOL: f64 = 1e-6;

/// sample_by_state — `n_per_state` frames from each requested state's pool.
///
/// Parameters
/// ----------
/// - `index`: active-state index table.
/// - `n_per_state`: frames requested per state.
/// - `subset`: active states to sample, in output order; `None` means all
///   states in increasing order.
/// - `replace`: draw with replacement (uniform, independent) or without.
/// - `rng`: random source.
///
/// Returns
/// -------
/// `(state, frames)` pairs in request order; `frames` has shape `(m, 2)`
/// with `m = n_per_state`, or `m = pool size` when sampling without
/// replacement from a smaller pool.
///
/// Errors
/// ------
/// - `SamplingError::InvalidState` if a subset entry is out of range.
/// - `SamplingError::EmptyPool` when sampling with replacement from a state
///   that has no frames.
pub fn sample_by_state<R: Rng + ?Sized>(
    index: &ActiveStateIndex, n_per_state: usize, subset: Option<&[usize]>, replace: bool,
    rng: &mut R,
) -> SamplingResult<Vec<(usize, Array2<usize>)>> {
    let states: Vec<usize> = match subset {
        Some(states) => states.to_vec(),
        None => (0..index.n_states()).collect(),
    };
    let pools = checked_pools(index, &states)?;
    if replace && n_per_state > 0 {
        if let Some((&state, _)) = states.iter().zip(&pools).find(|(_, pool)| pool.is_empty()) {
            return Err(SamplingError::EmptyPool { state });
        }
    }

    let mut out = Vec::with_capacity(states.len());
    for (&state, pool) in states.iter().zip(pools) {
        let frames: Vec<FrameIndex> = if replace {
            (0..n_per_state).map(|_| pool[rng.random_range(0..pool.len())]).collect()
        } else if n_per_state >= pool.len() {
            pool.to_vec()
        } else {
            sample(rng, pool.len(), n_per_state).into_iter().map(|i| pool[i]).collect()
        };
        out.push((state, frames_to_array(&frames)));
    }
    Ok(out)
}

/// sample_by_distributions — frames drawn through distributions over states.
///
/// Parameters
/// ----------
/// - `index`: active-state index table.
/// - `distributions`: `(n_dist, n_states)`; each row is a probability vector
///   over active states.
/// - `n_samples`: frames to draw per distribution.
/// - `rng`: random source.
///
/// Returns
/// -------
/// One `(n_samples, 2)` array per distribution, in row order.
///
/// Errors
/// ------
/// - `SamplingError::InvalidDistribution` if a row has the wrong length,
///   a negative or non-finite entry, does not sum to one within
///   [`DISTRIBUTION_TOL`], or puts mass on a state with no frames.
pub fn sample_by_distributions<R: Rng + ?Sized>(
    index: &ActiveStateIndex, distributions: &ArrayView2<f64>, n_samples: usize, rng: &mut R,
) -> SamplingResult<Vec<Array2<usize>>> {
    let n_states = index.n_states();
    let mut samplers = Vec::with_capacity(distributions.nrows());
    for (row, dist) in distributions.rows().into_iter().enumerate() {
        let invalid = |reason| SamplingError::InvalidDistribution { index: row, reason };
        if dist.len() != n_states {
            return Err(invalid("length differs from the number of active states"));
        }
        if dist.iter().any(|&p| !p.is_finite() || p < 0.0) {
            return Err(invalid("entries must be finite and non-negative"));
        }
        if (dist.sum() - 1.0).abs() > DISTRIBUTION_TOL {
            return Err(invalid("entries must sum to one"));
        }
        if dist.iter().zip(index.pools()).any(|(&p, pool)| p > 0.0 && pool.is_empty()) {
            return Err(invalid("probability mass on a state with no observed frames"));
        }
        let sampler =
            WeightedIndex::new(dist.iter()).map_err(|_| invalid("weights cannot be sampled"))?;
        samplers.push(sampler);
    }

    let pools = index.pools();
    let out = samplers
        .iter()
        .map(|sampler| {
            let frames: Vec<FrameIndex> = (0..n_samples)
                .map(|_| {
                    let pool = &pools[sampler.sample(rng)];
                    pool[rng.random_range(0..pool.len())]
                })
                .collect();
            frames_to_array(&frames)
        })
        .collect();
    Ok(out)
}

/// sample_by_sequence — one uniformly drawn frame per state in `states`.
///
/// Errors
/// ------
/// - `SamplingError::InvalidState` for an out-of-range state.
/// - `SamplingError::EmptyPool` for a state with no frames.
pub fn sample_by_sequence<R: Rng + ?Sized>(
    index: &ActiveStateIndex, states: &[usize], rng: &mut R,
) -> SamplingResult<Array2<usize>> {
    let pools = checked_pools(index, states)?;
    if let Some((&state, _)) = states.iter().zip(&pools).find(|(_, pool)| pool.is_empty()) {
        return Err(SamplingError::EmptyPool { state });
    }
    let frames: Vec<FrameIndex> =
        pools.iter().map(|pool| pool[rng.random_range(0..pool.len())]).collect();
    Ok(frames_to_array(&frames))
}

// ---- Helper methods ----

fn checked_pools<'a>(
    index: &'a ActiveStateIndex, states: &[usize],
) -> SamplingResult<Vec<&'a [FrameIndex]>> {
    states
        .iter()
        .map(|&state| {
            index
                .pool(state)
                .map_err(|_| SamplingError::InvalidState { state, n_states: index.n_states() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::index::build_index;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Membership of every sampled frame in the requested state's pool.
    // - Truncation without replacement and the empty-pool error with it.
    // - Distribution validation branches.
    // - Sequence sampling used by the chain simulator.
    // -------------------------------------------------------------------------

    fn label_at(trajectories: &[Vec<usize>], row: ndarray::ArrayView1<usize>) -> usize {
        trajectories[row[0]][row[1]]
    }

    #[test]
    // Purpose
    // -------
    // Sampled frames always map back to the state they were drawn for.
    //
    // Given
    // -----
    // - Two trajectories over labels {0, 1, 2}, all active.
    //
    // Expect
    // ------
    // - 20 rows per state, each pointing at a frame with that label.
    fn sample_by_state_rows_map_back_to_their_state() {
        let trajectories = vec![vec![0, 1, 2, 1, 0], vec![2, 2, 1]];
        let index = build_index(&trajectories, &[0, 1, 2], 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let samples = sample_by_state(&index, 20, None, true, &mut rng).unwrap();

        assert_eq!(samples.len(), 3);
        for (state, frames) in &samples {
            assert_eq!(frames.dim(), (20, 2));
            for row in frames.rows() {
                assert_eq!(label_at(&trajectories, row), *state);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Without replacement, asking for more frames than the pool holds
    // returns the whole pool.
    //
    // Given
    // -----
    // - A pool of 10 frames for state 0; 50 requested.
    //
    // Expect
    // ------
    // - Exactly 10 distinct rows.
    fn sample_by_state_without_replacement_truncates_to_pool() {
        let trajectories = vec![vec![0; 10]];
        let index = build_index(&trajectories, &[0], 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let samples = sample_by_state(&index, 50, None, false, &mut rng).unwrap();

        let frames = &samples[0].1;
        assert_eq!(frames.nrows(), 10);
        let mut times: Vec<usize> = frames.column(1).to_vec();
        times.sort_unstable();
        times.dedup();
        assert_eq!(times.len(), 10);
    }

    #[test]
    fn sample_by_state_without_replacement_draws_distinct_frames() {
        let trajectories = vec![vec![1; 30]];
        let index = build_index(&trajectories, &[1], 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let samples = sample_by_state(&index, 12, Some(&[0]), false, &mut rng).unwrap();

        let mut times: Vec<usize> = samples[0].1.column(1).to_vec();
        times.sort_unstable();
        times.dedup();
        assert_eq!(times.len(), 12);
    }

    #[test]
    fn sample_by_state_errors_are_all_or_nothing() {
        let trajectories = vec![vec![0, 0, 2]];
        let index = build_index(&trajectories, &[0, 1, 2], 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let empty = sample_by_state(&index, 3, Some(&[0, 1]), true, &mut rng).unwrap_err();
        let invalid = sample_by_state(&index, 3, Some(&[0, 5]), true, &mut rng).unwrap_err();
        let truncated = sample_by_state(&index, 3, Some(&[1]), false, &mut rng).unwrap();

        assert_eq!(empty, SamplingError::EmptyPool { state: 1 });
        assert_eq!(invalid, SamplingError::InvalidState { state: 5, n_states: 3 });
        assert_eq!(truncated[0].1.nrows(), 0);
    }

    #[test]
    // Purpose
    // -------
    // A point-mass distribution only yields frames of that state.
    //
    // Given
    // -----
    // - Distributions [[0, 1], [0.5, 0.5]] over two states.
    //
    // Expect
    // ------
    // - First batch only contains state-1 frames; both have 25 rows.
    fn sample_by_distributions_respects_point_mass() {
        let trajectories = vec![vec![0, 1, 0, 1, 1]];
        let index = build_index(&trajectories, &[0, 1], 2).unwrap();
        let distributions = array![[0.0, 1.0], [0.5, 0.5]];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let samples = sample_by_distributions(&index, &distributions.view(), 25, &mut rng).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].dim(), (25, 2));
        for row in samples[0].rows() {
            assert_eq!(label_at(&trajectories, row), 1);
        }
    }

    #[test]
    fn sample_by_distributions_rejects_malformed_rows() {
        let trajectories = vec![vec![0, 0]];
        let index = build_index(&trajectories, &[0, 1], 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let cases = [
            array![[0.6, 0.6]],
            array![[1.5, -0.5]],
            array![[0.5, 0.5]],
        ];

        for dist in cases.iter() {
            let err = sample_by_distributions(&index, &dist.view(), 1, &mut rng).unwrap_err();
            assert!(matches!(err, SamplingError::InvalidDistribution { index: 0, .. }), "{err}");
        }
        let wrong_len = array![[1.0]];
        assert!(sample_by_distributions(&index, &wrong_len.view(), 1, &mut rng).is_err());
    }

    #[test]
    fn sample_by_sequence_maps_each_state_to_one_frame() {
        let trajectories = vec![vec![0, 1, 1], vec![1, 0]];
        let index = build_index(&trajectories, &[0, 1], 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let frames = sample_by_sequence(&index, &[1, 0, 0, 1], &mut rng).unwrap();

        assert_eq!(frames.dim(), (4, 2));
        let labels: Vec<usize> = frames.rows().into_iter().map(|r| label_at(&trajectories, r)).collect();
        assert_eq!(labels, vec![1, 0, 0, 1]);
    }
}
