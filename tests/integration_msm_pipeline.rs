//! Integration tests for the post-estimation pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from discrete trajectories and an
//!   externally estimated transition matrix, through `ConnectivityModel`
//!   construction, to reweighting, frame sampling and chain simulation.
//! - Validate ensemble statistics over Dirichlet-sampled transition
//!   matrices, the typical shape of Bayesian posterior samples.
//!
//! Coverage
//! --------
//! - `msm::connectivity::ConnectivityModel`:
//!   - Construction from trajectories with an inactive label, coverage
//!     fractions, active-mapped trajectories and spectral functionals.
//! - `sampling`:
//!   - Stationary frame weights, per-state and per-distribution sampling,
//!     and stop-set simulation mapped back onto input frames.
//! - `ensemble::statistics::Ensemble`:
//!   - Stacked eigenvalue and stationary samples, mean, std and confidence
//!     intervals over 100 sampled two-state models.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of constructors and error variants; these are
//!   covered by unit tests next to each module.
//! - Python bindings.
use markov_stats::{
    ensemble::{Ensemble, Functional},
    msm::{Connectivity, ConnectivityModel, EstimationData, MarkovModel, ModelOptions},
    sampling::{SimulationOptions, StopReason},
};
use ndarray::{Array2, Axis, Ix1, Ix2, array, s};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};

/// Purpose
/// -------
/// Count transitions at lag `lag` over every trajectory.
///
/// Returns
/// -------
/// - An `(nstates, nstates)` matrix with `C[i, j]` the number of observed
///   `i -> j` transitions.
fn count_matrix(trajectories: &[Vec<usize>], nstates: usize, lag: usize) -> Array2<f64> {
    let mut counts = Array2::zeros((nstates, nstates));
    for traj in trajectories {
        for pair in traj.windows(lag + 1) {
            counts[[pair[0], pair[lag]]] += 1.0;
        }
    }
    counts
}

/// Purpose
/// -------
/// Maximum-likelihood (non-reversible) estimate: row-normalized counts.
fn row_normalize(counts: &Array2<f64>) -> Array2<f64> {
    let mut p = counts.clone();
    for mut row in p.rows_mut() {
        let total = row.sum();
        row /= total;
    }
    p
}

/// Purpose
/// -------
/// Build the pipeline fixture: four labels where label 3 is visited once,
/// only as an exit from state 2, and is excluded from the active set.
///
/// Invariants
/// ----------
/// - Every active row has at least one count, so the row-normalized
///   estimate is a valid, irreducible stochastic matrix.
fn pipeline_model() -> ConnectivityModel {
    let trajectories = vec![
        vec![0, 1, 1, 2, 0, 1, 2, 2, 1, 0, 0, 1],
        vec![2, 1, 0, 1, 2, 2, 3],
    ];
    let counts = count_matrix(&trajectories, 4, 1);
    let active = counts.slice(s![0..3, 0..3]).to_owned();
    let model = MarkovModel::new(row_normalize(&active), 1).unwrap();
    let options = ModelOptions::new(1, Connectivity::Largest, "10 ps").unwrap();
    let data = EstimationData {
        trajectories,
        active_set: vec![0, 1, 2],
        connected_sets: vec![vec![0, 1, 2], vec![3]],
        count_matrix_full: counts,
        count_matrix_active: Some(active),
    };
    ConnectivityModel::new(data, model, options).unwrap()
}

/// Purpose
/// -------
/// Draw one row-stochastic matrix from the Dirichlet posterior of `counts`
/// under a flat prior, via normalized Gamma variates.
fn dirichlet_sample<R: Rng>(counts: &Array2<f64>, rng: &mut R) -> Array2<f64> {
    let mut p = Array2::zeros(counts.dim());
    for (i, row) in counts.rows().into_iter().enumerate() {
        for (j, &c) in row.iter().enumerate() {
            let gamma = Gamma::new(c + 1.0, 1.0).unwrap();
            p[[i, j]] = gamma.sample(rng);
        }
        let total = p.row(i).sum();
        p.row_mut(i).mapv_inplace(|v| v / total);
    }
    p
}

#[test]
// Purpose
// -------
// Check metadata and coverage of a model whose data visits an inactive
// label.
//
// Given
// -----
// - Four labels, active set {0, 1, 2}; label 3 appears in one frame out
//   of 19.
//
// Expect
// ------
// - Fractions 3/4 and 18/19; the inactive frame maps to -1.
// - Active counts equal the restricted full counts.
// - A stationary distribution that sums to one and is invariant under P.
fn connectivity_model_metadata_and_coverage() {
    let msm = pipeline_model();

    assert_eq!(msm.nstates_full(), 4);
    assert_eq!(msm.n_active(), 3);
    assert_eq!(msm.connectivity(), Connectivity::Largest);
    assert_eq!(msm.largest_connected_set(), &[0, 1, 2]);
    assert_eq!(msm.dt_model().to_string(), "10 ps");
    assert!((msm.active_state_fraction() - 0.75).abs() < 1e-12);
    assert!((msm.active_count_fraction() - 18.0 / 19.0).abs() < 1e-12);
    assert_eq!(msm.state_histogram().unwrap(), vec![5, 7, 6, 1]);

    let active = msm.discrete_trajectories_active();
    assert_eq!(active[1], vec![2, 1, 0, 1, 2, 2, -1]);
    let restricted = msm.count_matrix_full().slice(s![0..3, 0..3]).to_owned();
    assert_eq!(msm.count_matrix_active(), &restricted);

    let pi = msm.stationary_distribution();
    assert!((pi.sum() - 1.0).abs() < 1e-10);
    let propagated = pi.dot(msm.transition_matrix());
    for (a, b) in propagated.iter().zip(pi.iter()) {
        assert!((a - b).abs() < 1e-10);
    }

    let eigenvalues = msm.eigenvalues().unwrap();
    assert!((eigenvalues[0] - 1.0).abs() < 1e-10);
    let timescales = msm.timescales().unwrap();
    assert_eq!(timescales.len(), 2);
}

#[test]
// Purpose
// -------
// Check stationary reweighting of the input frames.
//
// Given
// -----
// - The pipeline fixture.
//
// Expect
// ------
// - Weights sum to one over all frames.
// - The inactive frame has weight zero.
// - Frames in the same state share a weight proportional to pi.
fn trajectory_weights_follow_stationary_distribution() {
    let msm = pipeline_model();
    let weights = msm.trajectory_weights().unwrap();
    let pi = msm.stationary_distribution();

    let total: f64 = weights.iter().map(|w| w.sum()).sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert_eq!(weights[1][6], 0.0);

    // Frames (0, 0) and (1, 2) are both in state 0; (0, 1) is in state 1.
    assert!((weights[0][0] - weights[1][2]).abs() < 1e-15);
    let ratio = weights[0][0] / weights[0][1];
    assert!((ratio - pi[0] / pi[1]).abs() < 1e-10);
}

#[test]
// Purpose
// -------
// Check that every sampled frame realizes the state it was drawn for.
//
// Given
// -----
// - The pipeline fixture and a seeded generator.
//
// Expect
// ------
// - Index pools cover all 18 active frames.
// - Per-state samples and per-distribution samples map back to their
//   state through the active trajectories.
fn sampled_frames_map_back_to_their_states() {
    let msm = pipeline_model();
    let active = msm.discrete_trajectories_active().to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    assert_eq!(msm.active_state_indexes().total_frames(), 18);

    let by_state = msm.sample_by_state(20, None, true, &mut rng).unwrap();
    assert_eq!(by_state.len(), 3);
    for (state, frames) in &by_state {
        assert_eq!(frames.nrows(), 20);
        for row in frames.rows() {
            assert_eq!(active[row[0]][row[1]], *state as i64);
        }
    }

    let point_masses = array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
    let by_dist = msm.sample_by_distributions(&point_masses.view(), 15, &mut rng).unwrap();
    assert_eq!(by_dist.len(), 2);
    for (frames, state) in by_dist.iter().zip([2i64, 0]) {
        assert_eq!(frames.nrows(), 15);
        assert!(frames.rows().into_iter().all(|row| active[row[0]][row[1]] == state));
    }
}

#[test]
// Purpose
// -------
// Check stop-set simulation mapped onto input frames.
//
// Given
// -----
// - Start state 0, stop set {2}, maximum length 200.
//
// Expect
// ------
// - The chain starts in 0 and contains state 2 only as its final element.
// - Each frame realizes the simulated state at its position.
// - The same seed reproduces the same chain.
fn generated_trajectory_stops_on_entry_to_stop_set() {
    let msm = pipeline_model();
    let active = msm.discrete_trajectories_active().to_vec();
    let opts = SimulationOptions::new(200, Some(0), Some(vec![2]), 1, false).unwrap();

    let chain = msm.generate_traj(&opts, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
    assert!(!chain.is_empty());
    assert_eq!(chain.states[0], 0);
    let last = chain.len() - 1;
    assert!(chain.states[..last].iter().all(|&s| s != 2));
    if chain.stop_reason == StopReason::StopSet {
        assert_eq!(chain.states[last], 2);
    } else {
        assert_eq!(chain.len(), 200);
    }
    for (row, &state) in chain.frames.rows().into_iter().zip(&chain.states) {
        assert_eq!(active[row[0]][row[1]], state as i64);
    }

    let again = msm.generate_traj(&opts, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
    assert_eq!(again, chain);
}

#[test]
// Purpose
// -------
// Summarize an ensemble of 100 Dirichlet-sampled two-state models.
//
// Given
// -----
// - Counts [[90, 10], [20, 80]] and a flat Dirichlet prior per row.
//
// Expect
// ------
// - Eigenvalue samples of shape (100, 2): the first is 1, the second
//   lies strictly below 1.
// - Stationary samples sum to one; right eigenvectors start with a
//   constant column of ones.
// - The mean second eigenvalue is near 1 - 11/102 - 21/102 and the
//   interval brackets it with a positive std.
fn bayesian_ensemble_of_two_state_models() {
    let counts = array![[90.0, 10.0], [20.0, 80.0]];
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let members: Vec<MarkovModel> = (0..100)
        .map(|_| MarkovModel::new(dirichlet_sample(&counts, &mut rng), 1).unwrap())
        .collect();
    let ensemble = Ensemble::new(members).unwrap();
    assert_eq!(ensemble.len(), 100);

    let eigenvalues =
        ensemble.stacked_values("eigenvalues").unwrap().into_dimensionality::<Ix2>().unwrap();
    assert_eq!(eigenvalues.dim(), (100, 2));
    for sample in eigenvalues.axis_iter(Axis(0)) {
        assert!((sample[0] - 1.0).abs() < 1e-10);
        assert!(sample[1] < 1.0);
    }

    for pi in ensemble.values(Functional::StationaryDistribution).unwrap() {
        assert!((pi.sum() - 1.0).abs() < 1e-10);
    }
    for r in ensemble.values(Functional::EigenvectorsRight).unwrap() {
        let r = r.into_dimensionality::<Ix2>().unwrap();
        assert!((r[[0, 0]] - 1.0).abs() < 1e-8);
        assert!((r[[1, 0]] - 1.0).abs() < 1e-8);
    }

    let summary = ensemble.summary("eigenvalues", Some(0.9)).unwrap();
    let expected = 1.0 - 11.0 / 102.0 - 21.0 / 102.0;
    assert_eq!(summary.n_samples, 100);
    let [mean, std, lower, upper] = [summary.mean, summary.std, summary.lower, summary.upper]
        .map(|a| a.into_dimensionality::<Ix1>().unwrap());
    assert!((mean[0] - 1.0).abs() < 1e-10);
    assert!((mean[1] - expected).abs() < 0.05);
    assert!(std[1] > 0.0);
    assert!(lower[1] <= mean[1]);
    assert!(upper[1] >= mean[1]);
    assert!(upper[1] < 1.0);
}
