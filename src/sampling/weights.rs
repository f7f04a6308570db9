//! sampling::weights — stationary reweighting of trajectory frames.
//!
//! Each frame receives the stationary probability of its active state (zero
//! when the frame's label is inactive), and all weights are divided by the
//! grand total over every trajectory. The result lets any per-frame
//! observable `a` be averaged as `Σ_k Σ_t w[k][t] · a(x[k][t])`.
use crate::{
    sampling::errors::{SamplingError, SamplingResult},
    states::mapping::StateMap,
};
use ndarray::{Array1, ArrayView1};

/// trajectory_weights — per-frame stationary weights normalized to one.
///
/// Parameters
/// ----------
/// - `stationary`: stationary distribution over the active states.
/// - `trajectories`: discrete trajectories in the full label space.
/// - `map`: full→active map for the active set `stationary` refers to.
///
/// Returns
/// -------
/// One weight vector per trajectory, each as long as its trajectory. The sum
/// over all vectors is one.
///
/// Errors
/// ------
/// - `SamplingError::DimensionMismatch` if `stationary.len()` differs from
///   the number of active states.
/// - `SamplingError::DegenerateWeights` if the total weight is zero or
///   non-finite (e.g. no frame is active).
pub fn trajectory_weights(
    stationary: &ArrayView1<f64>, trajectories: &[Vec<usize>], map: &StateMap,
) -> SamplingResult<Vec<Array1<f64>>> {
    if stationary.len() != map.n_active() {
        return Err(SamplingError::DimensionMismatch {
            expected: map.n_active(),
            actual: stationary.len(),
            what: "stationary distribution",
        });
    }
    let mut weights: Vec<Array1<f64>> = trajectories
        .iter()
        .map(|traj| {
            traj.iter().map(|&label| map.full_to_active(label).map_or(0.0, |i| stationary[i])).collect()
        })
        .collect();

    let total: f64 = weights.iter().map(|w| w.sum()).sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SamplingError::DegenerateWeights { total });
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::mapping::ActiveSet;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Inactive frames get zero weight and the remainder is normalized.
    //
    // Given
    // -----
    // - Active set [0, 2] of 3, π = [0.25, 0.75].
    // - Trajectories [0, 1, 2] and [2].
    //
    // Expect
    // ------
    // - Raw weights [0.25, 0, 0.75] and [0.75], total 1.75.
    fn trajectory_weights_zero_for_inactive_frames() {
        let map = ActiveSet::new(vec![0, 2], 3).unwrap().state_map();
        let pi = array![0.25, 0.75];
        let trajectories = vec![vec![0, 1, 2], vec![2]];

        let w = trajectory_weights(&pi.view(), &trajectories, &map).unwrap();

        assert_eq!(w.len(), 2);
        assert_eq!(w[0].len(), 3);
        assert!((w[0][0] - 0.25 / 1.75).abs() < 1e-12);
        assert_eq!(w[0][1], 0.0);
        assert!((w[1][0] - 0.75 / 1.75).abs() < 1e-12);
        let total: f64 = w.iter().map(|v| v.sum()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn trajectory_weights_degenerate_when_no_frame_is_active() {
        let map = ActiveSet::new(vec![0], 2).unwrap().state_map();
        let pi = array![1.0];

        let err = trajectory_weights(&pi.view(), &[vec![1, 1]], &map).unwrap_err();

        assert_eq!(err, SamplingError::DegenerateWeights { total: 0.0 });
    }

    #[test]
    fn trajectory_weights_rejects_wrong_stationary_length() {
        let map = ActiveSet::full(3).unwrap().state_map();
        let pi = array![0.5, 0.5];

        let err = trajectory_weights(&pi.view(), &[vec![0]], &map).unwrap_err();

        assert!(matches!(err, SamplingError::DimensionMismatch { expected: 3, actual: 2, .. }));
    }
}
