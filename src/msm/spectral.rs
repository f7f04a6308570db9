//! msm::spectral — eigendecomposition and implied timescales.
//!
//! Purpose
//! -------
//! Decompose a validated transition matrix `P` into eigenvalues and
//! biorthogonal left/right eigenvectors, and derive implied timescales.
//! These are the spectral functionals that ensembles of sampled models
//! aggregate.
//!
//! Key behaviors
//! -------------
//! - Reversible matrices are symmetrized as `S = D^{1/2} P D^{-1/2}` with
//!   `D = diag(π)` and decomposed with `nalgebra::SymmetricEigen`; the
//!   spectrum is then exactly real.
//! - Non-reversible matrices use Schur eigenvalues; a complex pair is
//!   reported as [`MsmError::ComplexSpectrum`]. Eigenvectors are null
//!   vectors of `P − λI` (right) and `Pᵀ − λI` (left) taken from an SVD.
//! - Eigenvalues are ordered by descending modulus, so the Perron
//!   eigenvalue (one) comes first.
//!
//! Invariants & assumptions
//! ------------------------
//! - `left` holds eigenvectors as rows, `right` as columns, and
//!   `left · right = I` up to round-off.
//! - `right[:, 0]` is the ones vector and `left[0, :]` is `π`.
//! - For `k ≥ 1`, the sign of each pair is fixed so that the
//!   largest-magnitude coordinate of `right[:, k]` is non-negative (lowest
//!   index wins ties). Flipping both members of a pair keeps `L · R = I`.
//!
//! Conventions
//! -----------
//! - Implied timescales are `t_k = −lag / ln|λ_k|` for `k ≥ 1`, in units of
//!   trajectory steps. `|λ_k| = 1` yields `+∞`; `λ_k = 0` yields `0`.
use crate::msm::errors::{MsmError, MsmResult};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Imaginary parts below this magnitude are treated as round-off.
const IMAG_TOL: f64 = 1e-10;

/// Smallest admissible `|l_k · r_k|` before normalization.
const BIORTHO_TOL: f64 = 1e-12;

/// SpectralDecomposition — eigenvalues with left (rows) and right (columns)
/// eigenvectors of a transition matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralDecomposition {
    pub eigenvalues: Array1<f64>,
    pub left: Array2<f64>,
    pub right: Array2<f64>,
}

impl SpectralDecomposition {
    /// decompose — spectral decomposition of `P` given its stationary vector.
    ///
    /// Parameters
    /// ----------
    /// - `p`: validated row-stochastic matrix.
    /// - `pi`: its stationary distribution.
    /// - `reversible`: whether `P` satisfies detailed balance with `π`.
    ///
    /// Errors
    /// ------
    /// - `MsmError::ComplexSpectrum` for a non-reversible `P` with complex
    ///   eigenvalues.
    /// - `MsmError::SpectralFailure` if eigenvectors cannot be normalized
    ///   against each other (degenerate spectrum).
    pub fn decompose(
        p: &ArrayView2<f64>, pi: &ArrayView1<f64>, reversible: bool,
    ) -> MsmResult<Self> {
        let mut decomposition = if reversible && pi.iter().all(|&v| v > 0.0) {
            decompose_reversible(p, pi)
        } else {
            decompose_general(p, pi)?
        };
        fix_pair_signs(&mut decomposition.left, &mut decomposition.right);
        Ok(decomposition)
    }

    /// Implied timescales `−lag / ln|λ_k|` for every non-stationary mode.
    pub fn timescales(&self, lag: usize) -> Array1<f64> {
        let tau = lag as f64;
        self.eigenvalues.iter().skip(1).map(|&lambda| implied_timescale(lambda, tau)).collect()
    }
}

#[inline]
fn implied_timescale(lambda: f64, tau: f64) -> f64 {
    let modulus = lambda.abs();
    if modulus >= 1.0 { f64::INFINITY } else { -tau / modulus.ln() }
}

// ---- Helper methods ----

fn decompose_reversible(p: &ArrayView2<f64>, pi: &ArrayView1<f64>) -> SpectralDecomposition {
    let n = p.nrows();
    let sqrt_pi: Vec<f64> = pi.iter().map(|v| v.sqrt()).collect();
    let mut sym = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let upper = sqrt_pi[i] * p[[i, j]] / sqrt_pi[j];
            let lower = sqrt_pi[j] * p[[j, i]] / sqrt_pi[i];
            let value = 0.5 * (upper + lower);
            sym[(i, j)] = value;
            sym[(j, i)] = value;
        }
    }
    let eig = SymmetricEigen::new(sym);
    let order = modulus_order(eig.eigenvalues.iter().copied());

    let mut eigenvalues = Array1::zeros(n);
    let mut left = Array2::zeros((n, n));
    let mut right = Array2::zeros((n, n));
    for (k, &src) in order.iter().enumerate() {
        eigenvalues[k] = eig.eigenvalues[src];
        for i in 0..n {
            let u = eig.eigenvectors[(i, src)];
            right[[i, k]] = u / sqrt_pi[i];
            left[[k, i]] = u * sqrt_pi[i];
        }
    }
    // Perron pair: u_0 = ±sqrt(π) so right[:,0] = ±1 and left[0,:] = ±π.
    if left.row(0).sum() < 0.0 {
        left.row_mut(0).mapv_inplace(|v| -v);
        right.column_mut(0).mapv_inplace(|v| -v);
    }
    SpectralDecomposition { eigenvalues, left, right }
}

fn decompose_general(p: &ArrayView2<f64>, pi: &ArrayView1<f64>) -> MsmResult<SpectralDecomposition> {
    let n = p.nrows();
    let mut mat = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(p, &mut mat);

    let complex = mat.complex_eigenvalues();
    for (index, c) in complex.iter().enumerate() {
        if c.im.abs() > IMAG_TOL {
            return Err(MsmError::ComplexSpectrum { index, imag: c.im });
        }
    }
    let real: Vec<f64> = complex.iter().map(|c| c.re).collect();
    let order = modulus_order(real.iter().copied());

    let mut eigenvalues = Array1::zeros(n);
    let mut left = Array2::zeros((n, n));
    let mut right = Array2::zeros((n, n));
    let transposed = mat.transpose();
    for (k, &src) in order.iter().enumerate() {
        let lambda = real[src];
        eigenvalues[k] = lambda;
        if k == 0 {
            right.column_mut(0).fill(1.0);
            left.row_mut(0).assign(pi);
            continue;
        }
        let r = null_vector(&mat, lambda)?;
        let l = null_vector(&transposed, lambda)?;
        let overlap: f64 = l.iter().zip(r.iter()).map(|(a, b)| a * b).sum();
        if overlap.abs() < BIORTHO_TOL {
            return Err(MsmError::SpectralFailure {
                reason: "left and right eigenvectors are orthogonal (degenerate eigenvalue)",
            });
        }
        for i in 0..n {
            right[[i, k]] = r[i];
            left[[k, i]] = l[i] / overlap;
        }
    }
    Ok(SpectralDecomposition { eigenvalues, left, right })
}

/// Copy an `ndarray` matrix into a preallocated `DMatrix` of equal shape.
fn fill_dmatrix(src: &ArrayView2<f64>, dst: &mut DMatrix<f64>) {
    let (rows, cols) = src.dim();
    for j in 0..cols {
        for i in 0..rows {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

/// Unit vector spanning the (numerical) null space of `m − λI`.
fn null_vector(m: &DMatrix<f64>, lambda: f64) -> MsmResult<Vec<f64>> {
    let n = m.nrows();
    let mut shifted = m.clone();
    for i in 0..n {
        shifted[(i, i)] -= lambda;
    }
    let svd = shifted.svd(false, true);
    let v_t = svd.v_t.ok_or(MsmError::SpectralFailure { reason: "SVD did not return V^T" })?;
    let smallest = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .ok_or(MsmError::SpectralFailure { reason: "empty singular value vector" })?;
    Ok(v_t.row(smallest).iter().copied().collect())
}

/// Permutation sorting eigenvalues by descending modulus, then descending
/// value, so `1` precedes `-1` when both occur.
fn modulus_order(values: impl Iterator<Item = f64>) -> Vec<usize> {
    let values: Vec<f64> = values.collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b].abs().total_cmp(&values[a].abs()).then(values[b].total_cmp(&values[a]))
    });
    order
}

/// Flip each non-Perron pair so the largest-|·| right coordinate is ≥ 0.
fn fix_pair_signs(left: &mut Array2<f64>, right: &mut Array2<f64>) {
    for k in 1..right.ncols() {
        let pivot = reference_coordinate(&right.column(k));
        if right[[pivot, k]] < 0.0 {
            right.column_mut(k).mapv_inplace(|v| -v);
            left.row_mut(k).mapv_inplace(|v| -v);
        }
    }
}

/// Index of the largest-magnitude coordinate; ties resolve to the lowest index.
pub(crate) fn reference_coordinate(v: &ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x.abs() > v[best].abs() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msm::transition::{REVERSIBILITY_TOL, is_reversible, stationary_distribution};
    use ndarray::array;

    fn decompose(p: &Array2<f64>) -> SpectralDecomposition {
        let pi = stationary_distribution(&p.view()).unwrap();
        let reversible = is_reversible(&p.view(), &pi.view(), REVERSIBILITY_TOL);
        SpectralDecomposition::decompose(&p.view(), &pi.view(), reversible).unwrap()
    }

    fn assert_biorthonormal(d: &SpectralDecomposition) {
        let product = d.left.dot(&d.right);
        let n = product.nrows();
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (product[[i, j]] - expected).abs() < 1e-8,
                    "L·R deviates from I at ({i},{j}): {}",
                    product[[i, j]]
                );
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Two-state chain has eigenvalues {1, 1 − a − b}.
    //
    // Given
    // -----
    // - P = [[0.9, 0.1], [0.3, 0.7]] (reversible, as every 2-state chain).
    //
    // Expect
    // ------
    // - eigenvalues ≈ [1.0, 0.6], `L·R = I`, `R[:,0] = 1`, `L[0,:] = π`.
    fn decompose_two_state_reversible_chain() {
        let p = array![[0.9, 0.1], [0.3, 0.7]];

        let d = decompose(&p);

        assert!((d.eigenvalues[0] - 1.0).abs() < 1e-12);
        assert!((d.eigenvalues[1] - 0.6).abs() < 1e-12);
        assert_biorthonormal(&d);
        assert!((d.right[[0, 0]] - 1.0).abs() < 1e-10 && (d.right[[1, 0]] - 1.0).abs() < 1e-10);
        assert!((d.left[[0, 0]] - 0.75).abs() < 1e-10 && (d.left[[0, 1]] - 0.25).abs() < 1e-10);
        // second right eigenvector changes sign across the two states
        assert!(d.right[[0, 1]].signum() != d.right[[1, 1]].signum());
    }

    #[test]
    // Purpose
    // -------
    // Non-reversible chain with a real spectrum goes through the general path.
    //
    // Given
    // -----
    // - P = [[0.7,0.2,0.1],[0.1,0.8,0.1],[0.3,0.3,0.4]], which violates
    //   detailed balance and has eigenvalues {1, 0.6, 0.3}.
    //
    // Expect
    // ------
    // - eigenvalues ≈ [1.0, 0.6, 0.3], `L·R = I`, `L[0,:] = π`.
    fn decompose_non_reversible_real_spectrum() {
        let p = array![[0.7, 0.2, 0.1], [0.1, 0.8, 0.1], [0.3, 0.3, 0.4]];
        let pi = stationary_distribution(&p.view()).unwrap();
        assert!(!is_reversible(&p.view(), &pi.view(), REVERSIBILITY_TOL));

        let d = SpectralDecomposition::decompose(&p.view(), &pi.view(), false).unwrap();

        for (k, expected) in [1.0, 0.6, 0.3].iter().enumerate() {
            assert!((d.eigenvalues[k] - expected).abs() < 1e-8, "got {}", d.eigenvalues[k]);
        }
        assert_biorthonormal(&d);
        for i in 0..3 {
            assert!((d.left[[0, i]] - pi[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn decompose_cyclic_chain_reports_complex_spectrum() {
        let p = array![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let pi = stationary_distribution(&p.view()).unwrap();

        let err = SpectralDecomposition::decompose(&p.view(), &pi.view(), false).unwrap_err();

        assert!(matches!(err, MsmError::ComplexSpectrum { .. }));
    }

    #[test]
    fn timescales_follow_log_of_eigenvalue_modulus() {
        let p = array![[0.9, 0.1], [0.3, 0.7]];
        let d = decompose(&p);

        let ts = d.timescales(10);

        assert_eq!(ts.len(), 1);
        assert!((ts[0] - (-10.0 / 0.6f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn implied_timescale_edge_values() {
        assert_eq!(implied_timescale(1.0, 5.0), f64::INFINITY);
        assert_eq!(implied_timescale(0.0, 5.0), 0.0);
    }

    #[test]
    fn reference_coordinate_prefers_lowest_index_on_ties() {
        let v = array![0.5, -0.5, 0.1];
        assert_eq!(reference_coordinate(&v.view()), 0);
    }
}
