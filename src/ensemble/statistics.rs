//! ensemble::statistics — sample statistics of model functionals.
//!
//! Purpose
//! -------
//! Aggregate a functional (eigenvalues, stationary distribution, ...) over a
//! fixed ensemble of sampled models into elementwise mean, standard
//! deviation and confidence intervals. This is how posterior uncertainty of
//! a Bayesian Markov model is reported.
//!
//! Key behaviors
//! -------------
//! - [`Ensemble::sample_values`] evaluates the functional on every member in
//!   parallel (`rayon`), checks that all shapes agree with member 0, and
//!   canonicalizes ordering and signs (see [`crate::ensemble::canonical`]).
//! - [`sample_mean`] / [`sample_std`] reduce elementwise with
//!   `statrs::statistics::Statistics`; the standard deviation is the
//!   unbiased (`n − 1`) estimator.
//! - [`sample_confidence`] returns order-statistic bounds around the mean.
//!
//! Invariants & assumptions
//! ------------------------
//! - Samples keep ensemble order.
//! - `lower <= mean <= upper` holds elementwise for every confidence level.
//! - Members are never mutated; each statistic re-evaluates the functional
//!   (members cache their own expensive quantities).
//!
//! Conventions
//! -----------
//! - Confidence interval: with sorted values `v₀ ≤ … ≤ v_{n−1}`, mean `m`,
//!   `k = #{v < m}` and `h = ⌊c·n/2⌋`, the bounds are
//!   `min(v_{max(k−h, 0)}, m)` and `max(v_{min(k+h, n−1)}, m)`.
use crate::ensemble::{
    canonical::canonicalize,
    errors::{EnsembleError, EnsembleResult},
    functional::{Functional, SampledModel},
    options::{StatisticsOptions, validate_confidence},
};
use ndarray::{ArrayD, ArrayView, Axis, IxDyn, stack};
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Ensemble — a fixed, non-empty collection of sampled models.
#[derive(Debug, Clone)]
pub struct Ensemble<M> {
    members: Vec<M>,
    options: StatisticsOptions,
}

/// EnsembleSummary — mean, spread and interval of one functional.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    pub functional: Functional,
    pub n_samples: usize,
    pub confidence: f64,
    pub mean: ArrayD<f64>,
    pub std: ArrayD<f64>,
    pub lower: ArrayD<f64>,
    pub upper: ArrayD<f64>,
}

impl<M: SampledModel> Ensemble<M> {
    /// Errors
    /// ------
    /// - `EnsembleError::EmptyEnsemble` if `members` is empty.
    pub fn new(members: Vec<M>) -> EnsembleResult<Self> {
        Ensemble::with_options(members, StatisticsOptions::default())
    }

    /// Errors
    /// ------
    /// - `EnsembleError::EmptyEnsemble` if `members` is empty.
    /// - `EnsembleError::InvalidConfidence` for a bad default level.
    pub fn with_options(members: Vec<M>, options: StatisticsOptions) -> EnsembleResult<Self> {
        if members.is_empty() {
            return Err(EnsembleError::EmptyEnsemble);
        }
        validate_confidence(options.confidence)?;
        Ok(Ensemble { members, options })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[M] {
        &self.members
    }

    pub fn options(&self) -> &StatisticsOptions {
        &self.options
    }

    /// Canonicalized per-member values of the functional named `name`.
    pub fn sample_values(&self, name: &str) -> EnsembleResult<Vec<ArrayD<f64>>> {
        self.values(name.parse()?)
    }

    /// Canonicalized per-member values of `functional`, in ensemble order.
    ///
    /// Errors
    /// ------
    /// - `EnsembleError::Model` if any member fails to evaluate.
    /// - `EnsembleError::ShapeMismatch` for the first member whose shape
    ///   differs from member 0.
    pub fn values(&self, functional: Functional) -> EnsembleResult<Vec<ArrayD<f64>>> {
        let mut samples = self
            .members
            .par_iter()
            .map(|member| member.evaluate(functional))
            .collect::<Result<Vec<_>, _>>()?;
        check_shapes(&samples)?;
        canonicalize(&mut samples, functional)?;

        #[cfg(feature = "obs_slog")]
        if self.options.verbose {
            let log = crate::observability::term_logger();
            slog::info!(log, "ensemble functional evaluated";
                "functional" => functional.name(),
                "members" => samples.len(),
                "shape" => format!("{:?}", samples[0].shape()));
        }
        Ok(samples)
    }

    /// Samples stacked along a new leading axis, shape `(n, ...)`.
    pub fn stacked_values(&self, name: &str) -> EnsembleResult<ArrayD<f64>> {
        stack_samples(&self.sample_values(name)?)
    }

    pub fn sample_mean(&self, name: &str) -> EnsembleResult<ArrayD<f64>> {
        sample_mean(&self.sample_values(name)?)
    }

    pub fn sample_std(&self, name: &str) -> EnsembleResult<ArrayD<f64>> {
        sample_std(&self.sample_values(name)?)
    }

    pub fn sample_confidence(
        &self, name: &str, confidence: f64,
    ) -> EnsembleResult<(ArrayD<f64>, ArrayD<f64>)> {
        sample_confidence(&self.sample_values(name)?, confidence)
    }

    /// Mean, std and interval of `name` from a single evaluation pass.
    /// `confidence = None` uses the ensemble's default level.
    pub fn summary(&self, name: &str, confidence: Option<f64>) -> EnsembleResult<EnsembleSummary> {
        let functional: Functional = name.parse()?;
        let confidence = confidence.unwrap_or(self.options.confidence);
        let samples = self.values(functional)?;
        let (lower, upper) = sample_confidence(&samples, confidence)?;
        Ok(EnsembleSummary {
            functional,
            n_samples: samples.len(),
            confidence,
            mean: sample_mean(&samples)?,
            std: sample_std(&samples)?,
            lower,
            upper,
        })
    }
}

/// sample_mean — elementwise mean over samples of identical shape.
pub fn sample_mean(samples: &[ArrayD<f64>]) -> EnsembleResult<ArrayD<f64>> {
    reduce_elementwise(samples, |column| column.iter().mean())
}

/// sample_std — elementwise unbiased standard deviation.
///
/// Errors
/// ------
/// - `EnsembleError::InsufficientSamples` with fewer than two samples.
pub fn sample_std(samples: &[ArrayD<f64>]) -> EnsembleResult<ArrayD<f64>> {
    if samples.len() < 2 {
        return Err(EnsembleError::InsufficientSamples { needed: 2, got: samples.len() });
    }
    reduce_elementwise(samples, |column| column.iter().std_dev())
}

/// sample_confidence — elementwise `(lower, upper)` bounds at level
/// `confidence`.
///
/// Errors
/// ------
/// - `EnsembleError::InvalidConfidence` unless `0 < confidence < 1`.
pub fn sample_confidence(
    samples: &[ArrayD<f64>], confidence: f64,
) -> EnsembleResult<(ArrayD<f64>, ArrayD<f64>)> {
    validate_confidence(confidence)?;
    let lower = reduce_elementwise(samples, |column| confidence_bounds(column, confidence).0)?;
    let upper = reduce_elementwise(samples, |column| confidence_bounds(column, confidence).1)?;
    Ok((lower, upper))
}

/// confidence_bounds — order-statistic interval around the mean of `values`.
///
/// A window of `⌈confidence·n⌉` consecutive order statistics is centered on
/// the position of the mean in the sorted sample. A window that runs past
/// either end is shifted back inside, so it always holds that many values.
/// The bounds are then widened to the mean if needed.
///
/// The returned pair always brackets the mean; an empty slice gives
/// `(NaN, NaN)`.
pub fn confidence_bounds(values: &[f64], confidence: f64) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().mean();
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let below = sorted.iter().filter(|&&v| v < mean).count();
    let width = ((confidence * n as f64).ceil() as usize).clamp(1, n);
    let (lo, hi) = centered_window(below, width - 1, n);
    (sorted[lo].min(mean), sorted[hi].max(mean))
}

/// stack_samples — stack equally shaped samples along a new axis 0.
pub fn stack_samples(samples: &[ArrayD<f64>]) -> EnsembleResult<ArrayD<f64>> {
    check_shapes(samples)?;
    let views: Vec<ArrayView<f64, IxDyn>> = samples.iter().map(|s| s.view()).collect();
    // `stack` only fails on an empty input or unequal shapes, both rejected
    // by `check_shapes`.
    stack(Axis(0), &views).map_err(|_| EnsembleError::EmptyEnsemble)
}

// ---- Helper methods ----

/// Index range `[lo, lo + span]` centered on `center` and shifted to fit in
/// `0..n`. Requires `span < n`.
fn centered_window(center: usize, span: usize, n: usize) -> (usize, usize) {
    let lo = center.saturating_sub(span / 2).min(n - 1 - span);
    (lo, lo + span)
}

fn check_shapes(samples: &[ArrayD<f64>]) -> EnsembleResult<()> {
    let first = samples.first().ok_or(EnsembleError::EmptyEnsemble)?;
    for (index, sample) in samples.iter().enumerate().skip(1) {
        if sample.shape() != first.shape() {
            return Err(EnsembleError::ShapeMismatch {
                index,
                expected: first.shape().to_vec(),
                actual: sample.shape().to_vec(),
            });
        }
    }
    Ok(())
}

/// Apply `reduce` to the vector of member values at every element position.
fn reduce_elementwise<F>(samples: &[ArrayD<f64>], reduce: F) -> EnsembleResult<ArrayD<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    check_shapes(samples)?;
    let first = &samples[0];
    let mut columns = vec![Vec::with_capacity(samples.len()); first.len()];
    for sample in samples {
        for (column, &value) in columns.iter_mut().zip(sample.iter()) {
            column.push(value);
        }
    }
    let mut out = ArrayD::zeros(first.raw_dim());
    for (slot, column) in out.iter_mut().zip(&columns) {
        *slot = reduce(column);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msm::{errors::MsmResult, model::MarkovModel};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Elementwise reductions on hand-built samples.
    // - Confidence bounds bracketing the mean, including skewed samples.
    // - Shape checks, empty ensembles and insufficient samples.
    // - Sign canonicalization flowing through `Ensemble::values`.
    // -------------------------------------------------------------------------

    #[derive(Debug)]
    struct Fixed(ArrayD<f64>);

    impl SampledModel for Fixed {
        fn evaluate(&self, _functional: Functional) -> MsmResult<ArrayD<f64>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    // Purpose
    // -------
    // Mean and unbiased std agree with hand computation.
    //
    // Given
    // -----
    // - Samples [1, 10], [3, 10], [5, 10].
    //
    // Expect
    // ------
    // - mean = [3, 10], std = [2, 0].
    fn sample_mean_and_std_elementwise() {
        let samples =
            vec![array![1.0, 10.0].into_dyn(), array![3.0, 10.0].into_dyn(), array![5.0, 10.0].into_dyn()];

        let mean = sample_mean(&samples).unwrap();
        let std = sample_std(&samples).unwrap();

        assert!((mean[[0]] - 3.0).abs() < 1e-12);
        assert!((mean[[1]] - 10.0).abs() < 1e-12);
        assert!((std[[0]] - 2.0).abs() < 1e-12);
        assert!(std[[1]].abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Order-statistic bounds around the mean for a symmetric sample.
    //
    // Given
    // -----
    // - Values 1..=10 (mean 5.5), confidence 0.5.
    //
    // Expect
    // ------
    // - k = 5 values below the mean, h = 2: bounds are v₃ = 4 and v₇ = 8.
    fn confidence_bounds_symmetric_sample() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();

        let (lower, upper) = confidence_bounds(&values, 0.5);

        assert_eq!(lower, 4.0);
        assert_eq!(upper, 8.0);
    }

    #[test]
    fn confidence_bounds_bracket_mean_for_skewed_sample() {
        let values = [0.0, 0.0, 0.0, 0.0, 100.0];

        let (lower, upper) = confidence_bounds(&values, 0.3);

        assert!(lower <= 20.0 && 20.0 <= upper, "({lower}, {upper})");
    }

    #[test]
    fn confidence_bounds_single_sample_collapse_to_value() {
        assert_eq!(confidence_bounds(&[0.7], 0.95), (0.7, 0.7));
    }

    #[test]
    // Purpose
    // -------
    // A window that runs past the top of the sorted sample is shifted down
    // and keeps the requested coverage.
    //
    // Given
    // -----
    // - Nineteen values 0.00, 0.01, ..., 0.18 and one outlier 1000.0
    //   (mean ≈ 50.09, so all but one value lie below it).
    // - Confidence 0.95.
    //
    // Expect
    // ------
    // - At least 19 of 20 values lie in [lower, upper].
    // - lower = 0.01 (second order statistic), upper = 1000.0.
    fn confidence_bounds_keep_coverage_when_window_hits_the_edge() {
        let mut values: Vec<f64> = (0..19).map(|i| f64::from(i) / 100.0).collect();
        values.push(1000.0);

        let (lower, upper) = confidence_bounds(&values, 0.95);
        let inside = values.iter().filter(|&&v| lower <= v && v <= upper).count();

        assert!(inside >= 19, "({lower}, {upper}) covers {inside}/20");
        assert_eq!(lower, 0.01);
        assert_eq!(upper, 1000.0);
    }

    #[test]
    fn confidence_bounds_keep_coverage_when_window_hits_the_bottom() {
        let mut values = vec![-1000.0];
        values.extend((0..9).map(f64::from));

        let (lower, upper) = confidence_bounds(&values, 0.8);
        let inside = values.iter().filter(|&&v| lower <= v && v <= upper).count();

        assert!(inside >= 8, "({lower}, {upper}) covers {inside}/10");
        assert_eq!(lower, -1000.0);
    }

    #[test]
    fn stack_samples_adds_leading_axis_and_reports_mismatch() {
        let good = vec![array![1.0, 2.0].into_dyn(), array![3.0, 4.0].into_dyn()];
        let bad = vec![array![1.0, 2.0].into_dyn(), array![[1.0], [2.0]].into_dyn()];

        let stacked = stack_samples(&good).unwrap();

        assert_eq!(stacked.shape(), &[2, 2]);
        assert_eq!(stacked[[1, 0]], 3.0);
        assert_eq!(
            stack_samples(&bad).unwrap_err(),
            EnsembleError::ShapeMismatch { index: 1, expected: vec![2], actual: vec![2, 1] }
        );
        assert_eq!(stack_samples(&[]).unwrap_err(), EnsembleError::EmptyEnsemble);
    }

    #[test]
    fn sample_std_needs_two_samples() {
        let samples = vec![array![1.0].into_dyn()];

        let err = sample_std(&samples).unwrap_err();

        assert_eq!(err, EnsembleError::InsufficientSamples { needed: 2, got: 1 });
    }

    #[test]
    fn ensemble_rejects_empty_and_mismatched_members() {
        let empty: Vec<Fixed> = Vec::new();
        let mismatched = Ensemble::new(vec![
            Fixed(array![1.0, 2.0].into_dyn()),
            Fixed(array![1.0, 2.0, 3.0].into_dyn()),
        ])
        .unwrap();

        assert_eq!(Ensemble::new(empty).unwrap_err(), EnsembleError::EmptyEnsemble);
        assert_eq!(
            mismatched.sample_values("eigenvalues").unwrap_err(),
            EnsembleError::ShapeMismatch { index: 1, expected: vec![2], actual: vec![3] }
        );
        assert!(matches!(
            mismatched.sample_values("bogus").unwrap_err(),
            EnsembleError::UnknownFunctional { .. }
        ));
        assert!(matches!(
            mismatched.sample_confidence("eigenvalues", 1.5).unwrap_err(),
            EnsembleError::InvalidConfidence { .. } | EnsembleError::ShapeMismatch { .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // Eigenvectors that differ only in sign average to the aligned vector.
    //
    // Given
    // -----
    // - Two members whose right eigenvector matrices differ by the sign of
    //   column 1.
    //
    // Expect
    // ------
    // - Mean equals the aligned matrix and std is zero.
    fn ensemble_aligns_eigenvector_signs_before_averaging() {
        let a = array![[1.0, 0.6], [1.0, -0.4]].into_dyn();
        let b = array![[1.0, -0.6], [1.0, 0.4]].into_dyn();
        let ensemble = Ensemble::new(vec![Fixed(a.clone()), Fixed(b)]).unwrap();

        let mean = ensemble.sample_mean("eigenvectors_right").unwrap();
        let std = ensemble.sample_std("eigenvectors_right").unwrap();

        assert_eq!(mean, a);
        assert!(std.iter().all(|&s| s.abs() < 1e-12));
    }

    #[test]
    fn ensemble_summary_of_markov_models() {
        let members = vec![
            MarkovModel::new(array![[0.9, 0.1], [0.2, 0.8]], 1).unwrap(),
            MarkovModel::new(array![[0.8, 0.2], [0.3, 0.7]], 1).unwrap(),
            MarkovModel::new(array![[0.85, 0.15], [0.25, 0.75]], 1).unwrap(),
        ];
        let ensemble = Ensemble::new(members).unwrap();

        let summary = ensemble.summary("stationary_distribution", None).unwrap();
        let stacked = ensemble.stacked_values("eigenvalues").unwrap();

        assert_eq!(summary.n_samples, 3);
        assert_eq!(summary.confidence, 0.95);
        assert!((summary.mean.sum() - 1.0).abs() < 1e-12);
        for ((&lo, &m), &hi) in summary.lower.iter().zip(&summary.mean).zip(&summary.upper) {
            assert!(lo <= m && m <= hi);
        }
        assert_eq!(stacked.shape(), &[3, 2]);
        for row in stacked.axis_iter(Axis(0)) {
            assert!((row[[0]] - 1.0).abs() < 1e-10);
        }
    }
}
