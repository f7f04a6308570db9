//! markov_stats — post-estimation statistics for Markov state models, with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the estimated-model and ensemble APIs to Python via the
//! `_markov_stats` extension module. Transition matrices and posterior
//! samples are estimated elsewhere; this crate maps states, reweights and
//! samples trajectory frames, simulates synthetic trajectories, and reports
//! ensemble uncertainty of model functionals.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `states` (full↔active mapping and frame
//!   index tables), `msm` (transition matrices, spectral functionals,
//!   [`ConnectivityModel`](msm::ConnectivityModel)), `sampling`
//!   (reweighting, frame sampling, chain simulation) and `ensemble`
//!   (statistics over sampled models).
//! - Define `#[pyclass]` wrappers `MarkovStateModel` and `BayesianEnsemble`
//!   and the `#[pymodule]` initializer when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Python-visible types keep the invariants of their Rust counterparts:
//!   a `MarkovStateModel` is always fully validated, a `BayesianEnsemble` is
//!   never empty.
//!
//! Conventions
//! -----------
//! - Labels and indices are 0-based; arrays are returned as numpy arrays of
//!   `float64` (values) or `uint64`/`int64` (indices).
//! - Errors from core Rust code map to `ValueError` with the original
//!   message.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod ensemble;
pub mod msm;
#[cfg(feature = "obs_slog")]
pub mod observability;
pub mod sampling;
pub mod states;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, PyArrayDyn, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "python-bindings")]
use crate::{
    ensemble::{Ensemble, StatisticsOptions},
    msm::{ConnectivityModel, MarkovModel},
    utils::{build_connectivity_model, extract_f64_matrix, extract_simulation_options},
};

/// MarkovStateModel — Python-facing wrapper for [`ConnectivityModel`].
///
/// Purpose
/// -------
/// Expose an estimated Markov state model, together with the discrete
/// trajectories it was estimated from, to Python callers.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `MarkovStateModel(dtrajs, transition_matrix, active_set, connected_sets,
/// count_matrix_full, lag=1, connectivity="largest", dt_traj="1 step",
/// seed=None)`:
/// - `dtrajs`: sequence of 1-D integer arrays in the full label space.
/// - `transition_matrix`: row-stochastic matrix on the active set.
/// - `active_set`, `connected_sets`: active labels and connected-set
///   partition (largest first).
/// - `count_matrix_full`: count matrix over the full label space.
/// - `seed`: seed for the internal random generator; `None` seeds from the
///   operating system.
///
/// Fields
/// ------
/// - `inner`: [`ConnectivityModel`]
/// - `rng`: generator used by sampling and simulation methods.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "markov_stats.msm")]
pub struct MarkovStateModel {
    inner: ConnectivityModel,
    rng: StdRng,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MarkovStateModel {
    #[new]
    #[pyo3(signature = (
        dtrajs,
        transition_matrix,
        active_set,
        connected_sets,
        count_matrix_full,
        lag = 1,
        connectivity = "largest",
        dt_traj = "1 step",
        seed = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        dtrajs: &Bound<'py, PyAny>, transition_matrix: &Bound<'py, PyAny>, active_set: Vec<usize>,
        connected_sets: Vec<Vec<usize>>, count_matrix_full: &Bound<'py, PyAny>, lag: usize,
        connectivity: &str, dt_traj: &str, seed: Option<u64>,
    ) -> PyResult<Self> {
        let inner = build_connectivity_model(
            dtrajs,
            transition_matrix,
            active_set,
            connected_sets,
            count_matrix_full,
            lag,
            connectivity,
            dt_traj,
        )?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(MarkovStateModel { inner, rng })
    }

    #[getter]
    pub fn lagtime(&self) -> usize {
        self.inner.lag()
    }

    #[getter]
    pub fn nstates_full(&self) -> usize {
        self.inner.nstates_full()
    }

    #[getter]
    pub fn nstates(&self) -> usize {
        self.inner.n_active()
    }

    #[getter]
    pub fn active_set(&self) -> Vec<usize> {
        self.inner.active_set().to_vec()
    }

    #[getter]
    pub fn connectivity(&self) -> String {
        self.inner.connectivity().to_string()
    }

    #[getter]
    pub fn largest_connected_set(&self) -> Vec<usize> {
        self.inner.largest_connected_set().to_vec()
    }

    #[getter]
    pub fn connected_sets(&self) -> Vec<Vec<usize>> {
        self.inner.connected_sets().to_vec()
    }

    #[getter]
    pub fn dt_traj(&self) -> String {
        self.inner.dt_traj().to_string()
    }

    #[getter]
    pub fn dt_model(&self) -> String {
        self.inner.dt_model().to_string()
    }

    #[getter]
    pub fn active_state_fraction(&self) -> f64 {
        self.inner.active_state_fraction()
    }

    #[getter]
    pub fn active_count_fraction(&self) -> f64 {
        self.inner.active_count_fraction()
    }

    #[getter]
    pub fn is_reversible(&self) -> bool {
        self.inner.is_reversible()
    }

    #[getter]
    pub fn count_matrix_full<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.count_matrix_full().clone().into_pyarray(py)
    }

    #[getter]
    pub fn count_matrix_active<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.count_matrix_active().clone().into_pyarray(py)
    }

    #[getter]
    pub fn transition_matrix<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.transition_matrix().clone().into_pyarray(py)
    }

    #[getter]
    pub fn stationary_distribution<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.stationary_distribution().clone().into_pyarray(py)
    }

    #[getter]
    pub fn discrete_trajectories_full(&self) -> Vec<Vec<usize>> {
        self.inner.discrete_trajectories_full().to_vec()
    }

    #[getter]
    pub fn discrete_trajectories_active(&self) -> Vec<Vec<i64>> {
        self.inner.discrete_trajectories_active().to_vec()
    }

    pub fn eigenvalues<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.eigenvalues()?.clone().into_pyarray(py))
    }

    pub fn eigenvectors_left<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.eigenvectors_left()?.clone().into_pyarray(py))
    }

    pub fn eigenvectors_right<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.eigenvectors_right()?.clone().into_pyarray(py))
    }

    pub fn timescales<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.inner.timescales()?.into_pyarray(py))
    }

    pub fn trajectory_weights<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyArray1<f64>>>> {
        let weights = self.inner.trajectory_weights()?;
        Ok(weights.into_iter().map(|w| w.into_pyarray(py)).collect())
    }

    /// Per active state, the `(n, 2)` array of `[trajectory, time]` frames.
    pub fn active_state_indexes<'py>(&self, py: Python<'py>) -> Vec<Bound<'py, PyArray2<usize>>> {
        let index = self.inner.active_state_indexes();
        index.pools().iter().map(|pool| crate::states::frames_to_array(pool).into_pyarray(py)).collect()
    }

    #[pyo3(signature = (nsample, subset = None, replace = true))]
    pub fn sample_by_state<'py>(
        &mut self, py: Python<'py>, nsample: usize, subset: Option<Vec<usize>>, replace: bool,
    ) -> PyResult<Vec<Bound<'py, PyArray2<usize>>>> {
        let samples =
            self.inner.sample_by_state(nsample, subset.as_deref(), replace, &mut self.rng)?;
        Ok(samples.into_iter().map(|(_, frames)| frames.into_pyarray(py)).collect())
    }

    pub fn sample_by_distributions<'py>(
        &mut self, py: Python<'py>, distributions: &Bound<'py, PyAny>, nsample: usize,
    ) -> PyResult<Vec<Bound<'py, PyArray2<usize>>>> {
        let distributions = extract_f64_matrix(distributions)?;
        let samples =
            self.inner.sample_by_distributions(&distributions.view(), nsample, &mut self.rng)?;
        Ok(samples.into_iter().map(|frames| frames.into_pyarray(py)).collect())
    }

    #[pyo3(signature = (n, start = None, stop = None, stride = 1))]
    pub fn generate_traj<'py>(
        &mut self, py: Python<'py>, n: usize, start: Option<usize>, stop: Option<Vec<usize>>,
        stride: usize,
    ) -> PyResult<Bound<'py, PyArray2<usize>>> {
        let opts = extract_simulation_options(n, start, stop, stride)?;
        let chain = self.inner.generate_traj(&opts, &mut self.rng)?;
        Ok(chain.frames.into_pyarray(py))
    }
}

/// BayesianEnsemble — Python-facing wrapper for an [`Ensemble`] of
/// [`MarkovModel`]s.
///
/// Purpose
/// -------
/// Aggregate posterior samples of transition matrices into mean, standard
/// deviation and confidence intervals of model functionals.
///
/// Parameters
/// ----------
/// Constructed via `BayesianEnsemble(samples, lag=1, conf=0.95)`:
/// - `samples`: sequence of row-stochastic matrices of identical size.
/// - `lag`: lag time shared by all samples.
/// - `conf`: default confidence level in `(0, 1)`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "markov_stats.msm")]
pub struct BayesianEnsemble {
    inner: Ensemble<MarkovModel>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl BayesianEnsemble {
    #[new]
    #[pyo3(signature = (samples, lag = 1, conf = 0.95))]
    pub fn new<'py>(
        samples: Vec<PyReadonlyArray2<'py, f64>>, lag: usize, conf: f64,
    ) -> PyResult<Self> {
        let members = samples
            .iter()
            .map(|p| MarkovModel::new(p.as_array().to_owned(), lag))
            .collect::<Result<Vec<_>, _>>()?;
        let inner = Ensemble::with_options(members, StatisticsOptions::new(conf, false)?)?;
        Ok(BayesianEnsemble { inner })
    }

    #[getter]
    pub fn nsamples(&self) -> usize {
        self.inner.len()
    }

    /// Samples of functional `name`, stacked along axis 0.
    pub fn sample_f<'py>(&self, py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        Ok(self.inner.stacked_values(name)?.into_pyarray(py))
    }

    pub fn sample_mean<'py>(
        &self, py: Python<'py>, name: &str,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        Ok(self.inner.sample_mean(name)?.into_pyarray(py))
    }

    pub fn sample_std<'py>(
        &self, py: Python<'py>, name: &str,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        Ok(self.inner.sample_std(name)?.into_pyarray(py))
    }

    #[pyo3(signature = (name, conf = None))]
    pub fn sample_conf<'py>(
        &self, py: Python<'py>, name: &str, conf: Option<f64>,
    ) -> PyResult<(Bound<'py, PyArrayDyn<f64>>, Bound<'py, PyArrayDyn<f64>>)> {
        let conf = conf.unwrap_or(self.inner.options().confidence);
        let (lower, upper) = self.inner.sample_confidence(name, conf)?;
        Ok((lower.into_pyarray(py), upper.into_pyarray(py)))
    }
}

/// _markov_stats — PyO3 module initializer for the Python extension.
///
/// Creates the `msm` submodule, registers both classes in it, attaches it
/// to `_markov_stats`, and inserts it into `sys.modules` so that
/// `markov_stats.msm` resolves with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _markov_stats<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let msm_mod = PyModule::new(_py, "msm")?;
    msm_mod.add_class::<MarkovStateModel>()?;
    msm_mod.add_class::<BayesianEnsemble>()?;
    m.add_submodule(&msm_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("markov_stats.msm", msm_mod)?;
    Ok(())
}
