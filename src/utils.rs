//! Python input extraction helpers for the `python-bindings` feature.
//!
//! Every helper accepts loosely typed Python objects (numpy arrays, pandas
//! objects exposing `to_numpy`, or nested sequences), converts them into
//! owned Rust containers, and maps malformed input to `TypeError` /
//! `ValueError`. Domain validation is left to the core constructors.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{PyArrayMethods, PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use crate::{
    msm::{
        connectivity::{ConnectivityModel, EstimationData},
        model::MarkovModel,
        options::ModelOptions,
    },
    sampling::chain::SimulationOptions,
};

/// Dense `float64` matrix from a 2-D ndarray, DataFrame or nested sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray, DataFrame, or nested sequence of float64")
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(PyValueError::new_err("matrix rows must all have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let nrows = if ncols == 0 { 0 } else { flat.len() / ncols };
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyValueError::new_err(format!("invalid matrix shape: {e}")))
}

/// Discrete trajectories from a sequence of integer arrays or sequences.
///
/// Negative labels are rejected; the full label space is non-negative.
#[cfg(feature = "python-bindings")]
pub fn extract_trajectories<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Vec<Vec<usize>>> {
    let mut trajectories = Vec::new();
    for item in raw.try_iter()? {
        let item = item?;
        let labels: Vec<i64> = match item.extract::<PyReadonlyArray1<i64>>() {
            Ok(arr) => arr.as_array().to_vec(),
            Err(_) => item.extract().map_err(|_| {
                PyTypeError::new_err("each trajectory must be a 1-D integer array or sequence")
            })?,
        };
        let traj = labels
            .into_iter()
            .map(|label| {
                usize::try_from(label).map_err(|_| {
                    PyValueError::new_err(format!("trajectory labels must be >= 0; got {label}"))
                })
            })
            .collect::<PyResult<Vec<usize>>>()?;
        trajectories.push(traj);
    }
    Ok(trajectories)
}

/// Assemble a validated [`ConnectivityModel`] from Python-side inputs.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_connectivity_model<'py>(
    dtrajs: &Bound<'py, PyAny>, transition_matrix: &Bound<'py, PyAny>, active_set: Vec<usize>,
    connected_sets: Vec<Vec<usize>>, count_matrix_full: &Bound<'py, PyAny>, lag: usize,
    connectivity: &str, dt_traj: &str,
) -> PyResult<ConnectivityModel> {
    let options = ModelOptions::new(lag, connectivity.parse()?, dt_traj)?;
    let model = MarkovModel::new(extract_f64_matrix(transition_matrix)?, lag)?;
    let data = EstimationData {
        trajectories: extract_trajectories(dtrajs)?,
        active_set,
        connected_sets,
        count_matrix_full: extract_f64_matrix(count_matrix_full)?,
        count_matrix_active: None,
    };
    Ok(ConnectivityModel::new(data, model, options)?)
}

/// Simulation options from the `generate_traj` keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_simulation_options(
    length: usize, start: Option<usize>, stop: Option<Vec<usize>>, stride: usize,
) -> PyResult<SimulationOptions> {
    Ok(SimulationOptions::new(length, start, stop, stride, false)?)
}
