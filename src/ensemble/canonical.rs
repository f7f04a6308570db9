//! ensemble::canonical — sign and order conventions applied before
//! cross-sample arithmetic.
//!
//! Eigenvectors are only defined up to sign, and independently computed
//! eigendecompositions are free to return either sign. Averaging such
//! samples directly would cancel them out, so every member is brought to a
//! common convention first:
//!
//! - Eigenvalues are ordered by descending modulus within each member
//!   (descending value breaks ties), which puts the Perron eigenvalue first.
//! - For eigenvector `k`, the reference coordinate is the largest-magnitude
//!   coordinate of member 0's eigenvector `k` (lowest index on ties). Every
//!   member's eigenvector `k` is flipped so that coordinate is
//!   non-negative.
//! - Left eigenvectors (rows) and right eigenvectors (columns) are
//!   canonicalized independently.
use crate::{
    ensemble::{
        errors::{EnsembleError, EnsembleResult},
        functional::Functional,
    },
    msm::{errors::MsmError, spectral::reference_coordinate},
};
use ndarray::{ArrayD, ArrayViewMut1, Axis, Ix2};

/// canonicalize — apply the ordering/sign convention for `functional` to
/// every sample in place. Functionals without a convention are untouched.
///
/// Errors
/// ------
/// - `EnsembleError::Model` if eigenvector samples are not 2-D.
pub fn canonicalize(samples: &mut [ArrayD<f64>], functional: Functional) -> EnsembleResult<()> {
    match functional {
        Functional::Eigenvalues => {
            for values in samples.iter_mut() {
                order_by_modulus(values);
            }
            Ok(())
        }
        Functional::EigenvectorsLeft => align_signs(samples, Axis(0)),
        Functional::EigenvectorsRight => align_signs(samples, Axis(1)),
        _ => Ok(()),
    }
}

/// Sort a flat array of eigenvalues by descending modulus, then value.
pub fn order_by_modulus(values: &mut ArrayD<f64>) {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| b.abs().total_cmp(&a.abs()).then(b.total_cmp(a)));
    for (slot, v) in values.iter_mut().zip(sorted) {
        *slot = v;
    }
}

/// Flip eigenvectors laid out along `axis` (0: rows, 1: columns) so each
/// member agrees with member 0 on the sign of the reference coordinate.
fn align_signs(samples: &mut [ArrayD<f64>], axis: Axis) -> EnsembleResult<()> {
    let Some(first) = samples.first() else {
        return Ok(());
    };
    let first = first.view().into_dimensionality::<Ix2>().map_err(|_| rank_error(first.ndim()))?;
    let references: Vec<usize> =
        first.axis_iter(axis).map(|vector| reference_coordinate(&vector)).collect();

    for sample in samples.iter_mut() {
        let ndim = sample.ndim();
        let mut matrix =
            sample.view_mut().into_dimensionality::<Ix2>().map_err(|_| rank_error(ndim))?;
        for (vector, &pivot) in matrix.axis_iter_mut(axis).zip(&references) {
            flip_if_negative(vector, pivot);
        }
    }
    Ok(())
}

fn flip_if_negative(mut vector: ArrayViewMut1<f64>, pivot: usize) {
    if vector.get(pivot).is_some_and(|&v| v < 0.0) {
        vector.mapv_inplace(|v| -v);
    }
}

fn rank_error(ndim: usize) -> EnsembleError {
    EnsembleError::Model(MsmError::DimensionMismatch {
        expected: 2,
        actual: ndim,
        what: "eigenvector sample rank",
    })
}
