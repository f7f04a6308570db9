//! ensemble::functional — named model quantities aggregated over ensembles.
//!
//! A [`Functional`] names one derived quantity of a Markov model. Ensemble
//! members implement [`SampledModel`] to evaluate functionals as dynamic
//! arrays, so the statistics engine can aggregate scalars, vectors and
//! matrices the same way.
use crate::{
    ensemble::errors::{EnsembleError, EnsembleResult},
    msm::{errors::MsmResult, model::MarkovModel},
};
use ndarray::ArrayD;
use std::str::FromStr;

/// Model quantities that can be sampled across an ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Functional {
    TransitionMatrix,
    /// Ordered by descending modulus; the first is the Perron eigenvalue.
    Eigenvalues,
    /// Rows are eigenvectors.
    EigenvectorsLeft,
    /// Columns are eigenvectors.
    EigenvectorsRight,
    StationaryDistribution,
    Timescales,
}

impl Functional {
    pub const ALL: [Functional; 6] = [
        Functional::TransitionMatrix,
        Functional::Eigenvalues,
        Functional::EigenvectorsLeft,
        Functional::EigenvectorsRight,
        Functional::StationaryDistribution,
        Functional::Timescales,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Functional::TransitionMatrix => "transition_matrix",
            Functional::Eigenvalues => "eigenvalues",
            Functional::EigenvectorsLeft => "eigenvectors_left",
            Functional::EigenvectorsRight => "eigenvectors_right",
            Functional::StationaryDistribution => "stationary_distribution",
            Functional::Timescales => "timescales",
        }
    }
}

impl FromStr for Functional {
    type Err = EnsembleError;

    /// Parse a functional name (case-insensitive, `-` accepted for `_`).
    fn from_str(s: &str) -> EnsembleResult<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Functional::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| EnsembleError::UnknownFunctional { name: s.to_string() })
    }
}

impl std::fmt::Display for Functional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A model that can be evaluated as an ensemble member.
///
/// Implementors must be `Sync`; members are evaluated in parallel and never
/// mutated during statistics.
pub trait SampledModel: Sync {
    /// Evaluate `functional` as a dynamic-dimensional array.
    fn evaluate(&self, functional: Functional) -> MsmResult<ArrayD<f64>>;
}

impl SampledModel for MarkovModel {
    fn evaluate(&self, functional: Functional) -> MsmResult<ArrayD<f64>> {
        let value = match functional {
            Functional::TransitionMatrix => self.transition_matrix().clone().into_dyn(),
            Functional::Eigenvalues => self.eigenvalues()?.clone().into_dyn(),
            Functional::EigenvectorsLeft => self.eigenvectors_left()?.clone().into_dyn(),
            Functional::EigenvectorsRight => self.eigenvectors_right()?.clone().into_dyn(),
            Functional::StationaryDistribution => self.stationary_distribution().clone().into_dyn(),
            Functional::Timescales => self.timescales()?.into_dyn(),
        };
        Ok(value)
    }
}
