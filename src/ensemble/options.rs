//! Statistics options — confidence level and verbosity for ensemble
//! summaries.
use crate::ensemble::errors::{EnsembleError, EnsembleResult};

/// Default two-sided confidence level.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// StatisticsOptions — configuration of an [`Ensemble`](crate::ensemble::Ensemble).
///
/// Fields
/// ------
/// - `confidence`: `f64` in `(0, 1)`, used by summaries when no explicit
///   level is given.
/// - `verbose`: log a line per evaluated functional (requires `obs_slog`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsOptions {
    pub confidence: f64,
    pub verbose: bool,
}

impl StatisticsOptions {
    /// Errors
    /// ------
    /// - `EnsembleError::InvalidConfidence` unless `0 < confidence < 1`.
    pub fn new(confidence: f64, verbose: bool) -> EnsembleResult<Self> {
        validate_confidence(confidence)?;
        Ok(StatisticsOptions { confidence, verbose })
    }
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        StatisticsOptions { confidence: DEFAULT_CONFIDENCE, verbose: false }
    }
}

/// Check that `confidence` lies in the open interval `(0, 1)`.
pub fn validate_confidence(confidence: f64) -> EnsembleResult<()> {
    if confidence.is_finite() && confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(EnsembleError::InvalidConfidence { value: confidence })
    }
}
