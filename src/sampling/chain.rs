//! sampling::chain — synthetic trajectories from a Markov model.
//!
//! Purpose
//! -------
//! Simulate a discrete Markov chain with a model's transition matrix and
//! map each simulated state to a concrete input frame, producing a
//! synthetic trajectory that can be written out as real configurations.
//!
//! Key behaviors
//! -------------
//! - The start state is given, or drawn from the stationary distribution.
//! - Each step draws the next state from the current row of `P`.
//! - With a stop set, simulation halts the first time a stop state is
//!   *entered*; that state is the last element. Starting inside the stop set
//!   does not count as entering it.
//! - Every simulated state is then replaced by one uniformly drawn
//!   `(trajectory, time)` frame from its pool.
//!
//! Invariants & assumptions
//! ------------------------
//! - `frames.nrows() == states.len() <= length`.
//! - `stride` only labels the spacing of consecutive elements
//!   (`stride · lag` trajectory steps); dynamics always use the one-lag
//!   matrix and no intermediate frames are interpolated.
//!
//! Conventions
//! -----------
//! - States are active indices.
//! - With the `obs_slog` feature and `verbose = true`, one summary line is
//!   logged per generated chain.
use crate::{
    msm::model::MarkovModel,
    sampling::{
        errors::{SamplingError, SamplingResult},
        state_sampler::sample_by_sequence,
    },
    states::index::ActiveStateIndex,
};
use ndarray::Array2;
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};

/// SimulationOptions — configuration for [`generate`].
///
/// Fields
/// ------
/// - `length`: maximum number of elements in the chain (start included).
/// - `start`: start state; `None` draws it from the stationary distribution.
/// - `stop`: optional stop set of active states.
/// - `stride`: multiple of the lag time between consecutive elements.
/// - `verbose`: log a summary line (requires `obs_slog`).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    pub length: usize,
    pub start: Option<usize>,
    pub stop: Option<Vec<usize>>,
    pub stride: usize,
    pub verbose: bool,
}

impl SimulationOptions {
    /// Errors
    /// ------
    /// - `SamplingError::InvalidStride` if `stride == 0`.
    pub fn new(
        length: usize, start: Option<usize>, stop: Option<Vec<usize>>, stride: usize,
        verbose: bool,
    ) -> SamplingResult<Self> {
        if stride == 0 {
            return Err(SamplingError::InvalidStride { stride });
        }
        Ok(SimulationOptions { length, start, stop, stride, verbose })
    }
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions { length: 1000, start: None, stop: None, stride: 1, verbose: false }
    }
}

/// Why a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested length was reached.
    Length,
    /// A stop state was entered before the requested length.
    StopSet,
}

/// SimulatedChain — states and frames of one synthetic trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedChain {
    /// Simulated active states.
    pub states: Vec<usize>,
    /// `(len, 2)` array of `[trajectory, time]` rows, one per state.
    pub frames: Array2<usize>,
    /// Multiple of the lag time between consecutive elements.
    pub stride: usize,
    pub stop_reason: StopReason,
}

impl SimulatedChain {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Model-time offset of element `i` in units of the lag time.
    pub fn lag_offset(&self, i: usize) -> usize {
        i * self.stride
    }
}

/// generate — simulate a chain and map it onto input frames.
///
/// Parameters
/// ----------
/// - `model`: Markov model over the active states.
/// - `index`: active-state index table for the same active set.
/// - `opts`: length, start, stop set and stride.
/// - `rng`: random source.
///
/// Errors
/// ------
/// - `SamplingError::InvalidStride` if `opts.stride == 0`.
/// - `SamplingError::DimensionMismatch` if `model` and `index` disagree on
///   the number of states.
/// - `SamplingError::InvalidState` for an out-of-range start or stop state.
/// - `SamplingError::EmptyPool` if a visited state has no frames.
pub fn generate<R: Rng + ?Sized>(
    model: &MarkovModel, index: &ActiveStateIndex, opts: &SimulationOptions, rng: &mut R,
) -> SamplingResult<SimulatedChain> {
    if opts.stride == 0 {
        return Err(SamplingError::InvalidStride { stride: opts.stride });
    }
    let n_states = model.n_states();
    if index.n_states() != n_states {
        return Err(SamplingError::DimensionMismatch {
            expected: n_states,
            actual: index.n_states(),
            what: "active-state index table",
        });
    }
    let in_range = |state: usize| {
        if state < n_states { Ok(state) } else { Err(SamplingError::InvalidState { state, n_states }) }
    };
    let start = opts.start.map(in_range).transpose()?;
    let mut stop_set = vec![false; n_states];
    for &state in opts.stop.iter().flatten() {
        stop_set[in_range(state)?] = true;
    }

    let (states, stop_reason) = simulate_states(model, opts.length, start, &stop_set, rng)?;
    let frames = sample_by_sequence(index, &states, rng)?;

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let log = crate::observability::term_logger();
        slog::info!(log, "synthetic trajectory generated";
            "requested" => opts.length,
            "steps" => states.len(),
            "stopped_early" => stop_reason == StopReason::StopSet,
            "stride" => opts.stride);
    }

    Ok(SimulatedChain { states, frames, stride: opts.stride, stop_reason })
}

/// simulate_states — the state sequence alone, without frame mapping.
///
/// `stop_set` is a membership mask over active states (may be empty for no
/// stop set).
pub fn simulate_states<R: Rng + ?Sized>(
    model: &MarkovModel, length: usize, start: Option<usize>, stop_set: &[bool], rng: &mut R,
) -> SamplingResult<(Vec<usize>, StopReason)> {
    if length == 0 {
        return Ok((Vec::new(), StopReason::Length));
    }
    let p = model.transition_matrix();
    let rows = p
        .rows()
        .into_iter()
        .enumerate()
        .map(|(row, weights)| {
            WeightedIndex::new(weights.iter()).map_err(|_| SamplingError::InvalidDistribution {
                index: row,
                reason: "transition row cannot be sampled",
            })
        })
        .collect::<SamplingResult<Vec<_>>>()?;

    let first = match start {
        Some(state) => state,
        None => WeightedIndex::new(model.stationary_distribution().iter())
            .map_err(|_| SamplingError::InvalidDistribution {
                index: 0,
                reason: "stationary distribution cannot be sampled",
            })?
            .sample(rng),
    };

    let mut states = Vec::with_capacity(length);
    states.push(first);
    let mut current = first;
    for _ in 1..length {
        current = rows[current].sample(rng);
        states.push(current);
        if stop_set.get(current).copied().unwrap_or(false) {
            return Ok((states, StopReason::StopSet));
        }
    }
    Ok((states, StopReason::Length))
}
