//! Model options — lag time, connectivity mode and trajectory time step.
//!
//! Purpose
//! -------
//! Collect the configuration that describes *how* an estimated model relates
//! to its input trajectories, so a [`ConnectivityModel`](crate::msm::ConnectivityModel)
//! can report lag-scaled time units and connectivity metadata without ad-hoc
//! arguments.
//!
//! Key behaviors
//! -------------
//! - [`Connectivity`] names the rule the estimator used to choose the active
//!   set and parses case-insensitively from `"largest"`, `"all"` or `"none"`.
//! - [`ModelOptions::new`] validates the lag (`>= 1`) and parses the
//!   trajectory time step.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lag >= 1` for every constructed [`ModelOptions`].
//! - Connectivity is metadata; the active set itself is supplied by the
//!   estimator and validated separately.
use crate::msm::{
    errors::{MsmError, MsmResult},
    units::TimeUnit,
};
use std::str::FromStr;

/// Rule used to restrict the full state space to the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Active set is the largest strongly connected set.
    #[default]
    Largest,
    /// Every connected set is kept; the model may be block-diagonal.
    All,
    /// No restriction; every visited state is active.
    None,
}

impl Connectivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Largest => "largest",
            Connectivity::All => "all",
            Connectivity::None => "none",
        }
    }
}

impl FromStr for Connectivity {
    type Err = MsmError;

    /// Parse a connectivity mode (case-insensitive).
    ///
    /// Accepts `"largest"`, `"all"` and `"none"`; anything else returns
    /// `MsmError::InvalidConnectivity`.
    fn from_str(s: &str) -> MsmResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "largest" => Ok(Connectivity::Largest),
            "all" => Ok(Connectivity::All),
            "none" => Ok(Connectivity::None),
            _ => Err(MsmError::InvalidConnectivity { input: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ModelOptions — estimation metadata carried by a connectivity model.
///
/// Fields
/// ------
/// - `lag`: `usize`
///   Lag time in trajectory steps at which the transition matrix was
///   estimated.
/// - `connectivity`: [`Connectivity`]
///   Rule used to select the active set.
/// - `dt_traj`: [`TimeUnit`]
///   Physical time of one trajectory step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub lag: usize,
    pub connectivity: Connectivity,
    pub dt_traj: TimeUnit,
}

impl ModelOptions {
    /// Build validated options.
    ///
    /// Errors
    /// ------
    /// - `MsmError::InvalidLag` if `lag == 0`.
    /// - `MsmError::InvalidTimeUnit` if `dt_traj` cannot be parsed.
    pub fn new(lag: usize, connectivity: Connectivity, dt_traj: &str) -> MsmResult<Self> {
        if lag == 0 {
            return Err(MsmError::InvalidLag { lag });
        }
        Ok(ModelOptions { lag, connectivity, dt_traj: dt_traj.parse()? })
    }

    /// Physical time of one model step, `dt_traj · lag`.
    pub fn dt_model(&self) -> TimeUnit {
        self.dt_traj.scaled(self.lag as f64)
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions { lag: 1, connectivity: Connectivity::Largest, dt_traj: TimeUnit::default() }
    }
}
