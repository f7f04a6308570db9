//! Physical time units for trajectory steps and model lag times.
//!
//! - [`TimeUnit`] pairs a magnitude with a [`Unit`] (e.g. `10 ps`).
//! - Parsing accepts `"<number> <unit>"`, a bare number (steps) or a bare
//!   unit (magnitude one). Unit names match on prefix, so `"ns"`,
//!   `"nanosecond"` and `"nanoseconds"` are equivalent.
//!
//! Notes
//! -----
//! - `TimeUnit` is metadata only; no array is rescaled by it. It exists so
//!   timescales and synthetic-trajectory spacings can be reported in
//!   physical units.
use crate::msm::errors::{MsmError, MsmResult};
use std::str::FromStr;

/// Time granularity of one trajectory step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    /// Dimensionless trajectory steps.
    Step,
    Femtosecond,
    Picosecond,
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Step => "step",
            Unit::Femtosecond => "fs",
            Unit::Picosecond => "ps",
            Unit::Nanosecond => "ns",
            Unit::Microsecond => "us",
            Unit::Millisecond => "ms",
            Unit::Second => "s",
        }
    }
}

impl FromStr for Unit {
    type Err = MsmError;

    fn from_str(s: &str) -> MsmResult<Self> {
        let lower = s.trim().to_lowercase();
        let unit = match lower.as_str() {
            "fs" => Unit::Femtosecond,
            "ps" => Unit::Picosecond,
            "ns" => Unit::Nanosecond,
            "us" => Unit::Microsecond,
            "ms" => Unit::Millisecond,
            "s" => Unit::Second,
            other if other.starts_with("step") => Unit::Step,
            other if other.starts_with("femtosecond") => Unit::Femtosecond,
            other if other.starts_with("picosecond") => Unit::Picosecond,
            other if other.starts_with("nanosecond") => Unit::Nanosecond,
            other if other.starts_with("microsecond") => Unit::Microsecond,
            other if other.starts_with("millisecond") => Unit::Millisecond,
            other if other.starts_with("second") => Unit::Second,
            _ => return Err(MsmError::InvalidTimeUnit { input: s.to_string() }),
        };
        Ok(unit)
    }
}

/// A physical duration such as `"10 ps"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnit {
    pub value: f64,
    pub unit: Unit,
}

impl TimeUnit {
    pub fn new(value: f64, unit: Unit) -> MsmResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(MsmError::InvalidTimeUnit { input: format!("{value} {}", unit.symbol()) });
        }
        Ok(TimeUnit { value, unit })
    }

    /// This duration multiplied by `factor` (e.g. a lag time in steps).
    pub fn scaled(&self, factor: f64) -> TimeUnit {
        TimeUnit { value: self.value * factor, unit: self.unit }
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        TimeUnit { value: 1.0, unit: Unit::Step }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}

impl FromStr for TimeUnit {
    type Err = MsmError;

    fn from_str(s: &str) -> MsmResult<Self> {
        let invalid = || MsmError::InvalidTimeUnit { input: s.to_string() };
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => match single.parse::<f64>() {
                Ok(value) => TimeUnit::new(value, Unit::Step).map_err(|_| invalid()),
                Err(_) => Ok(TimeUnit { value: 1.0, unit: single.parse()? }),
            },
            [value, unit] => {
                let value: f64 = value.parse().map_err(|_| invalid())?;
                TimeUnit::new(value, unit.parse()?).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}
