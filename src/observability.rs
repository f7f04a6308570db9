//! Terminal logging for verbose simulation and ensemble runs.
//!
//! Compiled only with the `obs_slog` feature. Callers build a logger when
//! their options request verbose output; without the feature every logging
//! site compiles away.
use slog::{Drain, Logger, o};
use std::sync::Mutex;

/// Compact stderr logger tagged with the crate name.
pub fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    Logger::root(Mutex::new(drain).fuse(), o!("crate" => "markov_stats"))
}
