//! Base probability controllers.
//!
//! A controller turns the observed Classic queuing delay into the single base probability
//! from which the coupling policy derives the Classic and L4S probabilities. Two controllers
//! are provided:
//!
//! - [`PiSquare`]: a discretized PI loop run every `t_update`.
//! - [`CurvyRed`]: a curve over the smoothed Classic delay, evaluated on every enqueue.

use std::{fmt::Debug, time::Duration};

use crate::config::ControllerConfig;

mod curvy_red;
pub use curvy_red::CurvyRed;

mod pi_square;
pub use pi_square::PiSquare;

/// The measurements a controller update works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInput {
    /// Current time.
    pub now: Duration,
    /// Time since the previous update. Zero on the first update.
    pub elapsed: Duration,
    /// How long the Classic head packet has been queued. Zero when the Classic sub-queue is
    /// empty.
    pub classic_delay: Duration,
}

/// Computes the base drop/mark probability.
pub trait ProbabilityController: Debug + Send {
    /// The interval between periodic updates. `None` means the controller is re-evaluated on
    /// every enqueue instead.
    fn update_interval(&self) -> Option<Duration>;

    /// Recomputes the base probability from `input` and returns it. The result is always
    /// within `[0, 1]`.
    fn update(&mut self, input: ControlInput) -> f64;

    /// The most recently computed base probability.
    fn base_probability(&self) -> f64;

    /// Clears all internal state.
    fn reset(&mut self);
}

/// Builds the controller described by `config`.
pub(crate) fn from_config(config: &ControllerConfig) -> Box<dyn ProbabilityController> {
    match *config {
        ControllerConfig::PiSquare(pi) => Box::new(PiSquare::new(pi)),
        ControllerConfig::CurvyRed(red) => Box::new(CurvyRed::new(red)),
    }
}

/// Clamps `p` to `[0, 1]`. NaN maps to 0 in release builds.
#[inline]
pub(crate) fn clamp_probability(p: f64) -> f64 {
    debug_assert!(p.is_finite(), "probability is not finite: {p}");
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}
