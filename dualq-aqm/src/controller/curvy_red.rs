use std::time::Duration;

use super::{clamp_probability, ControlInput, ProbabilityController};
use crate::config::CurvyRedConfig;

/// The Curvy RED controller.
///
/// Keeps an EWMA of the Classic queuing delay and maps it onto the curve
/// `p = x^(2 * curviness)`, with `x` the smoothed delay relative to the scaling reference,
/// capped at 1. This is the probability that the maximum of `2 * curviness` uniform draws falls
/// below `x`, so a single draw against `p` reproduces the "max of several randoms" test.
///
/// There is no timer: the curve is re-evaluated whenever the scheduler asks for it.
#[derive(Debug, Clone)]
pub struct CurvyRed {
    config: CurvyRedConfig,
    /// Smoothed Classic delay, in seconds.
    avg_delay: f64,
    /// The base probability.
    probability: f64,
}

impl CurvyRed {
    pub fn new(config: CurvyRedConfig) -> Self {
        Self { config, avg_delay: 0.0, probability: 0.0 }
    }

    /// The smoothed Classic queuing delay.
    pub fn avg_delay(&self) -> Duration {
        Duration::from_secs_f64(self.avg_delay)
    }

    /// Evaluates the curve at the smoothed delay `avg`, in seconds.
    fn curve(&self, avg: f64) -> f64 {
        let x = (avg / self.config.classic_scaling.as_secs_f64()).clamp(0.0, 1.0);
        let exponent = i32::try_from(self.config.curviness.saturating_mul(2)).unwrap_or(i32::MAX);
        x.powi(exponent)
    }
}

impl ProbabilityController for CurvyRed {
    fn update_interval(&self) -> Option<Duration> {
        None
    }

    fn update(&mut self, input: ControlInput) -> f64 {
        let sample = input.classic_delay.as_secs_f64();
        let weight = 1.0 / f64::from(1u32 << self.config.ewma_shift);

        self.avg_delay += (sample - self.avg_delay) * weight;
        self.probability = clamp_probability(self.curve(self.avg_delay));

        tracing::trace!(
            sample_ms = sample * 1e3,
            avg_ms = self.avg_delay * 1e3,
            probability = self.probability,
            "curvy red update"
        );

        self.probability
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn reset(&mut self) {
        self.avg_delay = 0.0;
        self.probability = 0.0;
    }
}
