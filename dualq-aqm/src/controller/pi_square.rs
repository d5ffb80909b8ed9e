use std::time::Duration;

use super::{clamp_probability, ControlInput, ProbabilityController};
use crate::config::PiSquareConfig;

/// The PI Square controller.
///
/// Every update samples the Classic queuing delay and integrates
///
/// ```text
/// p += alpha_u * (q_delay - target) + beta_u * (q_delay - q_delay_old)
/// ```
///
/// where `alpha_u = alpha * elapsed` and `beta_u = beta * elapsed`. Scaling the gains by the
/// actual elapsed time (rather than the nominal `t_update`) keeps the loop correct when the host
/// runs an update late.
#[derive(Debug, Clone)]
pub struct PiSquare {
    config: PiSquareConfig,
    /// The base probability.
    probability: f64,
    /// Delay sampled at the latest update.
    q_delay: Duration,
    /// Delay sampled at the update before that.
    q_delay_old: Duration,
}

impl PiSquare {
    pub fn new(config: PiSquareConfig) -> Self {
        Self { config, probability: 0.0, q_delay: Duration::ZERO, q_delay_old: Duration::ZERO }
    }

    /// The delay sampled at the latest update.
    #[inline]
    pub fn q_delay(&self) -> Duration {
        self.q_delay
    }

    /// The delay sampled at the update before the latest one.
    #[inline]
    pub fn q_delay_old(&self) -> Duration {
        self.q_delay_old
    }
}

impl ProbabilityController for PiSquare {
    fn update_interval(&self) -> Option<Duration> {
        Some(self.config.t_update)
    }

    fn update(&mut self, input: ControlInput) -> f64 {
        let elapsed = input.elapsed.as_secs_f64();
        let alpha_u = self.config.alpha * elapsed;
        let beta_u = self.config.beta * elapsed;

        let q_delay = input.classic_delay.as_secs_f64();
        let target = self.config.target.as_secs_f64();
        let q_delay_old = self.q_delay.as_secs_f64();

        let delta = alpha_u * (q_delay - target) + beta_u * (q_delay - q_delay_old);
        self.probability = clamp_probability(self.probability + delta);

        self.q_delay_old = self.q_delay;
        self.q_delay = input.classic_delay;

        tracing::trace!(
            q_delay_ms = q_delay * 1e3,
            delta,
            probability = self.probability,
            "pi square update"
        );

        self.probability
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn reset(&mut self) {
        self.probability = 0.0;
        self.q_delay = Duration::ZERO;
        self.q_delay_old = Duration::ZERO;
    }
}
