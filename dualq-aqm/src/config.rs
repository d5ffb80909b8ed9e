use std::time::Duration;

use thiserror::Error;

use crate::queue::QueueMode;

/// Standard Ethernet MTU in bytes.
pub const MTU_ETHERNET: u32 = 1_500;

/// Invalid parameter combinations, detected when the queue is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("queue limit must be non-zero")]
    ZeroQueueLimit,
    #[error("L4S threshold {threshold} exceeds the queue limit {limit}")]
    L4sThresholdAboveLimit { threshold: u32, limit: u32 },
    #[error("controller update interval must be non-zero")]
    ZeroUpdateInterval,
    #[error("invalid controller gain {name} = {value}")]
    InvalidGain { name: &'static str, value: f64 },
    #[error("coupling factor must be finite and positive, got {0}")]
    InvalidCouplingFactor(f64),
    #[error("curviness must be at least 1")]
    ZeroCurviness,
    #[error("classic scaling reference must be non-zero")]
    ZeroClassicScaling,
    #[error("EWMA shift {0} is out of range (0..=31)")]
    InvalidEwmaShift(u32),
}

/// Parameters of the PI Square controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiSquareConfig {
    /// Target queuing delay for Classic traffic.
    pub target: Duration,
    /// Nominal interval between probability updates.
    pub t_update: Duration,
    /// Integral gain, in Hz. Scaled by the actual update interval.
    pub alpha: f64,
    /// Proportional gain, in Hz. Scaled by the actual update interval.
    pub beta: f64,
}

impl Default for PiSquareConfig {
    fn default() -> Self {
        Self {
            target: Duration::from_millis(15),
            t_update: Duration::from_millis(16),
            alpha: 10.0,
            beta: 100.0,
        }
    }
}

/// Parameters of the Curvy RED controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvyRedConfig {
    /// Curve exponent. The base probability is `x^(2 * curviness)` where `x` is the smoothed
    /// Classic delay relative to `classic_scaling`.
    pub curviness: u32,
    /// Smoothed Classic delay at which the curve saturates.
    pub classic_scaling: Duration,
    /// EWMA weight of each new delay sample, as a power of two: `2^-ewma_shift`.
    pub ewma_shift: u32,
}

impl Default for CurvyRedConfig {
    fn default() -> Self {
        Self {
            curviness: 1,
            // 2^15 us
            classic_scaling: Duration::from_micros(1 << 15),
            ewma_shift: 5,
        }
    }
}

/// Which controller computes the base probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerConfig {
    /// Periodic PI feedback loop on the Classic queuing delay.
    PiSquare(PiSquareConfig),
    /// Curve over the smoothed Classic queuing delay, evaluated on every enqueue.
    CurvyRed(CurvyRedConfig),
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::PiSquare(PiSquareConfig::default())
    }
}

/// Configuration of a [`DualQueue`](crate::DualQueue).
#[derive(Debug, Clone, PartialEq)]
pub struct DualQConfig {
    /// Unit of `queue_limit` and `l4s_threshold`.
    pub mode: QueueMode,
    /// Combined capacity of both sub-queues before packets are force-dropped.
    pub queue_limit: u32,
    /// L4S sub-queue occupancy above which L4S packets lose their protection from the Classic
    /// congestion signal. `None` disables overload protection.
    pub l4s_threshold: Option<u32>,
    /// Coupling factor `k` between the base probability and the L4S marking probability.
    pub coupling_factor: f64,
    /// L4S head sojourn time above which L4S packets are marked regardless of the coupled
    /// probability.
    pub l4s_mark_threshold: Duration,
    /// The L4S step mark only applies while the L4S sub-queue holds more than this many bytes.
    pub l4s_min_mark_bytes: u32,
    /// The probability controller.
    pub controller: ControllerConfig,
    /// Seed of the default random source.
    pub seed: u64,
}

impl Default for DualQConfig {
    fn default() -> Self {
        Self {
            mode: QueueMode::Packets,
            queue_limit: 100,
            l4s_threshold: None,
            coupling_factor: 2.0,
            l4s_mark_threshold: Duration::from_millis(1),
            l4s_min_mark_bytes: 2 * MTU_ETHERNET,
            controller: ControllerConfig::default(),
            seed: 1,
        }
    }
}

impl DualQConfig {
    /// Sets the unit of limits and thresholds.
    pub fn with_mode(mut self, mode: QueueMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the combined queue limit.
    pub fn with_queue_limit(mut self, queue_limit: u32) -> Self {
        self.queue_limit = queue_limit;
        self
    }

    /// Enables L4S overload protection at the given L4S occupancy.
    pub fn with_l4s_threshold(mut self, l4s_threshold: u32) -> Self {
        self.l4s_threshold = Some(l4s_threshold);
        self
    }

    /// Sets the coupling factor `k`.
    pub fn with_coupling_factor(mut self, coupling_factor: f64) -> Self {
        self.coupling_factor = coupling_factor;
        self
    }

    /// Sets the L4S step marking sojourn threshold.
    pub fn with_l4s_mark_threshold(mut self, l4s_mark_threshold: Duration) -> Self {
        self.l4s_mark_threshold = l4s_mark_threshold;
        self
    }

    /// Sets the minimum L4S backlog, in bytes, for step marking.
    pub fn with_l4s_min_mark_bytes(mut self, l4s_min_mark_bytes: u32) -> Self {
        self.l4s_min_mark_bytes = l4s_min_mark_bytes;
        self
    }

    /// Uses the PI Square controller with the given parameters.
    pub fn with_pi_square(mut self, pi: PiSquareConfig) -> Self {
        self.controller = ControllerConfig::PiSquare(pi);
        self
    }

    /// Uses the Curvy RED controller with the given parameters.
    pub fn with_curvy_red(mut self, red: CurvyRedConfig) -> Self {
        self.controller = ControllerConfig::CurvyRed(red);
        self
    }

    /// Sets the seed of the default random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the configuration for invalid parameter combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_limit == 0 {
            return Err(ConfigError::ZeroQueueLimit);
        }

        if let Some(threshold) = self.l4s_threshold {
            if threshold > self.queue_limit {
                return Err(ConfigError::L4sThresholdAboveLimit {
                    threshold,
                    limit: self.queue_limit,
                });
            }
        }

        if !self.coupling_factor.is_finite() || self.coupling_factor <= 0.0 {
            return Err(ConfigError::InvalidCouplingFactor(self.coupling_factor));
        }

        match self.controller {
            ControllerConfig::PiSquare(pi) => {
                if pi.t_update.is_zero() {
                    return Err(ConfigError::ZeroUpdateInterval);
                }

                for (name, value) in [("alpha", pi.alpha), ("beta", pi.beta)] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ConfigError::InvalidGain { name, value });
                    }
                }
            }
            ControllerConfig::CurvyRed(red) => {
                if red.curviness == 0 {
                    return Err(ConfigError::ZeroCurviness);
                }

                if red.classic_scaling.is_zero() {
                    return Err(ConfigError::ZeroClassicScaling);
                }

                if red.ewma_shift > 31 {
                    return Err(ConfigError::InvalidEwmaShift(red.ewma_shift));
                }
            }
        }

        Ok(())
    }
}
