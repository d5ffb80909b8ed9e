/// The per-class probabilities derived from one base probability.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Probabilities {
    /// The controller output.
    pub base: f64,
    /// Drop (or mark, for ECN-capable packets) probability of Classic traffic.
    pub classic: f64,
    /// Mark probability of L4S traffic.
    pub l4s: f64,
}

/// Couples the L4S marking probability to the Classic one.
///
/// Classic traffic sees the base probability as is. L4S traffic sees
/// `min(1, k * sqrt(base))`: a scalable sender's rate goes as `1/p` where a Classic sender's
/// goes as `1/sqrt(p)`, so the square root keeps both at the same rate for the same congestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingPolicy {
    k: f64,
}

impl CouplingPolicy {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    /// The coupling factor.
    #[inline]
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Derives the Classic and L4S probabilities from `base`.
    pub fn couple(&self, base: f64) -> Probabilities {
        debug_assert!((0.0..=1.0).contains(&base), "base probability out of range: {base}");

        let l4s = (self.k * base.sqrt()).min(1.0);
        Probabilities { base, classic: base, l4s }
    }
}
