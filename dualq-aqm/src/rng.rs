use rand::{Rng, RngCore};

/// A source of uniform random values in `[0, 1)` used for the per-packet decisions.
///
/// Every [`RngCore`] is a uniform source, so any `rand` generator can be injected. Tests can
/// implement this trait directly to script exact decision sequences.
pub trait UniformSource {
    /// Returns the next value, uniformly distributed in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

// Blanket implementation of `UniformSource` for any `rand` generator.
impl<R: RngCore> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
