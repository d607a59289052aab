//! One-pole parameter smoothing
//!
//! Moves a value a fixed fraction of the remaining distance toward its
//! target on every frame, so a step in the target becomes an exponential
//! glide instead of a click.

/// Default per-frame convergence factor
///
/// A full-scale step decays below 1% in roughly 2300 frames (about 50 ms
/// at 44.1 kHz).
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.002;

/// Exponential smoother for a single parameter
#[derive(Debug, Clone, Copy)]
pub struct ParameterSmoother {
    current: f64,
    factor: f64,
}

impl ParameterSmoother {
    /// Create a smoother starting at `initial`
    ///
    /// `factor` is clamped into (0, 1]; a value of 1 disables smoothing.
    pub fn new(initial: f64, factor: f64) -> Self {
        Self {
            current: initial,
            factor: factor.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    /// Advance one frame toward `target` and return the new value
    #[inline]
    pub fn step(&mut self, target: f64) -> f64 {
        self.current += (target - self.current) * self.factor;
        self.current
    }

    /// Jump straight to `value`
    pub fn snap(&mut self, value: f64) {
        self.current = value;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

}
