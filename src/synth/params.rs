//! Parameters shared between the control and render contexts
//!
//! Every field is a lock-free atomic. Floats are stored as their bit
//! patterns in `AtomicU64`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lowest frequency the drone will play
pub const MIN_FREQUENCY_HZ: f64 = 20.0;
/// Highest frequency the drone will play
pub const MAX_FREQUENCY_HZ: f64 = 20000.0;

/// Clamp a requested frequency into the playable range
///
/// Returns `None` for NaN so callers can keep their previous value.
pub fn clamp_frequency(frequency_hz: f64) -> Option<f64> {
    if frequency_hz.is_nan() {
        None
    } else {
        Some(frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ))
    }
}

/// Clamp a requested volume into [0, 1]
///
/// Returns `None` for NaN.
pub fn clamp_volume(volume: f64) -> Option<f64> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Drone targets plus the bookkeeping the engine needs from the render side
///
/// Targets are written by the control context and read by the render
/// context. `published_volume` goes the other way: the renderer stores its
/// smoothed volume at the end of each buffer and the teardown check reads it
/// with a relaxed load. That read may lag by up to one buffer. It only feeds
/// a silence threshold on a value that is decaying toward zero, so the lag
/// is accepted.
#[derive(Debug)]
pub struct DroneParams {
    target_frequency: AtomicF64,
    target_volume: AtomicF64,
    published_volume: AtomicF64,
    generation: AtomicU64,
}

impl DroneParams {
    pub fn new(frequency_hz: f64, volume: f64) -> Self {
        Self {
            target_frequency: AtomicF64::new(
                clamp_frequency(frequency_hz).unwrap_or(MIN_FREQUENCY_HZ),
            ),
            target_volume: AtomicF64::new(clamp_volume(volume).unwrap_or(0.0)),
            published_volume: AtomicF64::new(0.0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn target_frequency(&self) -> f64 {
        self.target_frequency.load()
    }

    pub fn target_volume(&self) -> f64 {
        self.target_volume.load()
    }

    /// Store a clamped target frequency; NaN is ignored
    pub fn set_target_frequency(&self, frequency_hz: f64) {
        if let Some(frequency_hz) = clamp_frequency(frequency_hz) {
            self.target_frequency.store(frequency_hz);
        }
    }

    /// Store a clamped target volume; NaN is ignored
    pub fn set_target_volume(&self, volume: f64) {
        if let Some(volume) = clamp_volume(volume) {
            self.target_volume.store(volume);
        }
    }

    /// Most recent smoothed volume published by the renderer
    pub fn published_volume(&self) -> f64 {
        self.published_volume.load()
    }

    pub(crate) fn publish_volume(&self, volume: f64) {
        self.published_volume.store(volume);
    }

    /// Current start generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Begin a new start generation and return it
    ///
    /// The renderer restarts its fade-in when it sees a new generation and
    /// pending teardowns from older generations become no-ops.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Default for DroneParams {
    fn default() -> Self {
        Self::new(crate::pitch::DEFAULT_REFERENCE_A4, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_clamping() {
        let params = DroneParams::default();

        params.set_target_frequency(-10.0);
        assert_eq!(params.target_frequency(), 20.0);

        params.set_target_frequency(50000.0);
        assert_eq!(params.target_frequency(), 20000.0);

        params.set_target_frequency(f64::INFINITY);
        assert_eq!(params.target_frequency(), 20000.0);

        params.set_target_frequency(330.0);
        assert_eq!(params.target_frequency(), 330.0);
    }

    #[test]
    fn test_volume_clamping() {
        let params = DroneParams::default();

        params.set_target_volume(-1.0);
        assert_eq!(params.target_volume(), 0.0);

        params.set_target_volume(2.0);
        assert_eq!(params.target_volume(), 1.0);
    }

    #[test]
    fn test_nan_is_ignored() {
        let params = DroneParams::new(220.0, 0.4);

        params.set_target_frequency(f64::NAN);
        params.set_target_volume(f64::NAN);

        assert_eq!(params.target_frequency(), 220.0);
        assert_eq!(params.target_volume(), 0.4);
    }

    #[test]
    fn test_generation_increments() {
        let params = DroneParams::default();
        assert_eq!(params.generation(), 0);
        assert_eq!(params.next_generation(), 1);
        assert_eq!(params.next_generation(), 2);
        assert_eq!(params.generation(), 2);
    }

    #[test]
    fn test_published_volume() {
        let params = DroneParams::default();
        assert_eq!(params.published_volume(), 0.0);
        params.publish_volume(0.25);
        assert_eq!(params.published_volume(), 0.25);
    }
}
