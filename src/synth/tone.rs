//! Phase-accumulator tone generator
//!
//! Fundamental plus a quiet second harmonic for a warmer sound than a bare
//! sine.

use std::f64::consts::TAU;

/// Share of the output given to the fundamental
pub const FUNDAMENTAL_GAIN: f64 = 0.9;
/// Share of the output given to the second harmonic
pub const HARMONIC_GAIN: f64 = 0.1;

const NYQUIST_MARGIN: f64 = 0.499;

/// Oscillator driven by externally smoothed frequency and volume
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    phase: f64,
    sample_rate: f64,
}

impl ToneSynthesizer {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Phase in radians, always within [0, 2π)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Highest frequency `next_sample` keeps the phase in range for
    ///
    /// Just under Nyquist, so the per-frame increment stays below π.
    pub fn max_frequency(&self) -> f64 {
        self.sample_rate * NYQUIST_MARGIN
    }

    /// Advance one frame and return the sample
    ///
    /// `frequency_hz` must not exceed [`max_frequency`](Self::max_frequency);
    /// a single subtraction then keeps the phase in [0, 2π).
    #[inline]
    pub fn next_sample(&mut self, frequency_hz: f64, volume: f64) -> f64 {
        self.phase += TAU * frequency_hz / self.sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        self.phase.sin() * volume * FUNDAMENTAL_GAIN
            + (2.0 * self.phase).sin() * volume * HARMONIC_GAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_at_zero_volume() {
        let mut tone = ToneSynthesizer::new(44100.0);
        for _ in 0..1000 {
            assert_eq!(tone.next_sample(440.0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_phase_stays_in_range() {
        for &freq in &[20.0, 261.63, 440.0, 5000.0, 20000.0] {
            let mut tone = ToneSynthesizer::new(44100.0);
            for _ in 0..200_000 {
                tone.next_sample(freq, 1.0);
                let phase = tone.phase();
                assert!((0.0..TAU).contains(&phase), "phase {} out of range at {} Hz", phase, freq);
            }
        }
    }

    #[test]
    fn test_output_bounded_by_volume() {
        let mut tone = ToneSynthesizer::new(48000.0);
        for _ in 0..48000 {
            let sample = tone.next_sample(330.0, 0.5);
            assert!(sample.abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_quarter_cycle_sample() {
        // 1 Hz at 4 Hz sample rate: first frame lands on π/2
        let mut tone = ToneSynthesizer::new(4.0);
        let sample = tone.next_sample(1.0, 1.0);
        let expected = FUNDAMENTAL_GAIN * 1.0 + HARMONIC_GAIN * std::f64::consts::PI.sin();
        assert!((sample - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_frequency_below_nyquist() {
        let tone = ToneSynthesizer::new(8000.0);
        assert!(tone.max_frequency() < 4000.0);
        assert!(tone.max_frequency() > 3990.0);
    }
}
