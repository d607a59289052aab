//! Render-context state for the drone
//!
//! `DroneRenderer` owns everything the real-time path mutates: the smoothed
//! frequency and volume and the oscillator phase. The only thing it shares
//! with the control side is an `Arc<DroneParams>`.

use std::sync::Arc;

use super::{DroneParams, ParameterSmoother, RenderUnit, ToneSynthesizer};

/// The drone voice as seen by the audio callback
pub struct DroneRenderer {
    params: Arc<DroneParams>,
    frequency: ParameterSmoother,
    volume: ParameterSmoother,
    tone: ToneSynthesizer,
    seen_generation: u64,
    target_frequency: f64,
    target_volume: f64,
}

impl DroneRenderer {
    /// Create a renderer that starts silent at the current target pitch
    pub fn new(params: Arc<DroneParams>, sample_rate: f64, smoothing_factor: f64) -> Self {
        let target_frequency = params.target_frequency();
        let target_volume = params.target_volume();
        let seen_generation = params.generation();

        Self {
            frequency: ParameterSmoother::new(target_frequency, smoothing_factor),
            volume: ParameterSmoother::new(0.0, smoothing_factor),
            tone: ToneSynthesizer::new(sample_rate),
            seen_generation,
            target_frequency,
            target_volume,
            params,
        }
    }

    pub fn current_frequency(&self) -> f64 {
        self.frequency.current()
    }

    pub fn current_volume(&self) -> f64 {
        self.volume.current()
    }

    pub fn phase(&self) -> f64 {
        self.tone.phase()
    }

    /// Advance one frame and return the sample at full precision
    ///
    /// Targets above the sample rate's Nyquist limit play at the limit.
    #[inline]
    pub fn next_frame(&mut self) -> f64 {
        let frequency = self.frequency.step(self.target_frequency);
        let volume = self.volume.step(self.target_volume);
        self.tone.next_sample(frequency.min(self.tone.max_frequency()), volume)
    }
}

impl RenderUnit for DroneRenderer {
    fn begin_buffer(&mut self) {
        let generation = self.params.generation();
        self.target_frequency = self.params.target_frequency();
        self.target_volume = self.params.target_volume();

        // A new start: hold the requested pitch and fade in from silence
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.frequency.snap(self.target_frequency);
            self.volume.snap(0.0);
        }
    }

    fn next_sample(&mut self) -> f32 {
        self.next_frame() as f32
    }

    fn end_buffer(&mut self) {
        self.params.publish_volume(self.volume.current());
    }
}
