//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::DroneSettings;
use crate::pitch::{self, PitchSpec};

/// Main configuration for Tanpura
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TanpuraConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Drone tone settings
    #[serde(default)]
    pub drone: DroneConfig,
}

impl TanpuraConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }
        if self.audio.channels == 0 || self.audio.channels > 8 {
            bail!("Channels must be between 1 and 8");
        }

        // Validate drone settings
        let drone = &self.drone;
        if !(400.0..=480.0).contains(&drone.reference_a4) {
            bail!("Reference A4 must be between 400 and 480 Hz");
        }
        if PitchSpec::parse(&drone.note).is_none() {
            bail!("Unknown note '{}'", drone.note);
        }
        if !(0.0..=1.0).contains(&drone.volume) {
            bail!("Drone volume must be between 0.0 and 1.0");
        }
        if !(drone.smoothing_factor > 0.0 && drone.smoothing_factor < 1.0) {
            bail!("Smoothing factor must be strictly between 0 and 1");
        }
        if drone.teardown_delay_ms > 10_000 {
            bail!("Teardown delay must be at most 10000 ms");
        }
        if !(drone.silence_threshold > 0.0 && drone.silence_threshold < 0.1) {
            bail!("Silence threshold must be between 0 and 0.1");
        }

        Ok(())
    }

    /// Engine settings derived from the drone section
    pub fn drone_settings(&self) -> DroneSettings {
        DroneSettings {
            smoothing_factor: self.drone.smoothing_factor,
            teardown_delay: Duration::from_millis(self.drone.teardown_delay_ms),
            silence_threshold: self.drone.silence_threshold,
        }
    }

    /// Frequency of the configured note against the configured reference
    pub fn drone_frequency(&self) -> f64 {
        pitch::frequency_for_note(&self.drone.note, self.drone.reference_a4)
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for offline rendering (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in frames for offline rendering (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Channel count for offline rendering (default: 1)
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            channels: default_channels(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }
fn default_channels() -> usize { 1 }

/// Drone settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneConfig {
    /// Frequency of A4 in Hz (default: 440)
    #[serde(default = "default_reference_a4")]
    pub reference_a4: f64,

    /// Note to play (default: A3)
    #[serde(default = "default_note")]
    pub note: String,

    /// Volume 0.0-1.0 (default: 0.5)
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Per-frame smoothing factor (default: 0.002)
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,

    /// Delay before releasing audio after stop, in ms (default: 300)
    #[serde(default = "default_teardown_delay_ms")]
    pub teardown_delay_ms: u64,

    /// Volume treated as silence by the teardown check (default: 0.0001)
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f64,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            reference_a4: default_reference_a4(),
            note: default_note(),
            volume: default_volume(),
            smoothing_factor: default_smoothing_factor(),
            teardown_delay_ms: default_teardown_delay_ms(),
            silence_threshold: default_silence_threshold(),
        }
    }
}

fn default_reference_a4() -> f64 { pitch::DEFAULT_REFERENCE_A4 }
fn default_note() -> String { "A3".to_string() }
fn default_volume() -> f64 { 0.5 }
fn default_smoothing_factor() -> f64 { crate::synth::DEFAULT_SMOOTHING_FACTOR }
fn default_teardown_delay_ms() -> u64 { 300 }
fn default_silence_threshold() -> f64 { crate::engine::DEFAULT_SILENCE_THRESHOLD }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_config() {
        let yaml = "sample_rate: 48000";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 512); // default
        assert_eq!(config.channels, 1);
    }

    #[test]
    fn test_drone_config() {
        let yaml = r#"
reference_a4: 432
note: "D3"
volume: 0.3
"#;
        let config: DroneConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.reference_a4, 432.0);
        assert_eq!(config.note, "D3");
        assert_eq!(config.volume, 0.3);
        assert_eq!(config.smoothing_factor, 0.002);
        assert_eq!(config.teardown_delay_ms, 300);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TanpuraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.drone_frequency(), 220.0);
    }

    #[test]
    fn test_drone_settings() {
        let mut config = TanpuraConfig::default();
        config.drone.teardown_delay_ms = 120;
        config.drone.smoothing_factor = 0.01;

        let settings = config.drone_settings();
        assert_eq!(settings.teardown_delay, Duration::from_millis(120));
        assert_eq!(settings.smoothing_factor, 0.01);
        assert_eq!(settings.silence_threshold, 1e-4);
    }

    #[test]
    fn test_invalid_smoothing_factor() {
        let mut config = TanpuraConfig::default();
        config.drone.smoothing_factor = 0.0;
        assert!(config.validate().is_err());

        config.drone.smoothing_factor = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_reference() {
        let mut config = TanpuraConfig::default();
        config.drone.reference_a4 = 880.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_note() {
        let mut config = TanpuraConfig::default();
        config.drone.note = "Q2".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_audio() {
        let mut config = TanpuraConfig::default();
        config.audio.sample_rate = 4000;
        assert!(config.validate().is_err());

        let mut config = TanpuraConfig::default();
        config.drone.volume = 1.5;
        assert!(config.validate().is_err());
    }
}
