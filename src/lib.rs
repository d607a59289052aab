//! Tanpura - pitch-tunable drone reference tone
//!
//! A sustained tone whose pitch and volume glide without clicks, plus
//! note-name to frequency conversion for tuning practice.

pub mod config;
pub mod engine;
pub mod error;
pub mod pitch;
pub mod synth;

pub use config::TanpuraConfig;
pub use engine::{AudioSession, DroneEngine, DroneSettings, Lifecycle};
pub use error::AudioError;
pub use pitch::{
    frequency_for_note, frequency_for_note_default, resolve_note, rounded_frequency_for_note,
};
