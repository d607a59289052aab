//! Synthesis for the drone tone
//!
//! Contains the parameter smoother, the oscillator, the shared parameter
//! block and the render-context voice that ties them together.

mod params;
mod renderer;
mod smoother;
mod tone;
mod voice;

pub use params::{clamp_frequency, clamp_volume, DroneParams, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
pub use renderer::DroneRenderer;
pub use smoother::{ParameterSmoother, DEFAULT_SMOOTHING_FACTOR};
pub use tone::{ToneSynthesizer, FUNDAMENTAL_GAIN, HARMONIC_GAIN};
pub use voice::RenderUnit;
