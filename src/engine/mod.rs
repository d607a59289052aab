//! Audio engine for Tanpura
//!
//! The drone engine, the audio session abstraction it drives, and the
//! hardware and offline session backends.

mod drone;
mod offline;
mod player;
mod recorder;
mod session;

pub use drone::{
    DroneEngine, DroneSettings, Lifecycle, DEFAULT_SILENCE_THRESHOLD, DEFAULT_TEARDOWN_DELAY,
};
pub use offline::OfflineSession;
pub use player::{default_device_name, list_output_devices, CpalSession};
pub use recorder::Recorder;
pub use session::{AudioSession, NodeHandle};
