//! Errors raised by audio session backends

use thiserror::Error;

/// Failures from the audio hardware layer
///
/// None of these reach callers of the drone control surface: the engine
/// logs them and carries on silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// The audio session could not be activated
    #[error("failed to activate audio session: {0}")]
    SessionActivation(String),

    /// The output stream could not be built or started
    #[error("failed to start audio engine: {0}")]
    EngineStart(String),

    /// No output device matched the request
    #[error("no output device available")]
    NoOutputDevice,

    /// The device uses a sample format we do not render
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// A render unit could not be attached to the graph
    #[error("failed to attach render unit: {0}")]
    Attach(String),

    /// The backend thread is gone
    #[error("audio session closed")]
    SessionClosed,
}
