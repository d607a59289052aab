//! Drone engine: control surface and lifecycle
//!
//! Control calls only write targets into the shared [`DroneParams`]; the
//! attached [`DroneRenderer`] does all per-frame work. `stop` fades out and
//! schedules a delayed teardown that releases the audio node once the tone
//! is silent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{AudioSession, NodeHandle};
use crate::pitch::DEFAULT_REFERENCE_A4;
use crate::synth::{DroneParams, DroneRenderer, DEFAULT_SMOOTHING_FACTOR};

/// Grace period between `stop` and the teardown check
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_millis(300);
/// Volume at or below which the drone counts as silent
pub const DEFAULT_SILENCE_THRESHOLD: f64 = 1e-4;

/// Engine tuning fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneSettings {
    /// Per-frame convergence factor for frequency and volume, in (0, 1)
    pub smoothing_factor: f64,
    /// Delay between `stop` and the teardown check
    pub teardown_delay: Duration,
    /// Published volume must be at or below this for teardown to proceed
    pub silence_threshold: f64,
}

impl Default for DroneSettings {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            teardown_delay: DEFAULT_TEARDOWN_DELAY,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
        }
    }
}

/// Where the engine is in its start/stop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No node attached, nothing playing
    Idle,
    /// Node attached and the tone is (or is fading) in
    Active,
    /// Fading out; a teardown check is scheduled
    TeardownPending,
}

struct Control<S: AudioSession> {
    session: S,
    node: Option<NodeHandle>,
    lifecycle: Lifecycle,
}

impl<S: AudioSession> Control<S> {
    fn teardown(&mut self) {
        self.session.pause();
        if let Some(node) = self.node.take() {
            if !self.session.detach(node) {
                debug!("Render node {} was already detached", node.id());
            }
        }
        self.lifecycle = Lifecycle::Idle;
    }
}

struct Shared<S: AudioSession> {
    control: Mutex<Control<S>>,
    params: Arc<DroneParams>,
    settings: DroneSettings,
}

impl<S: AudioSession> Shared<S> {
    fn lock_control(&self) -> MutexGuard<'_, Control<S>> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn teardown_check(&self, generation: u64) {
        let mut control = self.lock_control();

        if self.params.generation() != generation {
            debug!("Skipping stale teardown from generation {}", generation);
            return;
        }
        if control.lifecycle != Lifecycle::TeardownPending {
            return;
        }

        // Relaxed read of a value the render thread keeps decaying
        let volume = self.params.published_volume();
        if volume > self.settings.silence_threshold {
            // No reschedule: the node stays attached until the next stop()
            debug!("Drone still audible at teardown ({:.6}), leaving node attached", volume);
            return;
        }

        control.teardown();
        info!("Drone torn down");
    }
}

impl<S: AudioSession> Drop for Shared<S> {
    fn drop(&mut self) {
        let control = self.control.get_mut().unwrap_or_else(PoisonError::into_inner);
        if control.node.is_some() {
            control.teardown();
        }
    }
}

/// A single sustained reference tone
///
/// Every control method returns immediately and never fails: hardware
/// problems are logged and leave the drone silent.
pub struct DroneEngine<S: AudioSession> {
    shared: Arc<Shared<S>>,
}

impl<S: AudioSession> DroneEngine<S> {
    /// Create an idle engine that will play through `session`
    pub fn new(session: S, settings: DroneSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    session,
                    node: None,
                    lifecycle: Lifecycle::Idle,
                }),
                params: Arc::new(DroneParams::new(DEFAULT_REFERENCE_A4, 0.0)),
                settings,
            }),
        }
    }

    /// Start (or restart) the drone at `frequency_hz`, fading in to `volume`
    pub fn start(&self, frequency_hz: f64, volume: f64) {
        let params = &self.shared.params;
        params.set_target_frequency(frequency_hz);
        params.set_target_volume(volume);
        // Publish the targets before the generation the renderer keys its reset on
        let generation = params.next_generation();

        let mut control = self.shared.lock_control();

        if let Err(e) = control.session.activate() {
            warn!("Audio session activation failed: {}", e);
        }

        if control.node.is_none() {
            let renderer = DroneRenderer::new(
                params.clone(),
                control.session.sample_rate(),
                self.shared.settings.smoothing_factor,
            );
            match control.session.attach(Box::new(renderer)) {
                Ok(node) => control.node = Some(node),
                Err(e) => warn!("Failed to attach drone: {}", e),
            }
        }

        if !control.session.is_running() {
            if let Err(e) = control.session.start() {
                warn!("Audio engine start failed: {}", e);
            }
        }

        control.lifecycle = Lifecycle::Active;
        info!(
            "Drone started at {:.2} Hz, volume {:.2} (generation {})",
            params.target_frequency(),
            params.target_volume(),
            generation
        );
    }

    /// Fade out and schedule teardown
    pub fn stop(&self) {
        self.shared.params.set_target_volume(0.0);
        let generation = self.shared.params.generation();

        {
            let mut control = self.shared.lock_control();
            if control.lifecycle == Lifecycle::Idle {
                debug!("stop() while idle");
                return;
            }
            control.lifecycle = Lifecycle::TeardownPending;
        }

        self.schedule_teardown(generation);
        debug!("Drone fading out");
    }

    /// Glide to a new frequency, clamped to the audible range
    pub fn update(&self, frequency_hz: f64) {
        self.shared.params.set_target_frequency(frequency_hz);
    }

    /// Glide to a new volume, clamped to [0, 1]
    pub fn update_volume(&self, volume: f64) {
        self.shared.params.set_target_volume(volume);
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lock_control().lifecycle
    }

    pub fn target_frequency(&self) -> f64 {
        self.shared.params.target_frequency()
    }

    pub fn target_volume(&self) -> f64 {
        self.shared.params.target_volume()
    }

    /// Smoothed volume as of the last rendered buffer
    pub fn current_volume(&self) -> f64 {
        self.shared.params.published_volume()
    }

    /// Whether a render node is attached to the session
    pub fn is_attached(&self) -> bool {
        self.shared.lock_control().node.is_some()
    }

    pub fn sample_rate(&self) -> f64 {
        self.shared.lock_control().session.sample_rate()
    }

    pub fn settings(&self) -> DroneSettings {
        self.shared.settings
    }

    fn schedule_teardown(&self, generation: u64) {
        let shared: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        let delay = self.shared.settings.teardown_delay;

        let spawned = thread::Builder::new()
            .name("tanpura-teardown".to_string())
            .spawn(move || {
                thread::sleep(delay);
                if let Some(shared) = shared.upgrade() {
                    shared.teardown_check(generation);
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to schedule drone teardown: {}", e);
        }
    }
}
