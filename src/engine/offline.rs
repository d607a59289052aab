//! Offline audio session
//!
//! Renders on demand instead of on a hardware clock. Used for WAV export and
//! for exercising the engine deterministically. Clones share one graph, so a
//! caller can hand one clone to the engine and keep another to pull audio.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::session::{clear_slot, fill_slot, new_render_slot, slot_occupied, RenderSlot};
use super::{AudioSession, NodeHandle};
use crate::error::AudioError;
use crate::synth::RenderUnit;

struct OfflineGraph {
    sample_rate: f64,
    channels: usize,
    slot: RenderSlot,
    running: AtomicBool,
    active: AtomicBool,
    next_node: AtomicU64,
    fail_activation: AtomicBool,
    fail_start: AtomicBool,
    attach_count: AtomicU64,
}

/// An audio graph pulled by the caller
#[derive(Clone)]
pub struct OfflineSession {
    graph: Arc<OfflineGraph>,
}

impl OfflineSession {
    /// Create a session with the given format
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            graph: Arc::new(OfflineGraph {
                sample_rate: sample_rate as f64,
                channels: channels.max(1),
                slot: new_render_slot(),
                running: AtomicBool::new(false),
                active: AtomicBool::new(false),
                next_node: AtomicU64::new(1),
                fail_activation: AtomicBool::new(false),
                fail_start: AtomicBool::new(false),
                attach_count: AtomicU64::new(0),
            }),
        }
    }

    /// Make every `activate` call fail
    pub fn fail_activation(self, fail: bool) -> Self {
        self.graph.fail_activation.store(fail, Ordering::SeqCst);
        self
    }

    /// Make every `start` call fail
    pub fn fail_start(self, fail: bool) -> Self {
        self.graph.fail_start.store(fail, Ordering::SeqCst);
        self
    }

    /// Whether `activate` has succeeded
    pub fn is_active(&self) -> bool {
        self.graph.active.load(Ordering::SeqCst)
    }

    /// Number of successful attaches over the session's lifetime
    pub fn attach_count(&self) -> u64 {
        self.graph.attach_count.load(Ordering::SeqCst)
    }

    /// Render one interleaved buffer
    ///
    /// Writes silence when the graph is paused, nothing is attached, or the
    /// slot is busy.
    pub fn render(&self, out: &mut [f32]) {
        if !self.graph.running.load(Ordering::SeqCst) {
            out.fill(0.0);
            return;
        }

        match self.graph.slot.try_lock() {
            Ok(mut slot) => match &mut *slot {
                Some((_, unit)) => unit.render_interleaved(out, self.graph.channels),
                None => out.fill(0.0),
            },
            Err(_) => out.fill(0.0),
        }
    }

    /// Render `frames` frames in buffers of `buffer_frames`, discarding the output
    pub fn advance(&self, frames: usize, buffer_frames: usize) {
        let buffer_frames = buffer_frames.max(1);
        let mut buffer = vec![0.0f32; buffer_frames * self.graph.channels];
        let mut remaining = frames;
        while remaining > 0 {
            let n = remaining.min(buffer_frames);
            self.render(&mut buffer[..n * self.graph.channels]);
            remaining -= n;
        }
    }
}

impl AudioSession for OfflineSession {
    fn sample_rate(&self) -> f64 {
        self.graph.sample_rate
    }

    fn channels(&self) -> usize {
        self.graph.channels
    }

    fn activate(&mut self) -> Result<(), AudioError> {
        if self.graph.fail_activation.load(Ordering::SeqCst) {
            return Err(AudioError::SessionActivation("offline activation disabled".to_string()));
        }
        self.graph.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn attach(&mut self, unit: Box<dyn RenderUnit>) -> Result<NodeHandle, AudioError> {
        let node = NodeHandle::new(self.graph.next_node.fetch_add(1, Ordering::SeqCst));
        fill_slot(&self.graph.slot, node, unit)?;
        self.graph.attach_count.fetch_add(1, Ordering::SeqCst);
        Ok(node)
    }

    fn detach(&mut self, node: NodeHandle) -> bool {
        clear_slot(&self.graph.slot, node)
    }

    fn is_attached(&self) -> bool {
        slot_occupied(&self.graph.slot)
    }

    fn start(&mut self) -> Result<(), AudioError> {
        if self.graph.fail_start.load(Ordering::SeqCst) {
            return Err(AudioError::EngineStart("offline start disabled".to_string()));
        }
        self.graph.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.graph.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.graph.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp(f32);

    impl RenderUnit for Ramp {
        fn next_sample(&mut self) -> f32 {
            self.0 += 0.1;
            self.0
        }
    }

    #[test]
    fn test_silent_until_started() {
        let mut session = OfflineSession::new(44100, 2);
        session.attach(Box::new(Ramp(0.0))).unwrap();

        let mut buffer = vec![1.0f32; 8];
        session.render(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));

        session.start().unwrap();
        session.render(&mut buffer);
        assert!((buffer[0] - 0.1).abs() < 1e-6);
        assert_eq!(buffer[0], buffer[1]);
        assert!((buffer[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_clones_share_the_graph() {
        let session = OfflineSession::new(48000, 1);
        let mut engine_side = session.clone();

        let node = engine_side.attach(Box::new(Ramp(0.0))).unwrap();
        assert!(session.is_attached());
        assert_eq!(session.attach_count(), 1);

        assert!(engine_side.detach(node));
        assert!(!session.is_attached());
        assert!(!engine_side.detach(node));
    }

    #[test]
    fn test_failure_injection() {
        let mut session = OfflineSession::new(44100, 1).fail_activation(true).fail_start(true);
        assert!(matches!(session.activate(), Err(AudioError::SessionActivation(_))));
        assert!(matches!(session.start(), Err(AudioError::EngineStart(_))));
        assert!(!session.is_active());
        assert!(!session.is_running());
    }

    #[test]
    fn test_advance_renders_requested_frames() {
        let mut session = OfflineSession::new(44100, 1);
        session.attach(Box::new(Ramp(0.0))).unwrap();
        session.start().unwrap();
        session.advance(10, 4);

        let mut buffer = vec![0.0f32; 1];
        session.render(&mut buffer);
        assert!((buffer[0] - 1.1).abs() < 1e-5);
    }
}
