//! Audio session abstraction
//!
//! The drone engine drives the audio hardware only through this trait, so
//! the same engine runs against a real device or an offline graph.

use std::sync::{Arc, Mutex};

use crate::error::AudioError;
use crate::synth::RenderUnit;

/// Opaque handle to a render unit attached to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Audio graph that can host one render unit
pub trait AudioSession: Send + 'static {
    /// Hardware sample rate in Hz
    fn sample_rate(&self) -> f64;

    /// Number of interleaved output channels
    fn channels(&self) -> usize;

    /// Prepare the hardware for playback alongside other audio
    fn activate(&mut self) -> Result<(), AudioError>;

    /// Attach a render unit, replacing any previous one
    fn attach(&mut self, unit: Box<dyn RenderUnit>) -> Result<NodeHandle, AudioError>;

    /// Detach the unit behind `node`; returns false if it was not attached
    fn detach(&mut self, node: NodeHandle) -> bool;

    /// Whether a render unit is currently attached
    fn is_attached(&self) -> bool;

    /// Start pulling audio from the graph
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop pulling audio; the attached unit is kept
    fn pause(&mut self);

    /// Whether the graph is currently running
    fn is_running(&self) -> bool;
}

/// The slot an audio callback renders from
pub(crate) type RenderSlot = Arc<Mutex<Option<(NodeHandle, Box<dyn RenderUnit>)>>>;

pub(crate) fn new_render_slot() -> RenderSlot {
    Arc::new(Mutex::new(None))
}

/// Put `unit` into `slot`, returning the previous occupant's handle
pub(crate) fn fill_slot(
    slot: &RenderSlot,
    node: NodeHandle,
    unit: Box<dyn RenderUnit>,
) -> Result<Option<NodeHandle>, AudioError> {
    let mut guard = slot
        .lock()
        .map_err(|_| AudioError::Attach("render slot poisoned".to_string()))?;
    let previous = guard.replace((node, unit)).map(|(handle, _)| handle);
    Ok(previous)
}

/// Empty `slot` if it holds `node`
pub(crate) fn clear_slot(slot: &RenderSlot, node: NodeHandle) -> bool {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let holds_node = matches!(&*guard, Some((handle, _)) if *handle == node);
    if holds_node {
        *guard = None;
    }
    holds_node
}

pub(crate) fn slot_occupied(slot: &RenderSlot) -> bool {
    match slot.lock() {
        Ok(guard) => guard.is_some(),
        Err(poisoned) => poisoned.into_inner().is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32);

    impl RenderUnit for Constant {
        fn next_sample(&mut self) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_fill_and_clear_slot() {
        let slot = new_render_slot();
        assert!(!slot_occupied(&slot));

        let first = NodeHandle::new(1);
        assert_eq!(fill_slot(&slot, first, Box::new(Constant(0.5))).unwrap(), None);
        assert!(slot_occupied(&slot));

        let second = NodeHandle::new(2);
        assert_eq!(fill_slot(&slot, second, Box::new(Constant(0.1))).unwrap(), Some(first));

        // Stale handle leaves the newer unit in place
        assert!(!clear_slot(&slot, first));
        assert!(slot_occupied(&slot));

        assert!(clear_slot(&slot, second));
        assert!(!slot_occupied(&slot));
    }

    #[test]
    fn test_node_handle_id() {
        assert_eq!(NodeHandle::new(7).id(), 7);
    }
}
