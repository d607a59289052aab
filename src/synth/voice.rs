//! Render unit trait for sample producers attached to an audio graph

/// A mono sample source driven by the audio hardware
///
/// Every method runs on the render context: implementations must not block,
/// allocate or log.
pub trait RenderUnit: Send {
    /// Called once before the first frame of each hardware buffer
    fn begin_buffer(&mut self) {}

    /// Produce the next frame
    fn next_sample(&mut self) -> f32;

    /// Called once after the last frame of each hardware buffer
    fn end_buffer(&mut self) {}

    /// Fill an interleaved buffer, copying each frame to every channel
    fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        self.begin_buffer();
        for frame in out.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
        self.end_buffer();
    }
}
