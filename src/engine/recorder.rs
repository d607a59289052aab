//! WAV file recorder
//!
//! Captures audio pulled from an offline session into a WAV file.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::{AudioSession, OfflineSession};

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    channels: u16,
    frames_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    /// * `channels` - Interleaved channel count
    pub fn new(path: &Path, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            channels,
            frames_written: 0,
        })
    }

    /// Create a recorder matching an offline session's format
    pub fn for_session(path: &Path, session: &OfflineSession) -> Result<Self> {
        Self::new(path, session.sample_rate() as u32, session.channels() as u16)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel) written
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.sample_rate as f64
    }

    /// Write an interleaved buffer; a trailing partial frame is dropped
    pub fn write_buffer(&mut self, buffer: &[f32]) -> Result<()> {
        let channels = self.channels.max(1) as usize;
        let whole = buffer.len() - buffer.len() % channels;
        for &sample in &buffer[..whole] {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
        }
        self.frames_written += (whole / channels) as u64;
        Ok(())
    }

    /// Pull `frames` frames from `session` in blocks of `buffer_frames`
    pub fn capture(
        &mut self,
        session: &OfflineSession,
        frames: u64,
        buffer_frames: usize,
    ) -> Result<()> {
        let channels = session.channels();
        let buffer_frames = buffer_frames.max(1);
        let mut buffer = vec![0.0f32; buffer_frames * channels];
        let mut remaining = frames;

        while remaining > 0 {
            let n = remaining.min(buffer_frames as u64) as usize;
            let block = &mut buffer[..n * channels];
            session.render(block);
            self.write_buffer(block)?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}
