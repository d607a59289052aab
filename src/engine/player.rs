//! Real-time audio session using cpal
//!
//! The cpal host, device and stream live on a dedicated audio thread. The
//! session talks to that thread over a command channel, which keeps the
//! session `Send` on platforms where streams are not.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use super::session::{clear_slot, fill_slot, new_render_slot, slot_occupied, RenderSlot};
use super::{AudioSession, NodeHandle};
use crate::error::AudioError;
use crate::synth::RenderUnit;

type Reply = Sender<Result<(), AudioError>>;

enum SessionCommand {
    Activate(Reply),
    Start(Reply),
    Pause,
    Shutdown,
}

/// Audio session backed by the system's output device
pub struct CpalSession {
    commands: Sender<SessionCommand>,
    thread: Option<JoinHandle<()>>,
    slot: RenderSlot,
    running: Arc<AtomicBool>,
    next_node: AtomicU64,
    sample_rate: f64,
    channels: usize,
}

impl CpalSession {
    /// Open the default output device, or the first whose name contains
    /// `device_name`
    pub fn open(device_name: Option<&str>) -> Result<Self, AudioError> {
        let slot = new_render_slot();
        let running = Arc::new(AtomicBool::new(false));
        let (commands, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_slot = slot.clone();
        let thread_running = running.clone();
        let device_name = device_name.map(str::to_string);

        let thread = thread::Builder::new()
            .name("tanpura-audio".to_string())
            .spawn(move || {
                let (device, config) = match open_device(device_name.as_deref()) {
                    Ok(opened) => opened,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let format = (config.sample_rate.0, config.channels);
                let _ = ready_tx.send(Ok(format));
                audio_thread(device, config, thread_slot, thread_running, command_rx);
            })
            .map_err(|e| AudioError::SessionActivation(e.to_string()))?;

        let (sample_rate, channels) = ready_rx.recv().map_err(|_| AudioError::SessionClosed)??;

        Ok(Self {
            commands,
            thread: Some(thread),
            slot,
            running,
            next_node: AtomicU64::new(1),
            sample_rate: sample_rate as f64,
            channels: channels as usize,
        })
    }

    fn request(&self, command: impl FnOnce(Reply) -> SessionCommand) -> Result<(), AudioError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| AudioError::SessionClosed)?;
        reply_rx.recv().map_err(|_| AudioError::SessionClosed)?
    }
}

impl AudioSession for CpalSession {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn activate(&mut self) -> Result<(), AudioError> {
        self.request(SessionCommand::Activate)
    }

    fn attach(&mut self, unit: Box<dyn RenderUnit>) -> Result<NodeHandle, AudioError> {
        let node = NodeHandle::new(self.next_node.fetch_add(1, Ordering::Relaxed));
        if let Some(previous) = fill_slot(&self.slot, node, unit)? {
            debug!("Replaced render node {} with {}", previous.id(), node.id());
        }
        Ok(node)
    }

    fn detach(&mut self, node: NodeHandle) -> bool {
        clear_slot(&self.slot, node)
    }

    fn is_attached(&self) -> bool {
        slot_occupied(&self.slot)
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.request(SessionCommand::Start)
    }

    fn pause(&mut self) {
        if self.commands.send(SessionCommand::Pause).is_err() {
            warn!("Audio thread gone, cannot pause");
        }
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for CpalSession {
    fn drop(&mut self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Audio thread panicked");
            }
        }
    }
}

fn open_device(device_name: Option<&str>) -> Result<(Device, StreamConfig), AudioError> {
    let host = cpal::default_host();
    info!("Audio host: {:?}", host.id());

    let device = match device_name {
        Some(name) => host
            .output_devices()
            .map_err(|e| AudioError::SessionActivation(e.to_string()))?
            .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
            .ok_or(AudioError::NoOutputDevice)?,
        None => host.default_output_device().ok_or(AudioError::NoOutputDevice)?,
    };
    info!("Audio device: {}", device.name().unwrap_or_default());

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::SessionActivation(e.to_string()))?;

    match supported.sample_format() {
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16 => {}
        other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
    }

    Ok((device, supported.into()))
}

fn audio_thread(
    device: Device,
    config: StreamConfig,
    slot: RenderSlot,
    running: Arc<AtomicBool>,
    commands: Receiver<SessionCommand>,
) {
    let mut stream: Option<Stream> = None;

    while let Ok(command) = commands.recv() {
        match command {
            SessionCommand::Activate(reply) => {
                let result = device
                    .default_output_config()
                    .map(|_| ())
                    .map_err(|e| AudioError::SessionActivation(e.to_string()));
                let _ = reply.send(result);
            }
            SessionCommand::Start(reply) => {
                let result = play(&device, &config, &slot, &mut stream);
                if result.is_ok() {
                    running.store(true, Ordering::SeqCst);
                    info!("Audio stream started at {} Hz", config.sample_rate.0);
                }
                let _ = reply.send(result);
            }
            SessionCommand::Pause => {
                if let Some(stream) = &stream {
                    if let Err(e) = stream.pause() {
                        warn!("Failed to pause audio stream: {}", e);
                    }
                }
                running.store(false, Ordering::SeqCst);
            }
            SessionCommand::Shutdown => break,
        }
    }

    running.store(false, Ordering::SeqCst);
}

fn play(
    device: &Device,
    config: &StreamConfig,
    slot: &RenderSlot,
    stream: &mut Option<Stream>,
) -> Result<(), AudioError> {
    if stream.is_none() {
        let format = device
            .default_output_config()
            .map_err(|e| AudioError::EngineStart(e.to_string()))?
            .sample_format();

        let built = match format {
            SampleFormat::F32 => build_stream::<f32>(device, config, slot.clone())?,
            SampleFormat::I16 => build_stream::<i16>(device, config, slot.clone())?,
            SampleFormat::U16 => build_stream::<u16>(device, config, slot.clone())?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };
        *stream = Some(built);
    }

    match stream {
        Some(stream) => stream.play().map_err(|e| AudioError::EngineStart(e.to_string())),
        None => Err(AudioError::EngineStart("no stream".to_string())),
    }
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    slot: RenderSlot,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Never wait on the control side: a busy slot means silence
                if let Ok(mut guard) = slot.try_lock() {
                    if let Some((_, unit)) = &mut *guard {
                        unit.begin_buffer();
                        for frame in data.chunks_mut(channels) {
                            let sample = T::from_sample(unit.next_sample());
                            for channel_sample in frame.iter_mut() {
                                *channel_sample = sample;
                            }
                        }
                        unit.end_buffer();
                        return;
                    }
                }

                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0f32);
                }
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::EngineStart(e.to_string()))
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
