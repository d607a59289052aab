//! Tanpura - drone reference tone for tuning practice

use anyhow::Result;
use clap::Parser;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tanpura::config::{self, TanpuraConfig};
use tanpura::engine::{self, CpalSession, DroneEngine, Lifecycle, OfflineSession, Recorder};
use tanpura::pitch;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands, PlayCommand};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config: config_path,
            note,
            volume,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            play(&cfg, note, volume)?;
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
            note,
            fade,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            record(&cfg, &output, duration, note, fade)?;
        }

        Commands::Freq {
            notes,
            reference,
            round,
        } => {
            for note in &notes {
                let resolved = match pitch::resolve_note(note) {
                    Some(spec) => spec.to_string(),
                    None => "unrecognized, using reference".to_string(),
                };
                if round {
                    let hz = pitch::frequency_for_note(note, reference).round() as u32;
                    println!("{:<6} {:>6} Hz  ({})", note, hz, resolved);
                } else {
                    let hz = pitch::frequency_for_note(note, reference);
                    println!("{:<6} {:>9.2} Hz  ({})", note, hz, resolved);
                }
            }
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Channels: {}", cfg.audio.channels);
                    println!("  Reference A4: {} Hz", cfg.drone.reference_a4);
                    println!("  Note: {} ({:.2} Hz)", cfg.drone.note, cfg.drone_frequency());
                    println!("  Volume: {:.0}%", cfg.drone.volume * 100.0);
                    println!("  Smoothing factor: {}", cfg.drone.smoothing_factor);
                    println!("  Teardown delay: {} ms", cfg.drone.teardown_delay_ms);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../tanpura.example.yaml");

            let path = "tanpura.yaml";
            if Path::new(path).exists() {
                println!("tanpura.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created tanpura.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

enum Input {
    Line(String),
    Interrupt,
}

fn play(cfg: &TanpuraConfig, note: Option<String>, volume: Option<f64>) -> Result<()> {
    let reference = cfg.drone.reference_a4;
    let note = note.unwrap_or_else(|| cfg.drone.note.clone());
    let mut volume = volume.unwrap_or(cfg.drone.volume);
    let mut frequency = pitch::frequency_for_note(&note, reference);

    let session = CpalSession::open(cfg.audio.device.as_deref())?;
    let drone = DroneEngine::new(session, cfg.drone_settings());

    let (tx, rx) = mpsc::channel();
    let interrupt_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Input::Interrupt);
    })?;

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Input::Line(line)).is_err() {
                break;
            }
        }
    });

    println!("Playing {} ({:.2} Hz) at {:.0}% volume", note, frequency, volume * 100.0);
    println!("Type a note, a frequency, \"vol <0-1>\", \"stop\", \"start\" or \"quit\".");
    drone.start(frequency, volume);

    while let Ok(input) = rx.recv() {
        let line = match input {
            Input::Interrupt => break,
            Input::Line(line) => line,
        };

        match PlayCommand::parse(&line) {
            Some(PlayCommand::Note(name)) => {
                frequency = pitch::frequency_for_note(&name, reference);
                drone.update(frequency);
                println!("{} ({:.2} Hz)", name, drone.target_frequency());
            }
            Some(PlayCommand::Frequency(hz)) => {
                frequency = hz;
                drone.update(frequency);
                println!("{:.2} Hz", drone.target_frequency());
            }
            Some(PlayCommand::Volume(v)) => {
                volume = v;
                drone.update_volume(volume);
                println!("Volume {:.0}%", drone.target_volume() * 100.0);
            }
            Some(PlayCommand::Start) => drone.start(frequency, volume),
            Some(PlayCommand::Stop) => drone.stop(),
            Some(PlayCommand::Quit) => break,
            Some(PlayCommand::Help) => {
                println!("Notes: A4, C#3, Bb2 ...  Frequency: 415 or \"hz 98.5\"");
                println!("Volume: \"vol 0.3\"  Control: start, stop, quit");
            }
            None if line.trim().is_empty() => {}
            None => println!("Unrecognized: {}", line.trim()),
        }
    }

    // Let the fade run out before the stream goes away
    if drone.lifecycle() != Lifecycle::Idle {
        drone.stop();
        thread::sleep(drone.settings().teardown_delay + Duration::from_millis(100));
    }
    println!("Stopped.");

    Ok(())
}

fn record(
    cfg: &TanpuraConfig,
    output: &Path,
    duration: f64,
    note: Option<String>,
    fade: f64,
) -> Result<()> {
    let sample_rate = cfg.audio.sample_rate;
    let (tone_frames, fade_frames) = cli::record_frames(duration, fade, sample_rate)?;

    let note = note.unwrap_or_else(|| cfg.drone.note.clone());
    let frequency = pitch::frequency_for_note(&note, cfg.drone.reference_a4);

    println!(
        "Recording {} ({:.2} Hz) for {} seconds to {:?}...",
        note, frequency, duration, output
    );

    let session = OfflineSession::new(sample_rate, cfg.audio.channels);
    let drone = DroneEngine::new(session.clone(), cfg.drone_settings());
    let mut recorder = Recorder::for_session(output, &session)?;

    drone.start(frequency, cfg.drone.volume);
    recorder.capture(&session, tone_frames, cfg.audio.buffer_size)?;

    drone.stop();
    recorder.capture(&session, fade_frames, cfg.audio.buffer_size)?;

    if drone.current_volume() > cfg.drone.silence_threshold {
        warn!("Recording ends before the fade-out completes");
    }

    recorder.finalize()?;
    println!("Recorded to {:?}", output);

    Ok(())
}
