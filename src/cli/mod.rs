//! CLI interface for Tanpura

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drone reference tone for tuning practice
#[derive(Parser)]
#[command(name = "tanpura")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a drone through the default output device
    ///
    /// Type a note (e.g. "D3"), a frequency in Hz, "vol 0.4", "stop",
    /// "start" or "quit" and press enter. Ctrl-C fades out and exits.
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "tanpura.yaml")]
        config: PathBuf,

        /// Note to start on (overrides config)
        #[arg(short, long)]
        note: Option<String>,

        /// Volume 0.0-1.0 (overrides config)
        #[arg(short, long)]
        volume: Option<f64>,
    },

    /// Render a drone to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "tanpura.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: f64,

        /// Note to record (overrides config)
        #[arg(short, long)]
        note: Option<String>,

        /// Fade-out length at the end, in seconds
        #[arg(long, default_value = "1")]
        fade: f64,
    },

    /// Print the frequency of one or more notes
    Freq {
        /// Notes such as A4, C#3 or Bb2
        #[arg(required = true)]
        notes: Vec<String>,

        /// Frequency of A4 in Hz
        #[arg(short, long, default_value = "440")]
        reference: f64,

        /// Round to whole Hz
        #[arg(long)]
        round: bool,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "tanpura.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

/// A line typed during `tanpura play`
#[derive(Debug, Clone, PartialEq)]
pub enum PlayCommand {
    /// Glide to a named note
    Note(String),
    /// Glide to a frequency in Hz
    Frequency(f64),
    /// Change volume
    Volume(f64),
    Start,
    Stop,
    Quit,
    Help,
}

impl PlayCommand {
    /// Parse one input line; `None` for blank or unrecognized input
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let first = words.next()?;
        let rest = words.next();

        match (first.to_lowercase().as_str(), rest) {
            ("start" | "play", None) => Some(Self::Start),
            ("stop", None) => Some(Self::Stop),
            ("quit" | "exit" | "q", None) => Some(Self::Quit),
            ("help" | "?", None) => Some(Self::Help),
            ("vol" | "volume" | "v", Some(value)) => value.parse().ok().map(Self::Volume),
            ("hz" | "freq", Some(value)) => value.parse().ok().map(Self::Frequency),
            (_, None) => {
                if let Ok(hz) = first.parse::<f64>() {
                    Some(Self::Frequency(hz))
                } else if tanpura::pitch::resolve_note(first).is_some() {
                    Some(Self::Note(first.to_string()))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Frame counts for `tanpura record`: frames before the stop, then the fade
///
/// The fade is capped at the total length.
pub fn record_frames(duration_secs: f64, fade_secs: f64, sample_rate: u32) -> Result<(u64, u64)> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        bail!("Duration must be a positive number of seconds, got {}", duration_secs);
    }
    if !fade_secs.is_finite() {
        bail!("Fade must be a finite number of seconds, got {}", fade_secs);
    }

    let total = (duration_secs * sample_rate as f64) as u64;
    let fade = ((fade_secs.max(0.0) * sample_rate as f64) as u64).min(total);
    Ok((total - fade, fade))
}
