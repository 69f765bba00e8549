//! CLI Module
//!
//! Command-line interface for the contact signal generator.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::io::ExportFormat;
use crate::engine::waveform::DEFAULT_WAVEFORM_POINTS;
use crate::signal::presets::DEFAULT_PRESET;

/// Contact Signal - layered tone, chirp and noise signal generator
#[derive(Parser, Debug)]
#[command(name = "contact-signal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Application configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a contact signal
    #[command(name = "generate")]
    Generate {
        /// Preset to start from
        #[arg(short, long, default_value = DEFAULT_PRESET)]
        preset: String,

        /// Signal configuration file (JSON); replaces the preset
        #[arg(long)]
        config_json: Option<PathBuf>,

        /// Music track to build the signal around
        #[arg(short, long)]
        music: Option<PathBuf>,

        /// Signal length in milliseconds when no track is used
        #[arg(short, long)]
        duration: Option<i64>,

        /// Output file (defaults to the configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value_t = ExportFormat::Wav)]
        format: ExportFormat,

        /// Seed for the breath-layer noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print every preset as JSON
    #[command(name = "presets")]
    Presets,

    /// Print one preset's configuration as JSON
    #[command(name = "preset")]
    Preset {
        /// Preset name (unknown names fall back to the default)
        name: String,
    },

    /// Print a normalised waveform as JSON
    #[command(name = "waveform")]
    Waveform {
        /// Audio file
        file: PathBuf,

        /// Number of points to sample
        #[arg(short, long, default_value_t = DEFAULT_WAVEFORM_POINTS)]
        points: usize,
    },

    /// Show duration and format of an audio file
    #[command(name = "info")]
    Info {
        /// Audio file
        file: PathBuf,
    },

    /// List loadable music tracks
    #[command(name = "tracks")]
    Tracks {
        /// Directory to scan (defaults to the configured upload directory)
        dir: Option<PathBuf>,
    },
}
