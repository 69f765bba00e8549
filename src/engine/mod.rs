//! Audio Engine Module
//!
//! Core audio plumbing:
//! - Audio buffer management (gain, overlay, format conversion)
//! - File I/O and the external converter
//! - Waveform previews

pub mod buffer;
pub mod convert;
pub mod io;
pub mod waveform;

pub use buffer::{db_to_linear, AudioBuffer, GENERATOR_SAMPLE_RATE};
pub use convert::ConverterConfig;
pub use io::{export_audio, load_audio, AudioLoader, ExportFormat, TrackLoader};
pub use waveform::{waveform_data, DEFAULT_WAVEFORM_POINTS};
