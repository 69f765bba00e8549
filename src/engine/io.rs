//! Audio file I/O for contact-signal
//!
//! WAV files are read and written directly with `hound`. Every other
//! container goes through the external converter (see [`ConverterConfig`])
//! via a scratch WAV file.
//!
//! Imported audio keeps its own sample rate and channel count; samples of
//! any bit depth are converted to signed 16-bit.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};

use crate::engine::buffer::{clip_sample, AudioBuffer};
use crate::engine::convert::{extension_of, ConverterConfig};
use crate::error::{ContactError, Result};

/// Container format for exported signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// 16-bit PCM WAV, written natively
    #[default]
    Wav,
    /// MP3 via the external converter
    Mp3,
    /// FLAC via the external converter
    Flac,
    /// Ogg Vorbis via the external converter
    Ogg,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Wav => "wav",
            ExportFormat::Mp3 => "mp3",
            ExportFormat::Flac => "flac",
            ExportFormat::Ogg => "ogg",
        }
    }

    /// Whether writing this format needs the external converter
    pub fn needs_converter(&self) -> bool {
        !matches!(self, ExportFormat::Wav)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(ExportFormat::Wav),
            "mp3" => Ok(ExportFormat::Mp3),
            "flac" => Ok(ExportFormat::Flac),
            "ogg" => Ok(ExportFormat::Ogg),
            other => Err(ContactError::UnsupportedFormat {
                format: format!("export format '{}'", other),
            }),
        }
    }
}

// ============================================================================
// Track loading
// ============================================================================

/// Source of optional music tracks for the composer
pub trait TrackLoader: Send + Sync {
    /// Load the track at `path`
    fn load(&self, path: &Path) -> Result<AudioBuffer>;
}

/// Default loader: WAV natively, other containers through the converter
#[derive(Debug, Clone, Default)]
pub struct AudioLoader {
    converter: ConverterConfig,
}

impl AudioLoader {
    /// Create a loader that can use the given converter
    pub fn new(converter: ConverterConfig) -> Self {
        Self { converter }
    }

    /// The converter this loader falls back to
    pub fn converter(&self) -> &ConverterConfig {
        &self.converter
    }
}

impl TrackLoader for AudioLoader {
    fn load(&self, path: &Path) -> Result<AudioBuffer> {
        load_audio(path, &self.converter)
    }
}

/// Import an audio file
///
/// # Arguments
/// * `path` - Path to the audio file
/// * `converter` - Converter used for anything that is not WAV
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file cannot be decoded
/// * `ConverterUnavailable` - Non-WAV input without a converter
/// * `EmptyAudio` - If the file decodes to zero frames
pub fn load_audio(path: &Path, converter: &ConverterConfig) -> Result<AudioBuffer> {
    if !path.is_file() {
        return Err(ContactError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let buffer = if extension_of(path) == "wav" {
        read_wav(path)?
    } else {
        let scratch = scratch_wav()?;
        converter.transcode(path, scratch.path())?;
        read_wav(scratch.path())?
    };

    if buffer.is_empty() {
        return Err(ContactError::EmptyAudio);
    }

    debug!(
        "Loaded {} ({} ms, {} Hz, {} ch)",
        path.display(),
        buffer.duration_ms(),
        buffer.sample_rate(),
        buffer.channels()
    );
    Ok(buffer)
}

/// Export a buffer to `path`
///
/// WAV is written as 16-bit PCM at the buffer's own rate. Other formats are
/// written to a scratch WAV first and handed to the converter.
pub fn export_audio(
    buffer: &AudioBuffer,
    path: &Path,
    format: ExportFormat,
    converter: &ConverterConfig,
) -> Result<()> {
    if format.needs_converter() {
        if !converter.is_available() {
            return Err(ContactError::ConverterUnavailable {
                format: format.to_string(),
            });
        }
        let scratch = scratch_wav()?;
        write_wav(buffer, scratch.path())?;
        converter.transcode(scratch.path(), path)?;
    } else {
        write_wav(buffer, path)?;
    }

    info!(
        "Exported {} ms signal to {} ({})",
        buffer.duration_ms(),
        path.display(),
        format
    );
    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn scratch_wav() -> Result<tempfile::NamedTempFile> {
    Ok(tempfile::Builder::new()
        .prefix("contact-signal-")
        .suffix(".wav")
        .tempfile()?)
}

fn hound_error(e: hound::Error) -> ContactError {
    match e {
        hound::Error::IoError(io) => ContactError::Io(io),
        other => ContactError::InvalidAudio {
            reason: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path).map_err(|e| ContactError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let samples = read_samples_as_i16(reader, spec.bits_per_sample, spec.sample_format)?;
    AudioBuffer::new(samples, spec.sample_rate, spec.channels)
}

fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(hound_error)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(hound_error)?;
    }
    writer.finalize().map_err(hound_error)?;
    Ok(())
}

/// Read samples from a WAV reader and convert to i16
fn read_samples_as_i16<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<i16>> {
    let invalid = |e: hound::Error| ContactError::InvalidAudio {
        reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| clip_sample(v as f64 * 32767.0)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| (v as i16) << 8))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid),
        // 24-bit stored as i32 in hound
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> 8) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> 16) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid),
        (SampleFormat::Int, bits) => Err(ContactError::UnsupportedFormat {
            format: format!("{}-bit integer audio", bits),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
