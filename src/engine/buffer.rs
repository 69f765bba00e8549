//! Audio Buffer Management
//!
//! Provides the core audio buffer type for contact-signal.
//! Buffers hold interleaved signed 16-bit samples and are never mutated
//! through the public API: every transform returns a new buffer.

use crate::error::{ContactError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate used by every tone and noise generator (44.1kHz)
pub const GENERATOR_SAMPLE_RATE: u32 = 44100;

/// Largest representable sample value
pub const MAX_SAMPLE: f64 = i16::MAX as f64;

/// Smallest representable sample value
pub const MIN_SAMPLE: f64 = i16::MIN as f64;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (0.0 to 1.0+ range)
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Saturate a floating point sample into the `i16` range
///
/// Values outside the range clip to the nearest bound; in-range values are
/// truncated toward zero. NaN maps to zero.
#[inline]
pub fn clip_sample(value: f64) -> i16 {
    value.clamp(MIN_SAMPLE, MAX_SAMPLE) as i16
}

/// Number of frames covering `duration_ms` at `sample_rate`
///
/// Non-positive durations yield zero frames.
#[inline]
pub fn frames_for_duration(duration_ms: i64, sample_rate: u32) -> usize {
    if duration_ms <= 0 {
        return 0;
    }
    (sample_rate as f64 * (duration_ms as f64 / 1000.0)) as usize
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for all signal composition
///
/// Stores audio as interleaved signed 16-bit samples: `[L0, R0, L1, R1, ...]`
/// for stereo, plain `[S0, S1, ...]` for mono.
///
/// # Example
/// ```
/// use contact_signal::engine::buffer::{AudioBuffer, GENERATOR_SAMPLE_RATE};
///
/// let buffer = AudioBuffer::silent(1000, GENERATOR_SAMPLE_RATE, 1);
/// assert_eq!(buffer.num_frames(), 44100);
/// assert_eq!(buffer.duration_ms(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// # Errors
    /// `FormatMismatch` when the channel count or sample rate is zero, or
    /// when the sample count is not a whole number of frames.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(ContactError::FormatMismatch {
                reason: format!(
                    "invalid format: {} channels at {} Hz",
                    channels, sample_rate
                ),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(ContactError::FormatMismatch {
                reason: format!(
                    "sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Create a mono buffer; infallible for a non-zero sample rate
    pub(crate) fn mono(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
            channels: 1,
        }
    }

    /// New buffer in this buffer's format; `samples` must hold whole frames
    pub(crate) fn with_samples(&self, samples: Vec<i16>) -> Self {
        debug_assert_eq!(samples.len() % self.channels as usize, 0);
        Self {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Create a buffer of silence lasting `duration_ms`
    pub fn silent(duration_ms: i64, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let frames = frames_for_duration(duration_ms, sample_rate);
        Self {
            samples: vec![0; frames * channels as usize],
            sample_rate: sample_rate.max(1),
            channels,
        }
    }

    /// Interleaved sample data
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration rounded to whole milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.num_frames() as f64 * 1000.0 / self.sample_rate as f64).round() as i64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Check whether another buffer has the same rate and channel count
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Copy of the frames in `start..end` (clamped to the buffer)
    pub fn slice_frames(&self, start: usize, end: usize) -> AudioBuffer {
        let frames = self.num_frames();
        let end = end.min(frames);
        let start = start.min(end);
        let ch = self.channels as usize;
        AudioBuffer {
            samples: self.samples[start * ch..end * ch].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Return a copy with `gain_db` applied to every sample (saturating)
    pub fn apply_gain(&self, gain_db: f64) -> AudioBuffer {
        let gain = db_to_linear(gain_db);
        AudioBuffer {
            samples: self
                .samples
                .iter()
                .map(|&s| clip_sample(s as f64 * gain))
                .collect(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Convert to the requested channel count
    ///
    /// Downmixing averages all channels of a frame; upmixing from mono
    /// duplicates the single channel.
    ///
    /// # Errors
    /// `UnsupportedFormat` for conversions other than N→1 and 1→N.
    pub fn set_channels(&self, channels: u16) -> Result<AudioBuffer> {
        if channels == self.channels {
            return Ok(self.clone());
        }

        let src = self.channels as usize;
        let samples = if channels == 1 {
            self.samples
                .chunks_exact(src)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    clip_sample(sum as f64 / src as f64)
                })
                .collect()
        } else if self.channels == 1 && channels > 1 {
            self.samples
                .iter()
                .flat_map(|&s| std::iter::repeat(s).take(channels as usize))
                .collect()
        } else {
            return Err(ContactError::UnsupportedFormat {
                format: format!("{} to {} channel conversion", self.channels, channels),
            });
        };

        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels,
        })
    }

    /// Resample to `sample_rate` using linear interpolation
    pub fn set_sample_rate(&self, sample_rate: u32) -> AudioBuffer {
        if sample_rate == self.sample_rate || sample_rate == 0 {
            return self.clone();
        }

        let ratio = sample_rate as f64 / self.sample_rate as f64;
        let ch = self.channels as usize;
        let source_frames = self.num_frames();
        let target_frames = (source_frames as f64 * ratio).round() as usize;
        let mut samples = Vec::with_capacity(target_frames * ch);

        for i in 0..target_frames {
            // Map output frame to source position
            let src_pos = i as f64 / ratio;
            let src_idx = src_pos.floor() as usize;
            let frac = src_pos - src_idx as f64;

            for c in 0..ch {
                let sample = if src_idx + 1 < source_frames {
                    let a = self.samples[src_idx * ch + c] as f64;
                    let b = self.samples[(src_idx + 1) * ch + c] as f64;
                    clip_sample((a * (1.0 - frac) + b * frac).round())
                } else if src_idx < source_frames {
                    self.samples[src_idx * ch + c]
                } else {
                    0
                };
                samples.push(sample);
            }
        }

        AudioBuffer {
            samples,
            sample_rate,
            channels: self.channels,
        }
    }

    /// Bring two buffers to a common format
    ///
    /// Both are converted to the larger channel count and the higher sample
    /// rate. This is the explicit conversion step before any mix.
    pub fn sync(&self, other: &AudioBuffer) -> Result<(AudioBuffer, AudioBuffer)> {
        let channels = self.channels.max(other.channels);
        let sample_rate = self.sample_rate.max(other.sample_rate);

        let convert = |buffer: &AudioBuffer| -> Result<AudioBuffer> {
            if buffer.channels == channels && buffer.sample_rate == sample_rate {
                Ok(buffer.clone())
            } else {
                Ok(buffer.set_channels(channels)?.set_sample_rate(sample_rate))
            }
        };

        Ok((convert(self)?, convert(other)?))
    }

    /// Mix `other` on top of this buffer starting at `position_ms`
    ///
    /// The result keeps this buffer's length; whatever part of `other` runs
    /// past the end is dropped. Samples are added with saturation.
    pub fn overlay(&self, other: &AudioBuffer, position_ms: i64) -> Result<AudioBuffer> {
        let (mut base, top) = self.sync(other)?;
        base.mix_at(&top, position_ms)?;
        Ok(base)
    }

    /// In-place saturating mix of an equally formatted buffer
    pub(crate) fn mix_at(&mut self, other: &AudioBuffer, position_ms: i64) -> Result<()> {
        if !self.same_format(other) {
            return Err(ContactError::FormatMismatch {
                reason: format!(
                    "cannot mix {}ch@{}Hz into {}ch@{}Hz",
                    other.channels, other.sample_rate, self.channels, self.sample_rate
                ),
            });
        }

        let ch = self.channels as usize;
        let start = frames_for_duration(position_ms, self.sample_rate) * ch;
        if start >= self.samples.len() {
            return Ok(());
        }

        for (dst, &src) in self.samples[start..].iter_mut().zip(other.samples.iter()) {
            *dst = dst.saturating_add(src);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
