//! Tone and noise generators
//!
//! Every generator produces a mono 16-bit buffer at
//! [`GENERATOR_SAMPLE_RATE`]. Full scale (0 dB) corresponds to a peak of
//! `i16::MAX`.

use std::f64::consts::PI;

use rand::Rng;

use crate::engine::buffer::{
    clip_sample, db_to_linear, frames_for_duration, AudioBuffer, GENERATOR_SAMPLE_RATE, MAX_SAMPLE,
};

/// Generate a pure sine tone
///
/// Frequencies above Nyquist are synthesised as-is and alias.
///
/// # Arguments
/// * `frequency` - Tone frequency in Hz
/// * `duration_ms` - Length in milliseconds; non-positive gives an empty buffer
/// * `gain_db` - Level relative to full scale
pub fn sine_tone(frequency: f64, duration_ms: i64, gain_db: f64) -> AudioBuffer {
    let frames = frames_for_duration(duration_ms, GENERATOR_SAMPLE_RATE);
    let amplitude = MAX_SAMPLE * db_to_linear(gain_db);
    let angular_freq = 2.0 * PI * frequency / GENERATOR_SAMPLE_RATE as f64;

    let samples = (0..frames)
        .map(|i| clip_sample((angular_freq * i as f64).sin() * amplitude))
        .collect();

    AudioBuffer::mono(samples, GENERATOR_SAMPLE_RATE)
}

/// Generate uniform white noise using the thread-local RNG
pub fn white_noise(duration_ms: i64, gain_db: f64) -> AudioBuffer {
    white_noise_with_rng(duration_ms, gain_db, &mut rand::thread_rng())
}

/// Generate uniform white noise from a caller-supplied RNG
///
/// Each sample is drawn uniformly from `[-1.0, 1.0]` before scaling.
pub fn white_noise_with_rng<R: Rng + ?Sized>(
    duration_ms: i64,
    gain_db: f64,
    rng: &mut R,
) -> AudioBuffer {
    let frames = frames_for_duration(duration_ms, GENERATOR_SAMPLE_RATE);
    let amplitude = MAX_SAMPLE * db_to_linear(gain_db);

    let samples = (0..frames)
        .map(|_| clip_sample(rng.gen_range(-1.0_f64..=1.0) * amplitude))
        .collect();

    AudioBuffer::mono(samples, GENERATOR_SAMPLE_RATE)
}
