//! Amplitude modulation and tremolo
//!
//! Both operators scale a buffer sample-by-sample by a control signal and
//! saturate the result back into the 16-bit range.

use std::f64::consts::PI;

use crate::engine::buffer::{clip_sample, AudioBuffer};
use crate::error::Result;

/// Scale factor used when the modulator carries no variation
pub const FLAT_MODULATOR_SCALE: f64 = 0.5;

/// Scale `carrier` by the normalised amplitude of `modulator`
///
/// Both inputs are folded to mono and the modulator is resampled to the
/// carrier's rate. The output holds `min(carrier, modulator)` frames. The
/// modulator is mapped onto `[0, 1]` over its own min/max; a constant
/// modulator yields a uniform [`FLAT_MODULATOR_SCALE`].
pub fn apply_amplitude_modulation(
    carrier: &AudioBuffer,
    modulator: &AudioBuffer,
) -> Result<AudioBuffer> {
    let carrier = carrier.set_channels(1)?;
    let modulator = modulator
        .set_channels(1)?
        .set_sample_rate(carrier.sample_rate());

    let len = carrier.num_frames().min(modulator.num_frames());
    let carrier_samples = &carrier.samples()[..len];
    let mod_samples = &modulator.samples()[..len];

    let (min, max) = match (mod_samples.iter().min(), mod_samples.iter().max()) {
        (Some(&min), Some(&max)) => (min as f64, max as f64),
        _ => return Ok(carrier.with_samples(Vec::new())),
    };
    let range = max - min;

    let samples = carrier_samples
        .iter()
        .zip(mod_samples)
        .map(|(&c, &m)| {
            let scale = if range > 0.0 {
                (m as f64 - min) / range
            } else {
                FLAT_MODULATOR_SCALE
            };
            clip_sample(c as f64 * scale)
        })
        .collect();

    Ok(carrier.with_samples(samples))
}

/// Tremolo envelope value at `t` seconds
#[inline]
pub fn tremolo_gain(rate_hz: f64, depth: f64, t: f64) -> f64 {
    1.0 - depth + depth * (2.0 * PI * rate_hz * t).sin()
}

/// Pulse a buffer's amplitude at `rate_hz`
///
/// Every frame is multiplied by `1 - depth + depth * sin(2π·rate·t)`, with
/// `t` measured from the start of the buffer, so the first frame is scaled
/// by exactly `1 - depth`.
pub fn apply_tremolo(buffer: &AudioBuffer, rate_hz: f64, depth: f64) -> AudioBuffer {
    let channels = buffer.channels() as usize;
    let sample_rate = buffer.sample_rate() as f64;

    let samples = buffer
        .samples()
        .chunks_exact(channels)
        .enumerate()
        .flat_map(|(i, frame)| {
            let gain = tremolo_gain(rate_hz, depth, i as f64 / sample_rate);
            frame.iter().map(move |&s| clip_sample(s as f64 * gain))
        })
        .collect();

    buffer.with_samples(samples)
}
