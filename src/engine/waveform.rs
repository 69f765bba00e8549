//! Waveform extraction for visualisation
//!
//! Produces a short, normalised preview of a buffer's interleaved samples
//! suitable for drawing in a UI.

use crate::engine::buffer::AudioBuffer;

/// Default number of preview points
pub const DEFAULT_WAVEFORM_POINTS: usize = 1000;

/// Downsample and normalise a buffer for display
///
/// Takes every `step`-th interleaved sample, where `step` is
/// `max(1, len / points)`, then divides by the largest magnitude among the
/// kept samples so the result lies in `[-1, 1]`. A constant preview is
/// returned unscaled.
pub fn waveform_data(buffer: &AudioBuffer, points: usize) -> Vec<f32> {
    let samples = buffer.samples();
    let step = (samples.len() / points.max(1)).max(1);
    let kept: Vec<i16> = samples.iter().step_by(step).copied().collect();

    let (min, max) = match (kept.iter().min(), kept.iter().max()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => return Vec::new(),
    };

    if min == max {
        return kept.iter().map(|&s| s as f32).collect();
    }

    let scale = (max as f32).abs().max((min as f32).abs());
    kept.iter().map(|&s| s as f32 / scale).collect()
}
