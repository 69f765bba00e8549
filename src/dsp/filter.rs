//! Low-pass filtering
//!
//! A single-pole RC low-pass, run independently on each channel. Used to
//! turn white noise into a soft low rumble.

use std::f64::consts::PI;

use crate::engine::buffer::{clip_sample, AudioBuffer};

/// One-pole filter state for a single channel
#[derive(Debug, Clone, Copy, Default)]
struct OnePoleState {
    last: f64,
}

impl OnePoleState {
    /// y[n] = y[n-1] + alpha * (x[n] - y[n-1])
    #[inline]
    fn process(&mut self, input: f64, alpha: f64) -> f64 {
        self.last += alpha * (input - self.last);
        self.last
    }
}

/// Smoothing coefficient for a cutoff at a given sample rate
fn rc_alpha(cutoff_hz: f64, sample_rate: u32) -> f64 {
    let rc = 1.0 / (cutoff_hz * 2.0 * PI);
    let dt = 1.0 / sample_rate as f64;
    dt / (rc + dt)
}

/// Attenuate content above `cutoff_hz`
///
/// The first frame passes through unchanged and seeds each channel's state.
pub fn low_pass_filter(buffer: &AudioBuffer, cutoff_hz: f64) -> AudioBuffer {
    let channels = buffer.channels() as usize;
    let alpha = rc_alpha(cutoff_hz, buffer.sample_rate());
    let input = buffer.samples();

    let mut states: Vec<OnePoleState> = input
        .iter()
        .take(channels)
        .map(|&s| OnePoleState { last: s as f64 })
        .collect();

    let mut output = Vec::with_capacity(input.len());
    output.extend_from_slice(&input[..states.len()]);

    for frame in input.chunks_exact(channels).skip(1) {
        for (state, &sample) in states.iter_mut().zip(frame) {
            output.push(clip_sample(state.process(sample as f64, alpha)));
        }
    }

    buffer.with_samples(output)
}
