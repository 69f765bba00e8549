//! Signal Processing Primitives
//!
//! Generators, filters and modulators used to build each layer of a
//! contact signal. Every operation takes buffers by reference and returns a
//! new buffer.

mod filter;
mod generators;
mod modulation;

pub use filter::low_pass_filter;
pub use generators::{sine_tone, white_noise, white_noise_with_rng};
pub use modulation::{
    apply_amplitude_modulation, apply_tremolo, tremolo_gain, FLAT_MODULATOR_SCALE,
};
