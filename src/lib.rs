//! Contact Signal - Layered Audio Signal Generator
//!
//! Composes a "contact signal" from synthesized layers: a base tone, a
//! low-frequency carrier, two enhancement tones, tiled chirp and ping bursts,
//! and a filtered-noise breath layer. An optional music track can serve as
//! the foundation, modulate the enhancement tones, or simply be mixed in.
//!
//! # Architecture
//!
//! - `engine`: sample buffers, file I/O, the external converter
//! - `dsp`: generators, low-pass filter, amplitude modulation and tremolo
//! - `signal`: configuration, presets and the staged composer
//! - `jobs`: background generations with progress and expiry
//!
//! ```no_run
//! use contact_signal::{generate, SignalConfig};
//!
//! let (signal, metadata) = generate(None, 10_000, &SignalConfig::default(), None)?;
//! assert_eq!(metadata.duration_ms, signal.duration_ms());
//! # Ok::<(), contact_signal::ContactError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod signal;
pub mod tracks;

pub use engine::AudioBuffer;
pub use error::{ContactError, Result};
pub use signal::{generate, Metadata, SignalConfig};
