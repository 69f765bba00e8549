//! Contact Signal Composition
//!
//! Configuration, presets and the layered composer that turns a
//! [`SignalConfig`] (and optionally a music track) into one mixed buffer.

pub mod compose;
pub mod config;
pub mod metadata;
pub mod presets;
pub mod progress;
pub mod tiling;

pub use compose::{generate, SignalComposer};
pub use config::SignalConfig;
pub use metadata::{Layers, Metadata, Modulation};
pub use presets::{
    all_presets, find_preset, get_preset, preset_names, presets_json, Preset, DEFAULT_PRESET,
};
pub use progress::{ProgressLog, ProgressSink};
pub use tiling::{burst_positions, tile_bursts};
