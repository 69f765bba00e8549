//! Descriptive metadata for a composed signal

use serde::{Deserialize, Serialize};

use crate::signal::config::SignalConfig;

pub const MUSIC_BASE: &str = "music_base";
pub const BASE_TONE: &str = "base_tone";
pub const SCHUMANN_CARRIER: &str = "schumann_carrier";
pub const DNA_REPAIR_TONE: &str = "dna_repair_tone";
pub const AMBIENT_PAD: &str = "ambient_pad";
pub const CHIRPS: &str = "chirps";
pub const ULTRASONIC_PING: &str = "ultrasonic_ping";
pub const BREATH_LAYER: &str = "breath_layer";

/// Named layers present in each category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layers {
    pub foundation: Vec<String>,
    pub human_enhancement: Vec<String>,
    pub attention: Vec<String>,
    pub life_indicator: Vec<String>,
}

/// Modulation options that were actually in effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modulation {
    pub music_modulation: bool,
    pub music_as_foundation: bool,
    pub tremolo: bool,
    pub tremolo_rate: f64,
}

/// Read-only description of one composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub duration_ms: i64,
    pub layers: Layers,
    pub modulation: Modulation,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Metadata {
    /// Describe a composition of `duration_ms` built from `config`
    ///
    /// Music-dependent flags are only set when a track was actually loaded.
    pub fn describe(config: &SignalConfig, track_loaded: bool, duration_ms: i64) -> Self {
        let music_foundation = config.use_music_as_foundation && track_loaded;
        let foundation = if music_foundation {
            names(&[MUSIC_BASE, SCHUMANN_CARRIER])
        } else {
            names(&[BASE_TONE, SCHUMANN_CARRIER])
        };

        Self {
            duration_ms,
            layers: Layers {
                foundation,
                human_enhancement: names(&[DNA_REPAIR_TONE, AMBIENT_PAD]),
                attention: names(&[CHIRPS, ULTRASONIC_PING]),
                life_indicator: names(&[BREATH_LAYER]),
            },
            modulation: Modulation {
                music_modulation: config.use_music_modulation && track_loaded,
                music_as_foundation: music_foundation,
                tremolo: config.use_tremolo,
                tremolo_rate: config.schumann_freq,
            },
        }
    }
}
