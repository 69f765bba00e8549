//! Preset signal configurations
//!
//! A fixed table of named presets. Lookups for unknown names fall back to
//! [`DEFAULT_PRESET`].

use serde::{Deserialize, Serialize};

use crate::signal::config::SignalConfig;

/// Key of the preset returned for unknown names
pub const DEFAULT_PRESET: &str = "original_uap";

/// A named, described signal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Configuration applied by this preset
    pub config: SignalConfig,
}

fn preset(name: &str, description: &str, config: SignalConfig) -> Preset {
    Preset {
        name: name.to_string(),
        description: description.to_string(),
        config,
    }
}

/// All presets keyed by identifier, in display order
pub fn all_presets() -> Vec<(&'static str, Preset)> {
    let base = SignalConfig {
        use_music_modulation: false,
        use_music_as_foundation: false,
        use_tremolo: true,
        tremolo_depth: 0.5,
        ..SignalConfig::default()
    };

    vec![
        (
            "original_uap",
            preset(
                "Original UAP Dog Whistle",
                "Based on the original UAP Dog Whistle project with Schumann resonance",
                base.clone(),
            ),
        ),
        (
            "music_enhanced",
            preset(
                "Music Enhanced Signal",
                "Combines music modulation with Schumann tremolo for intelligent signaling",
                SignalConfig {
                    use_music_modulation: true,
                    ..base.clone()
                },
            ),
        ),
        (
            "harmonic_focus",
            preset(
                "Harmonic Focus",
                "Emphasizes Solfeggio frequencies (528 Hz, 432 Hz) with subtle modulation",
                SignalConfig {
                    use_music_modulation: true,
                    tremolo_depth: 0.3,
                    ..base.clone()
                },
            ),
        ),
        (
            "earth_heartbeat",
            preset(
                "Earth Heartbeat",
                "Strong Schumann resonance with deep tremolo pulsing",
                SignalConfig {
                    tremolo_depth: 0.7,
                    ..base.clone()
                },
            ),
        ),
        (
            "pure_carriers",
            preset(
                "Pure Carrier Waves",
                "Unmodulated carrier frequencies for maximum clarity",
                SignalConfig {
                    use_tremolo: false,
                    tremolo_depth: 0.0,
                    ..base.clone()
                },
            ),
        ),
        (
            "biological_mimic",
            preset(
                "Biological Mimic",
                "Maximum organic 'alive' quality with music and tremolo",
                SignalConfig {
                    use_music_modulation: true,
                    tremolo_depth: 0.6,
                    ..base
                },
            ),
        ),
    ]
}

/// Identifiers of every preset, in display order
pub fn preset_names() -> Vec<&'static str> {
    all_presets().into_iter().map(|(key, _)| key).collect()
}

/// Look up a preset by identifier
pub fn find_preset(key: &str) -> Option<Preset> {
    all_presets()
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, preset)| preset)
}

/// Look up a preset, falling back to [`DEFAULT_PRESET`]
pub fn get_preset(key: &str) -> Preset {
    find_preset(key)
        .or_else(|| find_preset(DEFAULT_PRESET))
        .unwrap_or_else(|| preset("Default", "Default configuration", SignalConfig::default()))
}

/// The preset table as a JSON object keyed by identifier
pub fn presets_json() -> serde_json::Value {
    let map = all_presets()
        .into_iter()
        .map(|(key, preset)| {
            let value = serde_json::to_value(preset).unwrap_or(serde_json::Value::Null);
            (key.to_string(), value)
        })
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}
