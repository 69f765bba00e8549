//! Signal configuration
//!
//! The named parameters that drive one composition. Any combination is
//! accepted by the composer; [`SignalConfig::validate`] is an optional
//! stricter check used by the CLI and the job registry.

use serde::{Deserialize, Serialize};

use crate::error::{ContactError, Result};

/// Parameters for one contact-signal composition
///
/// Fields missing from serialized input take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Synthetic foundation tone (Hz)
    pub base_tone_freq: f64,
    /// Low-frequency carrier; also the tremolo rate for every pulsed layer (Hz)
    pub schumann_freq: f64,
    /// First enhancement tone (Hz)
    pub dna_repair_freq: f64,
    /// High-frequency ping burst (Hz)
    pub ultrasonic_freq: f64,
    /// Mid-frequency chirp burst (Hz)
    pub chirp_freq: f64,
    /// Second enhancement tone (Hz)
    pub ambient_freq: f64,
    /// Let the track amplitude-modulate the enhancement tones
    pub use_music_modulation: bool,
    /// Use the track itself as the foundation carrier
    pub use_music_as_foundation: bool,
    /// Pulse the low-frequency carrier, chirps and breath layer
    pub use_tremolo: bool,
    /// Tremolo depth for the chirp burst (0.0 to 1.0)
    pub tremolo_depth: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            base_tone_freq: 100.0,
            schumann_freq: 7.83,
            dna_repair_freq: 528.0,
            ultrasonic_freq: 17000.0,
            chirp_freq: 2500.0,
            ambient_freq: 432.0,
            use_music_modulation: true,
            use_music_as_foundation: false,
            use_tremolo: true,
            tremolo_depth: 0.5,
        }
    }
}

impl SignalConfig {
    /// Parse a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Named frequency fields, in declaration order
    pub fn frequencies(&self) -> [(&'static str, f64); 6] {
        [
            ("base_tone_freq", self.base_tone_freq),
            ("schumann_freq", self.schumann_freq),
            ("dna_repair_freq", self.dna_repair_freq),
            ("ultrasonic_freq", self.ultrasonic_freq),
            ("chirp_freq", self.chirp_freq),
            ("ambient_freq", self.ambient_freq),
        ]
    }

    /// Check parameter ranges
    ///
    /// Frequencies must be finite and strictly positive; `tremolo_depth`
    /// must lie in `[0.0, 1.0]`. Frequencies above Nyquist are allowed.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.frequencies() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ContactError::InvalidParameter {
                    param: name.to_string(),
                    value: value.to_string(),
                    expected: "a positive frequency in Hz".to_string(),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.tremolo_depth) {
            return Err(ContactError::InvalidParameter {
                param: "tremolo_depth".to_string(),
                value: self.tremolo_depth.to_string(),
                expected: "0.0 to 1.0".to_string(),
            });
        }

        Ok(())
    }
}
