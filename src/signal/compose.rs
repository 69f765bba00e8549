//! Layered signal composition
//!
//! Builds a contact signal in three strictly sequential stages and mixes
//! the layers in a fixed order:
//!
//! 1. Foundation: base carrier (tone or track) plus a low-frequency carrier
//! 2. Enhancement: two mid-frequency tones, optionally music-modulated
//! 3. Attention and life indicator: tiled chirps and pings, filtered noise
//!
//! When a track is supplied and loads, its duration replaces the requested
//! one for every layer.

use std::path::Path;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dsp::{
    apply_amplitude_modulation, apply_tremolo, low_pass_filter, sine_tone, white_noise_with_rng,
};
use crate::engine::buffer::AudioBuffer;
use crate::engine::io::{AudioLoader, TrackLoader};
use crate::error::Result;
use crate::signal::config::SignalConfig;
use crate::signal::metadata::Metadata;
use crate::signal::progress::{notify, ProgressSink};
use crate::signal::tiling::tile_bursts;

// ============================================================================
// Layer constants
// ============================================================================

/// Gain of the track when it is the foundation or the final overlay (dB)
pub const MUSIC_GAIN_DB: f64 = -3.0;
/// Synthetic foundation tone gain (dB)
pub const BASE_TONE_GAIN_DB: f64 = -6.0;
/// Low-frequency carrier gain under a synthetic foundation (dB)
pub const CARRIER_GAIN_DB: f64 = -12.0;
/// Low-frequency carrier gain under a music foundation (dB)
pub const CARRIER_UNDER_MUSIC_GAIN_DB: f64 = -18.0;
/// Enhancement tone gain (dB)
pub const ENHANCEMENT_GAIN_DB: f64 = -9.0;
/// Chirp and ping burst gain (dB)
pub const BURST_GAIN_DB: f64 = -3.0;
/// Breath layer gain after filtering (dB)
pub const BREATH_GAIN_DB: f64 = -18.0;

/// Fixed tremolo depth on the low-frequency carrier
pub const CARRIER_TREMOLO_DEPTH: f64 = 0.3;
/// Fixed tremolo depth on the breath layer
pub const BREATH_TREMOLO_DEPTH: f64 = 0.4;

/// Chirp burst length (ms)
pub const CHIRP_MS: i64 = 300;
/// Chirp repeat interval (ms)
pub const CHIRP_INTERVAL_MS: i64 = 2000;
/// Ultrasonic ping length (ms)
pub const PING_MS: i64 = 500;
/// Ultrasonic ping repeat interval (ms)
pub const PING_INTERVAL_MS: i64 = 3500;
/// Breath layer low-pass cutoff (Hz)
pub const BREATH_CUTOFF_HZ: f64 = 300.0;

// ============================================================================
// Composer
// ============================================================================

/// Composes contact signals, loading optional tracks through `L`
///
/// Holds no state between calls; one composer can serve any number of
/// threads when its loader allows it.
#[derive(Debug, Clone, Default)]
pub struct SignalComposer<L = AudioLoader> {
    loader: L,
    seed: Option<u64>,
}

struct Foundation {
    base: AudioBuffer,
    carrier: AudioBuffer,
}

struct Enhancement {
    dna_repair: AudioBuffer,
    ambient: AudioBuffer,
}

struct Attention {
    chirps: AudioBuffer,
    pings: AudioBuffer,
}

impl<L: TrackLoader> SignalComposer<L> {
    /// Create a composer that loads tracks with `loader`
    pub fn new(loader: L) -> Self {
        Self { loader, seed: None }
    }

    /// Seed the breath-layer noise so output is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The loader used for tracks
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Compose one signal
    ///
    /// # Arguments
    /// * `track` - Optional music track; unloadable paths are treated as absent
    /// * `duration_ms` - Signal length when no track is used
    /// * `config` - Layer parameters
    /// * `progress` - Optional checkpoint receiver
    ///
    /// # Returns
    /// The mixed buffer and a description of its layers
    pub fn generate(
        &self,
        track: Option<&Path>,
        duration_ms: i64,
        config: &SignalConfig,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(AudioBuffer, Metadata)> {
        notify(progress, 5, "Loading music file...");
        let music = track.and_then(|path| self.load_track(path));
        let duration = music.as_ref().map_or(duration_ms, AudioBuffer::duration_ms);
        debug!("Composing {} ms signal (track: {})", duration, music.is_some());

        notify(progress, 15, "Generating foundation layers...");
        let foundation = foundation_stage(config, music.as_ref(), duration);

        notify(progress, 30, "Creating human enhancement layers...");
        let enhancement = enhancement_stage(config, music.as_ref(), duration, progress)?;

        notify(progress, 60, "Generating attention signals...");
        let attention = attention_stage(config, duration)?;

        notify(progress, 70, "Creating life indicator layer...");
        let breath = self.life_indicator_stage(config, duration);

        notify(progress, 80, "Mixing all signal layers...");
        let mut signal = foundation.base.overlay(&foundation.carrier, 0)?;
        for layer in [
            &enhancement.dna_repair,
            &enhancement.ambient,
            &breath,
            &attention.chirps,
            &attention.pings,
        ] {
            signal = signal.overlay(layer, 0)?;
        }

        if let Some(music) = music.as_ref() {
            if !config.use_music_as_foundation {
                signal = signal.overlay(&music.apply_gain(MUSIC_GAIN_DB), 0)?;
            }
        }

        notify(progress, 95, "Finalizing signal...");
        let metadata = Metadata::describe(config, music.is_some(), duration);

        info!(
            "Composed {} ms contact signal ({} Hz, {} ch)",
            signal.duration_ms(),
            signal.sample_rate(),
            signal.channels()
        );
        Ok((signal, metadata))
    }

    fn load_track(&self, path: &Path) -> Option<AudioBuffer> {
        match self.loader.load(path) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                warn!("Ignoring track {}: {}", path.display(), e);
                None
            }
        }
    }

    fn life_indicator_stage(&self, config: &SignalConfig, duration: i64) -> AudioBuffer {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let noise = white_noise_with_rng(duration, 0.0, &mut rng);
        let breath = low_pass_filter(&noise, BREATH_CUTOFF_HZ).apply_gain(BREATH_GAIN_DB);

        if config.use_tremolo {
            apply_tremolo(&breath, config.schumann_freq, BREATH_TREMOLO_DEPTH)
        } else {
            breath
        }
    }
}

fn foundation_stage(
    config: &SignalConfig,
    music: Option<&AudioBuffer>,
    duration: i64,
) -> Foundation {
    let (base, carrier) = match music {
        Some(music) if config.use_music_as_foundation => (
            music.apply_gain(MUSIC_GAIN_DB),
            sine_tone(config.schumann_freq, duration, CARRIER_UNDER_MUSIC_GAIN_DB),
        ),
        _ => (
            sine_tone(config.base_tone_freq, duration, BASE_TONE_GAIN_DB),
            sine_tone(config.schumann_freq, duration, CARRIER_GAIN_DB),
        ),
    };

    // The carrier always pulses at its own frequency with a fixed depth
    let carrier = if config.use_tremolo {
        apply_tremolo(&carrier, config.schumann_freq, CARRIER_TREMOLO_DEPTH)
    } else {
        carrier
    };

    Foundation { base, carrier }
}

fn enhancement_stage(
    config: &SignalConfig,
    music: Option<&AudioBuffer>,
    duration: i64,
    progress: Option<&dyn ProgressSink>,
) -> Result<Enhancement> {
    let dna_repair = sine_tone(config.dna_repair_freq, duration, ENHANCEMENT_GAIN_DB);
    let ambient = sine_tone(config.ambient_freq, duration, ENHANCEMENT_GAIN_DB);

    match music {
        Some(music) if config.use_music_modulation => {
            notify(progress, 45, "Applying music modulation...");
            Ok(Enhancement {
                dna_repair: apply_amplitude_modulation(&dna_repair, music)?,
                ambient: apply_amplitude_modulation(&ambient, music)?,
            })
        }
        _ => Ok(Enhancement {
            dna_repair,
            ambient,
        }),
    }
}

fn attention_stage(config: &SignalConfig, duration: i64) -> Result<Attention> {
    let ping = sine_tone(config.ultrasonic_freq, PING_MS, BURST_GAIN_DB);
    let chirp = sine_tone(config.chirp_freq, CHIRP_MS, BURST_GAIN_DB);

    // Only the chirp follows the configured depth
    let chirp = if config.use_tremolo {
        apply_tremolo(&chirp, config.schumann_freq, config.tremolo_depth)
    } else {
        chirp
    };

    Ok(Attention {
        chirps: tile_bursts(&chirp, duration, CHIRP_INTERVAL_MS, 0)?,
        pings: tile_bursts(&ping, duration, PING_INTERVAL_MS, PING_MS)?,
    })
}

/// Compose a signal with the default WAV loader
///
/// See [`SignalComposer::generate`].
pub fn generate(
    track: Option<&Path>,
    duration_ms: i64,
    config: &SignalConfig,
    progress: Option<&dyn ProgressSink>,
) -> Result<(AudioBuffer, Metadata)> {
    SignalComposer::new(AudioLoader::default()).generate(track, duration_ms, config, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::GENERATOR_SAMPLE_RATE;
    use crate::error::ContactError;
    use crate::signal::progress::ProgressLog;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Loader that serves a fixed buffer and records requested paths
    struct FixedLoader {
        track: Option<AudioBuffer>,
        requested: Mutex<Vec<PathBuf>>,
    }

    impl FixedLoader {
        fn serving(track: Option<AudioBuffer>) -> Self {
            Self {
                track,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl TrackLoader for FixedLoader {
        fn load(&self, path: &Path) -> Result<AudioBuffer> {
            self.requested.lock().unwrap().push(path.to_path_buf());
            self.track.clone().ok_or_else(|| ContactError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            })
        }
    }

    fn quiet_config() -> SignalConfig {
        SignalConfig {
            use_tremolo: false,
            use_music_modulation: false,
            ..SignalConfig::default()
        }
    }

    #[test]
    fn test_length_follows_requested_duration() {
        let composer = SignalComposer::new(FixedLoader::serving(None)).with_seed(1);
        let (signal, meta) = composer
            .generate(None, 2500, &SignalConfig::default(), None)
            .unwrap();
        assert_eq!(signal.duration_ms(), 2500);
        assert_eq!(signal.sample_rate(), GENERATOR_SAMPLE_RATE);
        assert_eq!(signal.channels(), 1);
        assert_eq!(meta.duration_ms, 2500);
        assert!(composer.loader().requested.lock().unwrap().is_empty());
    }

    #[test]
    fn test_track_duration_overrides_request() {
        let track = sine_tone(220.0, 1500, -6.0);
        let composer = SignalComposer::new(FixedLoader::serving(Some(track))).with_seed(1);
        let (signal, meta) = composer
            .generate(Some(Path::new("song.wav")), 9000, &SignalConfig::default(), None)
            .unwrap();
        assert_eq!(signal.duration_ms(), 1500);
        assert_eq!(meta.duration_ms, 1500);
        assert!(meta.modulation.music_modulation);
    }

    #[test]
    fn test_failed_load_falls_back() {
        let composer = SignalComposer::new(FixedLoader::serving(None)).with_seed(3);
        let config = SignalConfig::default();
        let (with_path, meta_path) = composer
            .generate(Some(Path::new("missing.wav")), 1000, &config, None)
            .unwrap();
        let (without, meta_none) = composer.generate(None, 1000, &config, None).unwrap();

        assert_eq!(with_path, without);
        assert_eq!(meta_path, meta_none);
        assert!(!meta_path.modulation.music_modulation);
        assert_eq!(composer.loader().requested.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let composer = SignalComposer::new(FixedLoader::serving(None)).with_seed(42);
        let a = composer.generate(None, 800, &SignalConfig::default(), None).unwrap();
        let b = composer.generate(None, 800, &SignalConfig::default(), None).unwrap();
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn test_music_foundation_uses_track_format() {
        let stereo = AudioBuffer::silent(1200, 48000, 2).overlay(&sine_tone(330.0, 1200, -6.0), 0);
        let composer =
            SignalComposer::new(FixedLoader::serving(Some(stereo.unwrap()))).with_seed(5);
        let config = SignalConfig {
            use_music_as_foundation: true,
            ..SignalConfig::default()
        };

        let (signal, meta) = composer
            .generate(Some(Path::new("song.wav")), 10000, &config, None)
            .unwrap();

        assert_eq!(signal.sample_rate(), 48000);
        assert_eq!(signal.channels(), 2);
        assert_eq!(signal.duration_ms(), 1200);
        assert_eq!(meta.layers.foundation, vec!["music_base", "schumann_carrier"]);
        assert!(meta.modulation.music_as_foundation);
    }

    #[test]
    fn test_progress_checkpoints() {
        let log = ProgressLog::new();
        let composer = SignalComposer::new(FixedLoader::serving(None)).with_seed(1);
        composer
            .generate(None, 500, &SignalConfig::default(), Some(&log))
            .unwrap();
        assert_eq!(log.percents(), vec![5, 15, 30, 60, 70, 80, 95]);
    }

    #[test]
    fn test_progress_includes_modulation_step_with_track() {
        let log = ProgressLog::new();
        let track = sine_tone(220.0, 600, -6.0);
        let composer = SignalComposer::new(FixedLoader::serving(Some(track))).with_seed(1);
        composer
            .generate(Some(Path::new("t.wav")), 500, &SignalConfig::default(), Some(&log))
            .unwrap();

        let percents = log.percents();
        assert_eq!(percents, vec![5, 15, 30, 45, 60, 70, 80, 95]);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_zero_duration_yields_empty_signal() {
        let composer = SignalComposer::new(FixedLoader::serving(None));
        let (signal, meta) = composer.generate(None, 0, &quiet_config(), None).unwrap();
        assert!(signal.is_empty());
        assert_eq!(meta.duration_ms, 0);
    }

    #[test]
    fn test_layers_are_audible() {
        let composer = SignalComposer::new(FixedLoader::serving(None)).with_seed(9);
        let (signal, _) = composer.generate(None, 1000, &quiet_config(), None).unwrap();
        assert!(signal.peak() > 10000);
    }

    #[test]
    fn test_chirp_stage_uses_configured_depth() {
        let config = SignalConfig {
            tremolo_depth: 1.0,
            ..SignalConfig::default()
        };
        let attention = attention_stage(&config, 1000).unwrap();
        // Full depth starts the chirp envelope at zero
        assert_eq!(attention.chirps.samples()[0], 0);
        assert_eq!(attention.chirps.num_frames(), 44100);
        // The chirp ends at 300 ms; the next one would start at 2000 ms
        let tail = attention.chirps.slice_frames(13230, 44100);
        assert_eq!(tail.peak(), 0);
    }

    #[test]
    fn test_carrier_depth_is_fixed() {
        let shallow = SignalConfig {
            tremolo_depth: 0.0,
            ..SignalConfig::default()
        };
        let deep = SignalConfig {
            tremolo_depth: 1.0,
            ..SignalConfig::default()
        };
        let a = foundation_stage(&shallow, None, 500);
        let b = foundation_stage(&deep, None, 500);
        assert_eq!(a.carrier, b.carrier);
    }
}
