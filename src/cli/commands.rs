//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::json;

use crate::config::AppConfig;
use crate::engine::io::{export_audio, load_audio, AudioLoader, ExportFormat};
use crate::engine::waveform::waveform_data;
use crate::error::{ContactError, Result};
use crate::jobs::{check_duration, output_file_name};
use crate::signal::compose::SignalComposer;
use crate::signal::config::SignalConfig;
use crate::signal::presets::{find_preset, get_preset, presets_json, DEFAULT_PRESET};
use crate::tracks::list_tracks;

/// Options for [`generate`]
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub preset: String,
    pub config_json: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub duration_ms: Option<i64>,
    pub output: Option<PathBuf>,
    pub format: ExportFormat,
    pub seed: Option<u64>,
}

/// Generate a signal, export it and print its metadata.
pub fn generate(app: &AppConfig, options: GenerateOptions) -> Result<()> {
    let (label, config) = resolve_signal_config(&options)?;
    config.validate()?;

    let converter = app.converter();
    let mut composer = SignalComposer::new(AudioLoader::new(converter.clone()));
    if let Some(seed) = options.seed {
        composer = composer.with_seed(seed);
    }

    let track = options.music.as_deref().map(|path| resolve_track(app, path));
    let duration_ms = options.duration_ms.unwrap_or(app.default_duration_ms);
    check_duration(duration_ms)?;
    info!(
        "Generating '{}' signal ({} ms, track: {})",
        label,
        duration_ms,
        track
            .as_deref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string())
    );

    let progress = |percent: u8, message: &str| info!("[{:>3}%] {}", percent, message);
    let (signal, metadata) =
        composer.generate(track.as_deref(), duration_ms, &config, Some(&progress))?;

    let output = options
        .output
        .unwrap_or_else(|| app.output_dir.join(output_file_name(&label, options.format)));
    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    export_audio(&signal, &output, options.format, &converter)?;
    info!("Signal written to {}", output.display());

    let report = json!({
        "output": output,
        "metadata": metadata,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Pick the configuration: an explicit JSON file wins over the preset.
fn resolve_signal_config(options: &GenerateOptions) -> Result<(String, SignalConfig)> {
    if let Some(path) = &options.config_json {
        let text = fs::read_to_string(path).map_err(|e| ContactError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        return Ok(("custom".to_string(), SignalConfig::from_json(&text)?));
    }

    if find_preset(&options.preset).is_none() {
        warn!(
            "Unknown preset '{}', using '{}'",
            options.preset, DEFAULT_PRESET
        );
        return Ok((DEFAULT_PRESET.to_string(), get_preset(DEFAULT_PRESET).config));
    }
    Ok((options.preset.clone(), get_preset(&options.preset).config))
}

/// Bare file names are looked up in the upload directory first.
fn resolve_track(app: &AppConfig, path: &Path) -> PathBuf {
    if !path.exists() && path.components().count() == 1 {
        let uploaded = app.upload_dir.join(path);
        if uploaded.is_file() {
            return uploaded;
        }
    }
    path.to_path_buf()
}

/// Print every preset as JSON.
pub fn presets() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&presets_json())?);
    Ok(())
}

/// Print one preset as JSON; unknown names fall back to the default.
pub fn preset(name: &str) -> Result<()> {
    if find_preset(name).is_none() {
        warn!("Unknown preset '{}', showing '{}'", name, DEFAULT_PRESET);
    }
    println!("{}", serde_json::to_string_pretty(&get_preset(name))?);
    Ok(())
}

/// Print a normalised waveform of an audio file as JSON.
pub fn waveform(app: &AppConfig, file: &Path, points: usize) -> Result<()> {
    if points == 0 {
        return Err(ContactError::InvalidParameter {
            param: "points".to_string(),
            value: points.to_string(),
            expected: "at least 1".to_string(),
        });
    }

    let buffer = load_audio(file, &app.converter())?;
    let data = waveform_data(&buffer, points);
    info!("Sampled {} waveform points from {}", data.len(), file.display());

    println!("{}", serde_json::to_string(&data)?);
    Ok(())
}

/// Show duration and format of an audio file.
pub fn info(app: &AppConfig, file: &Path) -> Result<()> {
    let buffer = load_audio(file, &app.converter())?;

    println!("File: {}", file.display());
    println!(
        "Duration: {} ms ({:.2} s)",
        buffer.duration_ms(),
        buffer.duration_ms() as f64 / 1000.0
    );
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Channels: {}", buffer.channels());
    println!("Frames: {}", buffer.num_frames());

    Ok(())
}

/// List loadable tracks with their durations.
pub fn tracks(app: &AppConfig, dir: Option<&Path>) -> Result<()> {
    let dir = dir.unwrap_or(&app.upload_dir);
    let loader = AudioLoader::new(app.converter());
    let tracks = list_tracks(dir, app, &loader);

    if tracks.is_empty() {
        println!("No tracks found in {}", dir.display());
        return Ok(());
    }

    println!("Tracks in {}:", dir.display());
    println!("{:-<60}", "");
    for track in &tracks {
        println!("{:<48} {:>9.2} s", track.filename, track.duration_seconds);
    }
    println!("{:-<60}", "");
    println!("{} track(s)", tracks.len());

    Ok(())
}
