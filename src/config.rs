//! Application configuration
//!
//! Settings for everything around the composer: where tracks and generated
//! signals live, how many generations may run at once, how long finished
//! job records are kept and which converter binary to use.
//!
//! Values come from defaults, then an optional JSON file, then
//! `CONTACT_SIGNAL_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::convert::{extension_of, ConverterConfig};
use crate::error::{ContactError, Result};

/// Environment variable overriding [`AppConfig::upload_dir`]
pub const UPLOAD_DIR_ENV: &str = "CONTACT_SIGNAL_UPLOAD_DIR";
/// Environment variable overriding [`AppConfig::output_dir`]
pub const OUTPUT_DIR_ENV: &str = "CONTACT_SIGNAL_OUTPUT_DIR";
/// Environment variable overriding [`AppConfig::max_active_jobs`]
pub const MAX_JOBS_ENV: &str = "CONTACT_SIGNAL_MAX_JOBS";

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding uploaded music tracks
    pub upload_dir: PathBuf,
    /// Directory receiving generated signals
    pub output_dir: PathBuf,
    /// Maximum number of generations running at once
    pub max_active_jobs: usize,
    /// Seconds a finished job record stays visible
    pub job_ttl_secs: u64,
    /// Signal length when no track is used (ms)
    pub default_duration_ms: i64,
    /// Explicit converter binary; discovered when absent
    pub ffmpeg: Option<PathBuf>,
    /// Track file extensions accepted from the upload directory
    pub allowed_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("source_files"),
            output_dir: PathBuf::from("generated_signals"),
            max_active_jobs: 4,
            job_ttl_secs: 3600,
            default_duration_ms: 10_000,
            ffmpeg: None,
            allowed_extensions: ["mp3", "mp4", "wav", "flac", "m4a"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON configuration file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ContactError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        let config = serde_json::from_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(UPLOAD_DIR_ENV) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(MAX_JOBS_ENV) {
            self.max_active_jobs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ContactError::InvalidParameter {
                        param: MAX_JOBS_ENV.to_string(),
                        value,
                        expected: "a whole number".to_string(),
                    })?;
        }
        Ok(())
    }

    /// Resolve the converter once: the configured binary, or discovery
    pub fn converter(&self) -> ConverterConfig {
        match &self.ffmpeg {
            Some(path) => ConverterConfig::with_ffmpeg(path),
            None => ConverterConfig::discover(),
        }
    }

    /// Check a track file name against the allowed extensions
    pub fn is_allowed_track(&self, path: &Path) -> bool {
        let ext = extension_of(path);
        !ext.is_empty() && self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("source_files"));
        assert_eq!(config.output_dir, PathBuf::from("generated_signals"));
        assert_eq!(config.max_active_jobs, 4);
        assert_eq!(config.default_duration_ms, 10_000);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_active_jobs": 1, "ffmpeg": "/opt/ffmpeg"}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.max_active_jobs, 1);
        assert_eq!(config.ffmpeg, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(config.job_ttl_secs, 3600);
        assert_eq!(
            config.converter().ffmpeg(),
            Some(Path::new("/opt/ffmpeg"))
        );
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [(OUTPUT_DIR_ENV, "/tmp/out"), (MAX_JOBS_ENV, "2")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.max_active_jobs, 2);
        assert_eq!(config.upload_dir, PathBuf::from("source_files"));
    }

    #[test]
    fn test_bad_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == MAX_JOBS_ENV).then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_allowed_tracks() {
        let config = AppConfig::default();
        assert!(config.is_allowed_track(Path::new("song.MP3")));
        assert!(config.is_allowed_track(Path::new("dir/clip.m4a")));
        assert!(!config.is_allowed_track(Path::new("notes.txt")));
        assert!(!config.is_allowed_track(Path::new("wav")));
    }
}
