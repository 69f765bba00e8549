//! External converter configuration
//!
//! Non-WAV containers (MP3, FLAC, OGG, M4A, MP4) are decoded and encoded by
//! an external `ffmpeg` binary. Its location is resolved once at startup and
//! handed explicitly to whatever needs it; nothing here is process-global.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::error::{ContactError, Result};

/// Environment variable that pins the converter binary
pub const FFMPEG_ENV_VAR: &str = "CONTACT_SIGNAL_FFMPEG";

/// Location of the external audio converter, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterConfig {
    ffmpeg: Option<PathBuf>,
}

impl ConverterConfig {
    /// Configuration without a converter (WAV only)
    pub fn none() -> Self {
        Self { ffmpeg: None }
    }

    /// Use an explicit converter binary
    pub fn with_ffmpeg(path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: Some(path.into()),
        }
    }

    /// Resolve the converter from the environment
    ///
    /// Checks `CONTACT_SIGNAL_FFMPEG` first, then searches `PATH` for
    /// `ffmpeg`. Returns a WAV-only configuration when neither is found.
    pub fn discover() -> Self {
        if let Some(path) = env::var_os(FFMPEG_ENV_VAR).map(PathBuf::from) {
            if path.is_file() {
                debug!("Using converter from {}: {}", FFMPEG_ENV_VAR, path.display());
                return Self::with_ffmpeg(path);
            }
            warn!(
                "{} points to {}, which is not a file; ignoring",
                FFMPEG_ENV_VAR,
                path.display()
            );
        }

        match find_on_path("ffmpeg") {
            Some(path) => {
                debug!("Found converter on PATH: {}", path.display());
                Self::with_ffmpeg(path)
            }
            None => {
                debug!("No converter found; only WAV is supported");
                Self::none()
            }
        }
    }

    /// Path to the converter binary, if configured
    pub fn ffmpeg(&self) -> Option<&Path> {
        self.ffmpeg.as_deref()
    }

    /// Check if a converter is configured
    pub fn is_available(&self) -> bool {
        self.ffmpeg.is_some()
    }

    /// Transcode `input` into `output`; the container follows `output`'s extension
    ///
    /// # Errors
    /// * `ConverterUnavailable` - no converter configured
    /// * `ConverterFailed` - the converter exited unsuccessfully
    pub fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        let ffmpeg = self
            .ffmpeg
            .as_deref()
            .ok_or_else(|| ContactError::ConverterUnavailable {
                format: extension_of(output),
            })?;

        debug!("Transcoding {} -> {}", input.display(), output.display());
        let result = Command::new(ffmpeg)
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(input)
            .arg(output)
            .output()
            .map_err(|e| ContactError::ConverterFailed {
                reason: format!("could not run {}: {}", ffmpeg.display(), e),
            })?;

        if !result.status.success() {
            return Err(ContactError::ConverterFailed {
                reason: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Lower-cased file extension, or an empty string
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .flat_map(|dir| {
            let plain = dir.join(binary);
            let exe = dir.join(format!("{}.exe", binary));
            [plain, exe]
        })
        .find(|candidate| candidate.is_file())
}
