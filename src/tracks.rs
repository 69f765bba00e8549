//! Music track library
//!
//! Lists the loadable tracks in an upload directory. Files that fail to
//! load are skipped.

use std::path::Path;

use log::debug;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::engine::io::TrackLoader;

/// A loadable track and its length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub filename: String,
    pub duration_ms: i64,
    pub duration_seconds: f64,
}

/// List the tracks directly inside `dir`, sorted by file name
///
/// A missing directory yields an empty list.
pub fn list_tracks(dir: &Path, config: &AppConfig, loader: &dyn TrackLoader) -> Vec<TrackInfo> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && config.is_allowed_track(entry.path()))
        .filter_map(|entry| match loader.load(entry.path()) {
            Ok(buffer) => {
                let duration_ms = buffer.duration_ms();
                Some(TrackInfo {
                    filename: entry.file_name().to_string_lossy().into_owned(),
                    duration_ms,
                    duration_seconds: duration_ms as f64 / 1000.0,
                })
            }
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                None
            }
        })
        .collect()
}
