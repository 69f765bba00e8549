//! Background generation jobs
//!
//! Each accepted request runs on its own worker thread. The worker is the
//! only writer of that job's [`JobRecord`]; any number of readers may poll
//! it through [`JobRegistry::status`]. Requests beyond the active-job limit
//! are rejected, not queued. Finished records disappear once their TTL has
//! passed, after which lookups report "not found".

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::convert::ConverterConfig;
use crate::engine::io::{export_audio, AudioLoader, ExportFormat, TrackLoader};
use crate::error::{ContactError, Result};
use crate::signal::compose::SignalComposer;
use crate::signal::config::SignalConfig;
use crate::signal::metadata::Metadata;

/// Longest signal a job may request (one hour, in ms)
pub const MAX_JOB_DURATION_MS: i64 = 60 * 60 * 1000;

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Observable state of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output: Option<PathBuf>,
    pub metadata: Option<Metadata>,
    pub error: Option<String>,
}

impl JobRecord {
    fn running(id: Uuid) -> Self {
        Self {
            id,
            status: JobStatus::Running,
            progress: 0,
            message: "Queued".to_string(),
            started_at: Utc::now(),
            finished_at: None,
            output: None,
            metadata: None,
            error: None,
        }
    }

    /// Check if the job has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Running
    }
}

/// One generation request
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Optional music track
    pub track: Option<PathBuf>,
    /// Signal length when no track is used (ms)
    pub duration_ms: i64,
    /// Layer parameters
    pub config: SignalConfig,
    /// Label used in the output file name
    pub label: String,
    /// Container for the exported signal
    pub format: ExportFormat,
}

impl JobRequest {
    /// Name of the file this request exports to
    pub fn file_name(&self) -> String {
        output_file_name(&self.label, self.format)
    }
}

/// Output file name: `UAP_Signal_<label>.<ext>`, with the label sanitised
pub fn output_file_name(label: &str, format: ExportFormat) -> String {
    let label = sanitize_label(label);
    let label = if label.is_empty() { "custom" } else { &label };
    format!("UAP_Signal_{}.{}", label, format.extension())
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`
fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Reject durations outside `1..=MAX_JOB_DURATION_MS`
pub fn check_duration(duration_ms: i64) -> Result<()> {
    if !(1..=MAX_JOB_DURATION_MS).contains(&duration_ms) {
        return Err(ContactError::InvalidParameter {
            param: "duration_ms".to_string(),
            value: duration_ms.to_string(),
            expected: format!("1 to {}", MAX_JOB_DURATION_MS),
        });
    }
    Ok(())
}

type Records = Arc<Mutex<HashMap<Uuid, JobRecord>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tracks background generations and their progress
pub struct JobRegistry<L = AudioLoader> {
    composer: Arc<SignalComposer<L>>,
    converter: ConverterConfig,
    output_dir: PathBuf,
    max_active: usize,
    ttl: Duration,
    records: Records,
    handles: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl<L: TrackLoader + 'static> JobRegistry<L> {
    /// Create a registry
    ///
    /// # Arguments
    /// * `composer` - Composer shared by every worker
    /// * `converter` - Converter for non-WAV exports
    /// * `output_dir` - Directory receiving exported signals
    /// * `max_active` - Maximum number of running jobs
    /// * `ttl` - How long finished records stay visible
    pub fn new(
        composer: SignalComposer<L>,
        converter: ConverterConfig,
        output_dir: impl Into<PathBuf>,
        max_active: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            composer: Arc::new(composer),
            converter,
            output_dir: output_dir.into(),
            max_active,
            ttl,
            records: Arc::new(Mutex::new(HashMap::new())),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Number of jobs still running
    pub fn active_count(&self) -> usize {
        lock(&self.records)
            .values()
            .filter(|record| !record.is_finished())
            .count()
    }

    /// Start a generation in the background
    ///
    /// # Errors
    /// * `InvalidParameter` - the configuration fails validation, or
    ///   `duration_ms` lies outside `1..=MAX_JOB_DURATION_MS`
    /// * `CapacityExceeded` - `max_active` jobs are already running
    pub fn submit(&self, request: JobRequest) -> Result<Uuid> {
        request.config.validate()?;
        check_duration(request.duration_ms)?;
        self.sweep_expired();

        let id = Uuid::new_v4();
        {
            let mut records = lock(&self.records);
            let active = records.values().filter(|r| !r.is_finished()).count();
            if active >= self.max_active {
                return Err(ContactError::CapacityExceeded {
                    limit: self.max_active,
                });
            }
            records.insert(id, JobRecord::running(id));
        }

        let composer = Arc::clone(&self.composer);
        let records = Arc::clone(&self.records);
        let converter = self.converter.clone();
        let output = self.output_dir.join(request.file_name());

        let spawned = thread::Builder::new()
            .name(format!("generate-{}", id))
            .spawn(move || run_job(id, request, output, &composer, &converter, &records));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                lock(&self.records).remove(&id);
                return Err(e.into());
            }
        };
        lock(&self.handles).insert(id, handle);
        debug!("Started job {}", id);
        Ok(id)
    }

    /// Current record for `id`, or `None` when unknown or expired
    pub fn status(&self, id: Uuid) -> Option<JobRecord> {
        self.sweep_expired();
        lock(&self.records).get(&id).cloned()
    }

    /// Block until the job's worker exits and return its final record
    ///
    /// # Errors
    /// `JobNotFound` when the id was never submitted or its record expired
    /// before the call.
    pub fn wait(&self, id: Uuid) -> Result<JobRecord> {
        let handle = lock(&self.handles).remove(&id);
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Worker for job {} panicked", id);
                update(&self.records, id, |record| {
                    record.status = JobStatus::Failed;
                    record.error = Some("worker panicked".to_string());
                    record.finished_at = Some(Utc::now());
                });
            }
        }

        lock(&self.records)
            .get(&id)
            .cloned()
            .ok_or_else(|| ContactError::JobNotFound { id: id.to_string() })
    }

    /// Drop finished records older than the TTL; returns how many went
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|_, record| match record.finished_at {
            Some(finished) => now - finished < self.ttl,
            None => true,
        });
        let removed = before - records.len();
        drop(records);

        if removed > 0 {
            let mut handles = lock(&self.handles);
            let records = lock(&self.records);
            handles.retain(|id, _| records.contains_key(id));
            debug!("Expired {} job record(s)", removed);
        }
        removed
    }
}

fn update<F: FnOnce(&mut JobRecord)>(records: &Records, id: Uuid, f: F) {
    if let Some(record) = lock(records).get_mut(&id) {
        f(record);
    }
}

fn run_job<L: TrackLoader>(
    id: Uuid,
    request: JobRequest,
    output: PathBuf,
    composer: &SignalComposer<L>,
    converter: &ConverterConfig,
    records: &Records,
) {
    let sink = |percent: u8, message: &str| {
        update(records, id, |record| {
            record.progress = percent;
            record.message = message.to_string();
        });
    };

    // A panicking worker must still leave a finished record behind
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        composer
            .generate(
                request.track.as_deref(),
                request.duration_ms,
                &request.config,
                Some(&sink),
            )
            .and_then(|(signal, metadata)| {
                if let Some(dir) = output.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                export_audio(&signal, &output, request.format, converter)?;
                Ok(metadata)
            })
    }));
    let result = outcome.unwrap_or_else(|payload| {
        Err(ContactError::WorkerPanicked {
            reason: panic_reason(payload.as_ref()),
        })
    });

    update(records, id, |record| {
        record.finished_at = Some(Utc::now());
        match result {
            Ok(metadata) => {
                info!("Job {} finished: {}", id, output.display());
                record.status = JobStatus::Completed;
                record.progress = 100;
                record.message = "Complete".to_string();
                record.output = Some(output);
                record.metadata = Some(metadata);
            }
            Err(e) => {
                error!("Job {} failed: {}", id, e);
                record.status = JobStatus::Failed;
                record.message = "Failed".to_string();
                record.error = Some(e.to_string());
            }
        }
    });
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
