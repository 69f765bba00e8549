//! Job Registry Tests
//!
//! Background generation, capacity limits and record expiry.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration as StdDuration, Instant};

use chrono::Duration;
use tempfile::tempdir;

use contact_signal::engine::{load_audio, AudioLoader, ConverterConfig, ExportFormat, TrackLoader};
use contact_signal::error::{ContactError, Result};
use contact_signal::jobs::{JobRecord, JobRegistry, JobRequest, JobStatus, MAX_JOB_DURATION_MS};
use contact_signal::signal::SignalComposer;
use contact_signal::{AudioBuffer, SignalConfig};

/// Loader that blocks every load until the gate opens, then reports a
/// missing file so the composer falls back to synthetic layers.
#[derive(Clone, Default)]
struct GateLoader {
    gate: Arc<(Mutex<bool>, Condvar)>,
}

impl GateLoader {
    fn open(&self) {
        let (lock, cvar) = &*self.gate;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }
}

impl TrackLoader for GateLoader {
    fn load(&self, path: &Path) -> Result<AudioBuffer> {
        let (lock, cvar) = &*self.gate;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
        Err(ContactError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        })
    }
}

/// Loader whose decoder crashes on every track
struct CrashingLoader;

impl TrackLoader for CrashingLoader {
    fn load(&self, path: &Path) -> Result<AudioBuffer> {
        panic!("decoder crashed on {}", path.display());
    }
}

/// Poll `status` until the job leaves `Running`, without joining the worker
fn poll_until_finished<L: TrackLoader + 'static>(
    jobs: &JobRegistry<L>,
    id: uuid::Uuid,
) -> JobRecord {
    let deadline = Instant::now() + StdDuration::from_secs(10);
    loop {
        let record = jobs.status(id).expect("record should stay visible");
        if record.is_finished() {
            return record;
        }
        assert!(Instant::now() < deadline, "job {} never finished", id);
        thread::sleep(StdDuration::from_millis(10));
    }
}

fn request(label: &str, format: ExportFormat) -> JobRequest {
    JobRequest {
        track: None,
        duration_ms: 600,
        config: SignalConfig::default(),
        label: label.to_string(),
        format,
    }
}

fn registry(dir: &Path, max_active: usize, ttl: Duration) -> JobRegistry {
    JobRegistry::new(
        SignalComposer::default().with_seed(3),
        ConverterConfig::none(),
        dir,
        max_active,
        ttl,
    )
}

#[test]
fn test_job_completes_and_exports() {
    let dir = tempdir().unwrap();
    let jobs = registry(dir.path(), 2, Duration::hours(1));

    let id = jobs.submit(request("original_uap", ExportFormat::Wav)).unwrap();
    let record = jobs.wait(id).unwrap();

    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.progress, 100);
    assert!(record.finished_at.is_some());
    assert!(record.error.is_none());

    let output = record.output.unwrap();
    assert_eq!(output, dir.path().join("UAP_Signal_original_uap.wav"));
    let exported = load_audio(&output, &ConverterConfig::none()).unwrap();
    assert_eq!(exported.duration_ms(), 600);
    assert_eq!(record.metadata.unwrap().duration_ms, 600);

    assert_eq!(jobs.active_count(), 0);
    assert_eq!(jobs.status(id).unwrap().status, JobStatus::Completed);
}

#[test]
fn test_export_failure_marks_job_failed() {
    let dir = tempdir().unwrap();
    let jobs = registry(dir.path(), 1, Duration::hours(1));

    let id = jobs.submit(request("lossy", ExportFormat::Mp3)).unwrap();
    let record = jobs.wait(id).unwrap();

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.output.is_none());
    assert!(record.error.is_some());
    assert!(!dir.path().join("UAP_Signal_lossy.mp3").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let jobs = registry(dir.path(), 1, Duration::hours(1));
    let mut bad = request("bad", ExportFormat::Wav);
    bad.config.schumann_freq = 0.0;

    let err = jobs.submit(bad).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PARAMETER");
    assert_eq!(jobs.active_count(), 0);
}

#[test]
fn test_capacity_limit() {
    let dir = tempdir().unwrap();
    let loader = GateLoader::default();
    let jobs = JobRegistry::new(
        SignalComposer::new(loader.clone()).with_seed(1),
        ConverterConfig::none(),
        dir.path(),
        1,
        Duration::hours(1),
    );

    let mut blocked = request("first", ExportFormat::Wav);
    blocked.track = Some(PathBuf::from("held.wav"));
    let first = jobs.submit(blocked).unwrap();

    assert_eq!(jobs.active_count(), 1);
    let running = jobs.status(first).unwrap();
    assert_eq!(running.status, JobStatus::Running);
    assert!(running.progress <= 5);

    let err = jobs.submit(request("second", ExportFormat::Wav)).unwrap_err();
    assert!(matches!(err, ContactError::CapacityExceeded { limit: 1 }));

    loader.open();
    assert_eq!(jobs.wait(first).unwrap().status, JobStatus::Completed);

    let second = jobs.submit(request("second", ExportFormat::Wav)).unwrap();
    assert_eq!(jobs.wait(second).unwrap().status, JobStatus::Completed);
}

#[test]
fn test_finished_records_expire() {
    let dir = tempdir().unwrap();
    let jobs = registry(dir.path(), 1, Duration::zero());

    let id = jobs.submit(request("brief", ExportFormat::Wav)).unwrap();
    assert_eq!(jobs.wait(id).unwrap().status, JobStatus::Completed);

    assert!(jobs.status(id).is_none());
    let err = jobs.wait(id).unwrap_err();
    assert_eq!(err.error_code(), "JOB_NOT_FOUND");
    assert_eq!(jobs.sweep_expired(), 0);
}

#[test]
fn test_unknown_job() {
    let dir = tempdir().unwrap();
    let jobs: JobRegistry<AudioLoader> = registry(dir.path(), 1, Duration::hours(1));
    let id = uuid::Uuid::new_v4();

    assert!(jobs.status(id).is_none());
    assert!(jobs.wait(id).is_err());
}

#[test]
fn test_panicking_worker_marks_job_failed() {
    let dir = tempdir().unwrap();
    let jobs = JobRegistry::new(
        SignalComposer::new(CrashingLoader).with_seed(1),
        ConverterConfig::none(),
        dir.path(),
        1,
        Duration::hours(1),
    );

    let mut crashing = request("crash", ExportFormat::Wav);
    crashing.track = Some(PathBuf::from("broken.wav"));
    let id = jobs.submit(crashing).unwrap();

    let record = poll_until_finished(&jobs, id);
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.finished_at.is_some());
    assert!(record.error.unwrap().contains("decoder crashed"));
    assert_eq!(jobs.active_count(), 0);

    let next = jobs.submit(request("after_crash", ExportFormat::Wav)).unwrap();
    assert_eq!(poll_until_finished(&jobs, next).status, JobStatus::Completed);
}

#[test]
fn test_oversized_duration_rejected() {
    let dir = tempdir().unwrap();
    let jobs = registry(dir.path(), 1, Duration::zero());

    for duration_ms in [0, MAX_JOB_DURATION_MS + 1, 1 << 62] {
        let mut oversized = request("long", ExportFormat::Wav);
        oversized.duration_ms = duration_ms;
        let err = jobs.submit(oversized).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    assert_eq!(jobs.active_count(), 0);
    let id = jobs.submit(request("short", ExportFormat::Wav)).unwrap();
    assert_eq!(jobs.wait(id).unwrap().status, JobStatus::Completed);
}
