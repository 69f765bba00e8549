//! Progress reporting
//!
//! The composer reports `(percent, message)` pairs at fixed checkpoints.
//! Reports are informational only.

use std::sync::Mutex;

/// Receiver of progress notifications
pub trait ProgressSink {
    /// Called at each checkpoint with a percentage and a short message
    fn report(&self, percent: u8, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str),
{
    fn report(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// Sink that records every report, in order
#[derive(Debug, Default)]
pub struct ProgressLog {
    entries: Mutex<Vec<(u8, String)>>,
}

impl ProgressLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded reports
    pub fn entries(&self) -> Vec<(u8, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Recorded percentages only
    pub fn percents(&self) -> Vec<u8> {
        self.entries().into_iter().map(|(p, _)| p).collect()
    }
}

impl ProgressSink for ProgressLog {
    fn report(&self, percent: u8, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((percent, message.to_string()));
        }
    }
}

/// Forward to an optional sink
pub(crate) fn notify(sink: Option<&dyn ProgressSink>, percent: u8, message: &str) {
    if let Some(sink) = sink {
        sink.report(percent, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_sink() {
        let seen = RefCell::new(Vec::new());
        let sink = |p: u8, m: &str| seen.borrow_mut().push(format!("{}:{}", p, m));
        notify(Some(&sink), 5, "start");
        notify(None, 10, "ignored");
        assert_eq!(seen.into_inner(), vec!["5:start".to_string()]);
    }

    #[test]
    fn test_progress_log_records_in_order() {
        let log = ProgressLog::new();
        log.report(5, "a");
        log.report(50, "b");
        assert_eq!(log.percents(), vec![5, 50]);
        assert_eq!(log.entries()[1].1, "b");
    }
}
