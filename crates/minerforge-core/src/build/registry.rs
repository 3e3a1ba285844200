//! In-memory registry of build records.
//!
//! Every read and write of the record map goes through one mutex; each
//! method holds it for a single read-modify-write and never across an await.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use minerforge_types::build::{BuildId, BuildRecord, BuildSnapshot, BuildStatus};

use crate::build::progress::{RUNNING_PROGRESS_CAP, detect_phase};

/// Process-wide collection of build records keyed by build id.
#[derive(Debug, Default)]
pub struct BuildRegistry {
    records: Mutex<HashMap<BuildId, BuildRecord>>,
}

impl BuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Mutations are plain field assignments; a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<BuildId, BuildRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a freshly created record.
    pub fn insert(&self, record: BuildRecord) {
        self.lock().insert(record.id, record);
    }

    /// Append one output line to a running build and advance its progress if
    /// the line announces a later phase.
    ///
    /// Returns the progress after the update, or `None` when the build is
    /// unknown or already finalized.
    pub fn append_line(&self, id: &BuildId, line: &str) -> Option<u8> {
        let mut records = self.lock();
        let record = records.get_mut(id)?;
        if record.status.is_terminal() {
            return None;
        }

        record.logs.push(line.to_string());

        if let Some(phase) = detect_phase(line) {
            let progress = phase.progress.min(RUNNING_PROGRESS_CAP);
            if progress >= record.progress {
                record.progress = progress;
                record.message = phase.marker.to_string();
            }
        }

        Some(record.progress)
    }

    /// Replace the status message of a running build without touching progress.
    pub fn set_message(&self, id: &BuildId, message: &str) {
        if let Some(record) = self.lock().get_mut(id) {
            if !record.status.is_terminal() {
                record.message = message.to_string();
                record.logs.push(message.to_string());
            }
        }
    }

    /// Finalize a running build as completed.
    ///
    /// Returns `false` if the build is unknown or was already finalized.
    pub fn complete(&self, id: &BuildId, filename: &str, now: DateTime<Utc>) -> bool {
        let mut records = self.lock();
        let Some(record) = records.get_mut(id) else {
            return false;
        };
        if record.status.is_terminal() {
            return false;
        }

        record.status = BuildStatus::Completed;
        record.progress = 100;
        record.message = "Build completed successfully".to_string();
        record.filename = Some(filename.to_string());
        record.logs.push(format!("Build completed: {filename}"));
        record.finished_at = Some(now);
        true
    }

    /// Finalize a running build as failed. Progress is left where it was.
    ///
    /// Returns `false` if the build is unknown or was already finalized.
    pub fn fail(&self, id: &BuildId, error: &str, now: DateTime<Utc>) -> bool {
        let mut records = self.lock();
        let Some(record) = records.get_mut(id) else {
            return false;
        };
        if record.status.is_terminal() {
            return false;
        }

        record.status = BuildStatus::Failed;
        record.message = "Build failed".to_string();
        record.error = Some(error.to_string());
        record.logs.push(format!("Build failed: {error}"));
        record.finished_at = Some(now);
        true
    }

    /// Snapshot of a build with its last `tail` log lines.
    pub fn snapshot(&self, id: &BuildId, tail: usize) -> Option<BuildSnapshot> {
        self.lock().get(id).map(|record| record.snapshot(tail))
    }

    pub fn status(&self, id: &BuildId) -> Option<BuildStatus> {
        self.lock().get(id).map(|record| record.status)
    }

    pub fn contains(&self, id: &BuildId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Count records per status, in (running, completed, failed) order.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.lock()
            .values()
            .fold((0, 0, 0), |(r, c, f), record| match record.status {
                BuildStatus::Running => (r + 1, c, f),
                BuildStatus::Completed => (r, c + 1, f),
                BuildStatus::Failed => (r, c, f + 1),
            })
    }

    /// Remove finished builds that started more than `retention` before `now`.
    ///
    /// Running builds are kept regardless of age. Returns the removed ids.
    pub fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> Vec<BuildId> {
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return Vec::new();
        };
        let mut records = self.lock();

        let expired: Vec<BuildId> = records
            .values()
            .filter(|record| record.status.is_terminal() && record.start_time < cutoff)
            .map(|record| record.id)
            .collect();

        for id in &expired {
            records.remove(id);
        }

        expired
    }
}
