//! Session progress counters.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::SearchStats;

/// Counters bumped by workers while a session runs.
#[derive(Debug, Default)]
pub struct WalkProgress {
    pub scanned_dirs: AtomicUsize,
    pub matched_files: AtomicUsize,
    pub batches: AtomicUsize,
    pub skipped_dirs: AtomicUsize,
}

impl WalkProgress {
    pub(crate) fn record_scanned(&self) {
        self.scanned_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self, files: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.matched_files.fetch_add(files, Ordering::Relaxed);
    }

    /// Takes a snapshot of the counter values.
    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            scanned_dirs: self.scanned_dirs.load(Ordering::Relaxed),
            matched_files: self.matched_files.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            skipped_dirs: self.skipped_dirs.load(Ordering::Relaxed),
        }
    }
}
