//! Testing utilities for fastsearch.
//!
//! Helpers for building on-disk trees and recording what a search reports.
//! Only available when compiled with `cfg(test)`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::types::FilesFound;
use crate::walk::BatchSink;

/// Creates every file in `files` (relative, `/`-separated) under `root`,
/// along with its parent directories.
pub fn make_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create test directory");
        }
        fs::write(&path, file.as_bytes()).expect("Failed to create test file");
    }
}

/// Flattens batches into `/`-separated paths relative to `root`.
pub fn relative_paths(root: &Path, batches: &[FilesFound]) -> Vec<String> {
    batches
        .iter()
        .flat_map(|batch| batch.files.iter())
        .map(|entry| {
            let relative = entry.path.strip_prefix(root).unwrap_or(entry.path.as_path());
            relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

/// A sink that keeps every batch in arrival order.
#[derive(Debug, Default)]
pub struct CollectSink {
    batches: Mutex<Vec<FilesFound>>,
}

impl CollectSink {
    pub fn batches(&self) -> Vec<FilesFound> {
        self.batches.lock().clone()
    }
}

impl BatchSink for CollectSink {
    fn files_found(&self, batch: FilesFound) -> Result<()> {
        self.batches.lock().push(batch);
        Ok(())
    }
}

/// One observed subscriber event.
#[derive(Debug, Clone)]
pub enum Event {
    Batch(FilesFound),
    Completed(bool),
}

/// Records subscriber events from any thread, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn files_found_handler(&self) -> impl Fn(&FilesFound) + Send + Sync + 'static {
        let events = self.events.clone();
        move |batch: &FilesFound| events.lock().push(Event::Batch(batch.clone()))
    }

    pub fn search_completed_handler(&self) -> impl Fn(bool) + Send + Sync + 'static {
        let events = self.events.clone();
        move |cancelled: bool| events.lock().push(Event::Completed(cancelled))
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn batches(&self) -> Vec<FilesFound> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Batch(batch) => Some(batch),
                Event::Completed(_) => None,
            })
            .collect()
    }

    /// Every completion value seen, in order.
    pub fn completions(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Completed(cancelled) => Some(cancelled),
                Event::Batch(_) => None,
            })
            .collect()
    }

    /// Asserts there is exactly one completion and it is the last event.
    pub fn assert_completed_last(&self, cancelled: bool) {
        let events = self.events();
        assert_eq!(self.completions(), vec![cancelled], "events: {events:?}");
        assert!(
            matches!(events.last(), Some(Event::Completed(_))),
            "completion is not the last event: {events:?}"
        );
    }
}
