//! Collapse, fan-out and sequential walk over one root.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::listing::{read_listing, DirListing};
use super::progress::WalkProgress;
use crate::cancel::{ensure_active, CancellationToken};
use crate::error::{is_transient_listing_error, Result, SearchError};
use crate::filter::FileFilter;
use crate::types::{FileEntry, FilesFound};

/// Receives every non-empty batch a walk produces.
///
/// Called concurrently from pool workers. An `Err` aborts the walk the same
/// way a fatal listing error does.
pub trait BatchSink: Sync {
    fn files_found(&self, batch: FilesFound) -> Result<()>;
}

/// Walks one root, partitioning it into pool units.
///
/// Without a cancellation token the walk always runs to exhaustion. With one,
/// the token is polled before every listing that starts a new unit of work;
/// once it is observed the walk returns `SearchError::Cancelled`.
pub struct Walker<'a, S: BatchSink + ?Sized> {
    filter: &'a dyn FileFilter,
    cancel: Option<&'a CancellationToken>,
    progress: &'a WalkProgress,
    fan_out_depth: usize,
    sink: &'a S,
}

impl<'a, S: BatchSink + ?Sized> Walker<'a, S> {
    pub fn new(filter: &'a dyn FileFilter, progress: &'a WalkProgress, sink: &'a S) -> Self {
        Self {
            filter,
            cancel: None,
            progress,
            fan_out_depth: crate::config::DEFAULT_FAN_OUT_DEPTH,
            sink,
        }
    }

    /// Sets the cancellation token.
    pub fn with_cancel(mut self, cancel: Option<&'a CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the number of partitioning generations (at least one).
    pub fn with_fan_out_depth(mut self, depth: usize) -> Self {
        self.fan_out_depth = depth.max(1);
        self
    }

    /// Walks the whole subtree under `root`, returning once every dispatched
    /// unit has joined.
    pub fn run(&self, root: &Path) -> Result<()> {
        ensure_active(self.cancel)?;
        let start = self.start_directories(root)?;
        self.fan_out(start, self.fan_out_depth)
    }

    /// Dispatches every directory as a pool unit and joins them all.
    ///
    /// `generations` counts the collapse rounds still to run; at 1 each unit
    /// is a sequential walk.
    fn fan_out(&self, dirs: Vec<PathBuf>, generations: usize) -> Result<()> {
        dirs.into_par_iter().try_for_each(|dir| {
            ensure_active(self.cancel)?;
            if generations > 1 {
                let next = self.start_directories(&dir)?;
                self.fan_out(next, generations - 1)
            } else {
                self.walk(&dir)
            }
        })
    }

    /// Collapses the single-child chain starting at `folder`.
    ///
    /// Files of every directory on the chain are reported on the way down.
    /// Returns the subdirectories of the first directory that does not have
    /// exactly one, which is empty for a leaf or an unreadable directory.
    fn start_directories(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let mut current = folder.to_path_buf();
        loop {
            ensure_active(self.cancel)?;
            let Some(DirListing { mut dirs, files }) = self.list(&current)? else {
                return Ok(Vec::new());
            };
            self.report(&current, files)?;

            if dirs.len() != 1 {
                return Ok(dirs);
            }
            current = dirs.swap_remove(0);
        }
    }

    /// Sequential depth-first walk: subdirectories first, then this
    /// directory's own files.
    fn walk(&self, folder: &Path) -> Result<()> {
        ensure_active(self.cancel)?;
        let Some(DirListing { dirs, files }) = self.list(folder)? else {
            return Ok(());
        };
        for dir in &dirs {
            self.walk(dir)?;
        }
        self.report(folder, files)
    }

    /// Lists a directory, absorbing transient failures as `None`.
    fn list(&self, folder: &Path) -> Result<Option<DirListing>> {
        match read_listing(folder) {
            Ok(listing) => {
                self.progress.record_scanned();
                Ok(Some(listing))
            }
            Err(error) if is_transient_listing_error(&error) => {
                log::debug!("skipping directory {}: {}", folder.display(), error);
                self.progress.record_skipped();
                Ok(None)
            }
            Err(error) => {
                log::warn!("listing failed for {}: {}", folder.display(), error);
                Err(SearchError::io(folder, error))
            }
        }
    }

    /// Filters a directory's files and emits them if anything matched.
    fn report(&self, folder: &Path, files: Vec<FileEntry>) -> Result<()> {
        let matched: Vec<FileEntry> = files
            .into_iter()
            .filter(|entry| self.filter.is_match(entry))
            .collect();
        if matched.is_empty() {
            return Ok(());
        }

        self.progress.record_batch(matched.len());
        self.sink.files_found(FilesFound {
            folder: folder.to_path_buf(),
            files: matched,
        })
    }
}
