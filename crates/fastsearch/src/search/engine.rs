//! FileSearch - a search session over a single root.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use super::{finish_session, validate_folder, FilterSource};
use crate::cancel::CancellationToken;
use crate::config::{ExecuteHandlers, SearchOptions};
use crate::dispatch::{run_with_handlers, FilesFoundHandler, SessionOutcome, Subscribers};
use crate::error::{Result, SearchError};
use crate::filter::FileFilter;
use crate::types::{FilesFound, SearchStats, SearchSummary};
use crate::walk::{WalkProgress, Walker};

/// Configures and validates a [`FileSearch`].
pub struct FileSearchBuilder {
    root: PathBuf,
    filter: FilterSource,
    cancel: Option<CancellationToken>,
    options: SearchOptions,
}

impl FileSearchBuilder {
    /// Matches file names against a glob pattern (default `*`).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filter = FilterSource::Pattern(pattern.into());
        self
    }

    /// Uses an arbitrary filter, such as a closure over [`crate::FileEntry`].
    pub fn filter(mut self, filter: impl FileFilter + 'static) -> Self {
        self.filter = FilterSource::Custom(Arc::new(filter));
        self
    }

    /// Makes the session cancellable through `token`.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn execute_handlers(mut self, mode: ExecuteHandlers) -> Self {
        self.options.execute_handlers = mode;
        self
    }

    pub fn suppress_cancellation(mut self, suppress: bool) -> Self {
        self.options.suppress_cancellation = suppress;
        self
    }

    pub fn fan_out_depth(mut self, depth: usize) -> Self {
        self.options.fan_out_depth = depth;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.options.case_sensitive = case_sensitive;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// * `SearchError::InvalidInput` if the root is empty or not an existing
    ///   directory, or the pattern is empty.
    /// * `SearchError::InvalidPattern` if the pattern does not parse.
    pub fn build(self) -> Result<FileSearch> {
        validate_folder(&self.root)?;
        let filter = self.filter.resolve(self.options.case_sensitive)?;
        Ok(FileSearch::from_parts(
            self.root,
            filter,
            self.cancel,
            self.options,
        ))
    }
}

/// One search session over one root folder.
///
/// Subscribe with [`on_files_found`](Self::on_files_found) and
/// [`on_search_completed`](Self::on_search_completed), then call
/// [`start_search`](Self::start_search) once. A session cannot be restarted.
pub struct FileSearch {
    root: PathBuf,
    filter: Arc<dyn FileFilter>,
    cancel: Option<CancellationToken>,
    options: SearchOptions,
    subscribers: Subscribers,
    started: AtomicBool,
    progress: WalkProgress,
}

impl fmt::Debug for FileSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSearch")
            .field("root", &self.root)
            .field("cancellable", &self.cancel.is_some())
            .field("options", &self.options)
            .field("subscribers", &self.subscribers)
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish()
    }
}

impl FileSearch {
    /// Starts configuring a search of `root`.
    pub fn builder(root: impl Into<PathBuf>) -> FileSearchBuilder {
        FileSearchBuilder {
            root: root.into(),
            filter: FilterSource::default(),
            cancel: None,
            options: SearchOptions::default(),
        }
    }

    pub(super) fn from_parts(
        root: PathBuf,
        filter: Arc<dyn FileFilter>,
        cancel: Option<CancellationToken>,
        options: SearchOptions,
    ) -> Self {
        Self {
            root,
            filter,
            cancel,
            options,
            subscribers: Subscribers::default(),
            started: AtomicBool::new(false),
            progress: WalkProgress::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Subscribes to result batches.
    pub fn on_files_found<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&FilesFound) + Send + Sync + 'static,
    {
        self.subscribers.files_found.push(Arc::new(handler));
        self
    }

    /// Subscribes to the terminal notification.
    pub fn on_search_completed<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.subscribers.search_completed.push(Arc::new(handler));
        self
    }

    /// Runs the search to completion on the rayon pool, blocking the caller.
    ///
    /// The completion notification fires exactly once, after every batch
    /// (and in deferred mode every handler job) has finished.
    ///
    /// # Errors
    /// * `SearchError::AlreadyStarted` on a second call.
    /// * `SearchError::Cancelled` if the session was cancelled and
    ///   cancellation is not suppressed.
    /// * `SearchError::Io` for a non-transient listing failure.
    /// * `SearchError::Handler` if a subscriber panicked.
    pub fn start_search(&self) -> Result<SearchSummary> {
        self.begin()?;
        let started = Instant::now();
        let outcome = self.run_session(&self.subscribers.files_found);
        let summary = SearchSummary {
            cancelled: outcome.cancelled,
            stats: self.stats(),
            elapsed: started.elapsed(),
        };
        finish_session(
            outcome,
            &self.subscribers.search_completed,
            self.options.suppress_cancellation,
            summary,
        )
    }

    /// Runs [`start_search`](Self::start_search) on tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_search_async(self: &Arc<Self>) -> JoinHandle<Result<SearchSummary>> {
        let search = Arc::clone(self);
        tokio::task::spawn_blocking(move || search.start_search())
    }

    /// Requests cancellation without waiting for it to be observed.
    ///
    /// Does nothing for a session built without a cancellation token.
    pub fn stop_search(&self) {
        match &self.cancel {
            Some(token) => token.cancel(),
            None => log::debug!(
                "stop requested for non-cancellable search of {}",
                self.root.display()
            ),
        }
    }

    /// Counters collected so far.
    pub fn stats(&self) -> SearchStats {
        self.progress.snapshot()
    }

    fn begin(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SearchError::AlreadyStarted);
        }
        Ok(())
    }

    /// Walks the root, delivering batches to `files_found`, and joins all
    /// deferred handler jobs. Does not deliver the completion notification.
    pub(super) fn run_session(&self, files_found: &[FilesFoundHandler]) -> SessionOutcome {
        let started = Instant::now();
        let cancel = self.cancel.as_ref();
        let outcome = run_with_handlers(self.options.execute_handlers, files_found, cancel, |sink| {
            Walker::new(self.filter.as_ref(), &self.progress, sink)
                .with_cancel(cancel)
                .with_fan_out_depth(self.options.effective_fan_out_depth())
                .run(&self.root)
        });

        let stats = self.stats();
        log::info!(
            "file search finished root={} cancelled={} failed={} dirs={} files={} batches={} skipped={} elapsed_ms={}",
            self.root.display(),
            outcome.cancelled,
            outcome.failure.is_some(),
            stats.scanned_dirs,
            stats.matched_files,
            stats.batches,
            stats.skipped_dirs,
            started.elapsed().as_millis(),
        );
        outcome
    }
}
