//! FileSearchMultiple - one cancellation token, many roots, one completion.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use super::{finish_session, validate_folder, FileSearch, FilterSource};
use crate::cancel::CancellationToken;
use crate::config::{ExecuteHandlers, SearchOptions};
use crate::dispatch::{SessionOutcome, Subscribers};
use crate::error::{Result, SearchError};
use crate::filter::FileFilter;
use crate::types::{FilesFound, SearchStats, SearchSummary};

/// Configures and validates a [`FileSearchMultiple`].
pub struct FileSearchMultipleBuilder {
    folders: Vec<PathBuf>,
    filter: FilterSource,
    cancel: CancellationToken,
    options: SearchOptions,
}

impl FileSearchMultipleBuilder {
    /// Matches file names against a glob pattern (default `*`).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filter = FilterSource::Pattern(pattern.into());
        self
    }

    /// Uses an arbitrary filter, shared by every root.
    pub fn filter(mut self, filter: impl FileFilter + 'static) -> Self {
        self.filter = FilterSource::Custom(Arc::new(filter));
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

    /// Validates every folder and the filter before any traversal starts.
    ///
    /// # Errors
    /// * `SearchError::InvalidInput` for an empty folder list, an empty path,
    ///   a path that is not an existing directory, or an empty pattern.
    /// * `SearchError::InvalidPattern` if the pattern does not parse.
    pub fn build(self) -> Result<FileSearchMultiple> {
        if self.folders.is_empty() {
            return Err(SearchError::InvalidInput(
                "folders must not be empty".to_string(),
            ));
        }
        for folder in &self.folders {
            validate_folder(folder)?;
        }
        let filter = self.filter.resolve(self.options.case_sensitive)?;

        // Children surface cancellation so the orchestrator can stop early;
        // suppression is applied once, at the top.
        let child_options = SearchOptions {
            suppress_cancellation: false,
            ..self.options.clone()
        };
        let searchers = self
            .folders
            .into_iter()
            .map(|folder| {
                FileSearch::from_parts(
                    folder,
                    filter.clone(),
                    Some(self.cancel.clone()),
                    child_options.clone(),
                )
            })
            .collect();

        Ok(FileSearchMultiple {
            searchers,
            cancel: self.cancel,
            suppress_cancellation: self.options.suppress_cancellation,
            subscribers: Subscribers::default(),
            started: AtomicBool::new(false),
        })
    }
}

/// Searches several roots in turn under one shared cancellation token.
///
/// Batches from every root go to the same subscribers; the completion
/// notification fires once for the whole run.
pub struct FileSearchMultiple {
    searchers: Vec<FileSearch>,
    cancel: CancellationToken,
    suppress_cancellation: bool,
    subscribers: Subscribers,
    started: AtomicBool,
}

impl fmt::Debug for FileSearchMultiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSearchMultiple")
            .field("searchers", &self.searchers)
            .field("suppress_cancellation", &self.suppress_cancellation)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl FileSearchMultiple {
    /// Starts configuring a search over `folders`, cancellable through `token`.
    pub fn builder<I, P>(folders: I, token: CancellationToken) -> FileSearchMultipleBuilder
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FileSearchMultipleBuilder {
            folders: folders.into_iter().map(Into::into).collect(),
            filter: FilterSource::default(),
            cancel: token,
            options: SearchOptions::default(),
        }
    }

    /// Subscribes to result batches from every root.
    pub fn on_files_found<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&FilesFound) + Send + Sync + 'static,
    {
        self.subscribers.files_found.push(Arc::new(handler));
        self
    }

    /// Subscribes to the single terminal notification.
    pub fn on_search_completed<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.subscribers.search_completed.push(Arc::new(handler));
        self
    }

    /// Searches each root to completion, one after another.
    ///
    /// Stops issuing roots as soon as one reports cancellation or fails.
    ///
    /// # Errors
    /// Same as [`FileSearch::start_search`].
    pub fn start_search(&self) -> Result<SearchSummary> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SearchError::AlreadyStarted);
        }

        let started = Instant::now();
        let mut stats = SearchStats::default();
        let mut outcome = SessionOutcome {
            cancelled: false,
            failure: None,
        };
        for searcher in &self.searchers {
            let root_outcome = searcher.run_session(&self.subscribers.files_found);
            stats += searcher.stats();
            if root_outcome.failure.is_some() || root_outcome.cancelled {
                log::debug!(
                    "stopping multi-root search at {} cancelled={}",
                    searcher.root().display(),
                    root_outcome.cancelled
                );
                outcome = root_outcome;
                break;
            }
        }

        let summary = SearchSummary {
            cancelled: outcome.cancelled,
            stats,
            elapsed: started.elapsed(),
        };
        finish_session(
            outcome,
            &self.subscribers.search_completed,
            self.suppress_cancellation,
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

    /// Requests cancellation of the shared token without waiting.
    pub fn stop_search(&self) {
        self.cancel.cancel();
    }

    /// The shared cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
