//! Handler dispatch: where subscriber callbacks run.
//!
//! In inline mode a batch's callbacks run on the worker that found it. In
//! deferred mode every batch becomes a job spawned into a `rayon::scope`
//! that is opened for the whole session, so leaving the scope is the join
//! barrier: the completion notification can only follow once every deferred
//! job has finished.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cancel::CancellationToken;
use crate::config::ExecuteHandlers;
use crate::error::{panic_message, Result, SearchError};
use crate::types::FilesFound;
use crate::walk::BatchSink;

/// Callback for "files found" events.
pub type FilesFoundHandler = Arc<dyn Fn(&FilesFound) + Send + Sync>;

/// Callback for the terminal "search completed" event; the argument is
/// whether the session was cancelled.
pub type SearchCompletedHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// Subscriber lists of one search object.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    pub files_found: Vec<FilesFoundHandler>,
    pub search_completed: Vec<SearchCompletedHandler>,
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("files_found", &self.files_found.len())
            .field("search_completed", &self.search_completed.len())
            .finish()
    }
}

/// How a session ended once every deferred job has been joined.
#[derive(Debug)]
pub(crate) struct SessionOutcome {
    pub cancelled: bool,
    pub failure: Option<SearchError>,
}

impl SessionOutcome {
    fn from_parts(walk: Result<()>, jobs_cancelled: bool, job_failure: Option<String>) -> Self {
        let (cancelled, failure) = match walk {
            Ok(()) => (false, None),
            Err(SearchError::Cancelled) => (true, None),
            Err(error) => (false, Some(error)),
        };
        Self {
            cancelled: cancelled || jobs_cancelled,
            failure: failure.or(job_failure.map(SearchError::Handler)),
        }
    }
}

/// Bookkeeping shared by the deferred jobs of one session.
#[derive(Debug, Default)]
struct HandlerGroup {
    cancelled: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl HandlerGroup {
    fn record_failure(&self, message: String) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(message);
        }
    }
}

struct Dispatcher<'r, 's> {
    mode: ExecuteHandlers,
    handlers: &'s [FilesFoundHandler],
    cancel: Option<&'s CancellationToken>,
    group: &'s HandlerGroup,
    scope: &'r rayon::Scope<'s>,
}

impl BatchSink for Dispatcher<'_, '_> {
    fn files_found(&self, batch: FilesFound) -> Result<()> {
        if self.handlers.is_empty() {
            return Ok(());
        }

        match self.mode {
            ExecuteHandlers::Inline => {
                invoke_files_found(self.handlers, &batch).map_err(SearchError::Handler)
            }
            ExecuteHandlers::Deferred => {
                let handlers = self.handlers;
                let cancel = self.cancel;
                let group = self.group;
                self.scope.spawn(move |_| {
                    if cancel.is_some_and(CancellationToken::is_cancelled) {
                        group.cancelled.store(true, Ordering::Relaxed);
                        return;
                    }
                    if let Err(message) = invoke_files_found(handlers, &batch) {
                        log::warn!(
                            "deferred handler failed for {}: {}",
                            batch.folder.display(),
                            message
                        );
                        group.record_failure(message);
                    }
                });
                Ok(())
            }
        }
    }
}

/// Runs `body` with a sink that routes batches to `handlers` per `mode`,
/// returning only after every deferred job has completed.
pub(crate) fn run_with_handlers<F>(
    mode: ExecuteHandlers,
    handlers: &[FilesFoundHandler],
    cancel: Option<&CancellationToken>,
    body: F,
) -> SessionOutcome
where
    F: FnOnce(&dyn BatchSink) -> Result<()> + Send,
{
    let group = HandlerGroup::default();
    let walk = rayon::scope(|scope| {
        let dispatcher = Dispatcher {
            mode,
            handlers,
            cancel,
            group: &group,
            scope,
        };
        body(&dispatcher)
    });

    let HandlerGroup { cancelled, failure } = group;
    SessionOutcome::from_parts(walk, cancelled.into_inner(), failure.into_inner())
}

/// Delivers the terminal notification on the calling thread.
pub(crate) fn notify_completed(handlers: &[SearchCompletedHandler], cancelled: bool) -> Result<()> {
    for handler in handlers {
        panic::catch_unwind(AssertUnwindSafe(|| handler(cancelled)))
            .map_err(|payload| SearchError::Handler(panic_message(payload)))?;
    }
    Ok(())
}

fn invoke_files_found(
    handlers: &[FilesFoundHandler],
    batch: &FilesFound,
) -> std::result::Result<(), String> {
    for handler in handlers {
        panic::catch_unwind(AssertUnwindSafe(|| handler(batch))).map_err(panic_message)?;
    }
    Ok(())
}
