//! Search sessions over one or many roots.
//!
//! This module provides:
//! - `FileSearch`, a session over a single root
//! - `FileSearchMultiple`, which runs one session per root under a shared
//!   cancellation token and reports a single completion

mod engine;
mod multiple;

use std::path::Path;
use std::sync::Arc;

use crate::dispatch::{notify_completed, SearchCompletedHandler, SessionOutcome};
use crate::error::{Result, SearchError};
use crate::filter::{FileFilter, GlobFilter, MATCH_ALL_PATTERN};
use crate::types::SearchSummary;

// Re-export main types
pub use engine::{FileSearch, FileSearchBuilder};
pub use multiple::{FileSearchMultiple, FileSearchMultipleBuilder};

/// Filter as configured on a builder, resolved at `build()`.
enum FilterSource {
    Pattern(String),
    Custom(Arc<dyn FileFilter>),
}

impl Default for FilterSource {
    fn default() -> Self {
        Self::Pattern(MATCH_ALL_PATTERN.to_string())
    }
}

impl FilterSource {
    fn resolve(self, case_sensitive: bool) -> Result<Arc<dyn FileFilter>> {
        match self {
            Self::Pattern(pattern) => Ok(Arc::new(GlobFilter::new(&pattern, case_sensitive)?)),
            Self::Custom(filter) => Ok(filter),
        }
    }
}

/// Rejects empty paths and paths that are not existing directories.
fn validate_folder(folder: &Path) -> Result<()> {
    if folder.as_os_str().is_empty() {
        return Err(SearchError::InvalidInput(
            "folder path must not be empty".to_string(),
        ));
    }
    if !folder.is_dir() {
        return Err(SearchError::InvalidInput(format!(
            "{} is not an existing directory",
            folder.display()
        )));
    }
    Ok(())
}

/// Delivers the terminal notification, then picks what `start_search` returns.
///
/// A fatal failure wins over a completion-handler failure, which wins over
/// a non-suppressed cancellation.
fn finish_session(
    outcome: SessionOutcome,
    completed: &[SearchCompletedHandler],
    suppress_cancellation: bool,
    summary: SearchSummary,
) -> Result<SearchSummary> {
    let notified = notify_completed(completed, outcome.cancelled);
    if let Some(failure) = outcome.failure {
        return Err(failure);
    }
    notified?;
    if outcome.cancelled && !suppress_cancellation {
        return Err(SearchError::Cancelled);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchStats;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn summary(cancelled: bool) -> SearchSummary {
        SearchSummary {
            cancelled,
            stats: SearchStats::default(),
            elapsed: Duration::ZERO,
        }
    }

    fn counting(count: &Arc<AtomicUsize>) -> Vec<SearchCompletedHandler> {
        let count = count.clone();
        vec![Arc::new(move |_: bool| {
            count.fetch_add(1, Ordering::SeqCst);
        })]
    }

    #[test]
    fn validate_folder_rejects_empty_and_missing() {
        let temp = TempDir::new().unwrap();
        assert!(validate_folder(temp.path()).is_ok());
        assert!(matches!(
            validate_folder(Path::new("")),
            Err(SearchError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_folder(&temp.path().join("missing")),
            Err(SearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_folder_rejects_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(validate_folder(&file).is_err());
    }

    #[test]
    fn suppressed_cancellation_returns_summary() {
        let count = Arc::new(AtomicUsize::new(0));
        let outcome = SessionOutcome {
            cancelled: true,
            failure: None,
        };
        let result = finish_session(outcome, &counting(&count), true, summary(true)).unwrap();
        assert!(result.cancelled);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsuppressed_cancellation_is_returned_after_notification() {
        let count = Arc::new(AtomicUsize::new(0));
        let outcome = SessionOutcome {
            cancelled: true,
            failure: None,
        };
        let error = finish_session(outcome, &counting(&count), false, summary(true)).unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_wins_over_cancellation() {
        let count = Arc::new(AtomicUsize::new(0));
        let outcome = SessionOutcome {
            cancelled: true,
            failure: Some(SearchError::Handler("broken".into())),
        };
        let error = finish_session(outcome, &counting(&count), false, summary(true)).unwrap_err();
        assert!(matches!(error, SearchError::Handler(_)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_filter_source_matches_everything() {
        let filter = FilterSource::default().resolve(true).unwrap();
        let entry = crate::types::FileEntry {
            path: "/x/any.bin".into(),
            name: "any.bin".to_string(),
            file_type: crate::types::FileType::File,
            size: None,
            modified_at: None,
        };
        assert!(filter.is_match(&entry));
    }

    #[test]
    fn empty_pattern_source_is_rejected() {
        let result = FilterSource::Pattern(String::new()).resolve(true);
        assert!(matches!(result, Err(SearchError::InvalidInput(_))));
    }
}
