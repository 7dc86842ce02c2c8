//! Concurrent recursive filesystem search.
//!
//! This crate provides:
//! - A parallel directory walker that fans out over a fixed number of
//!   generations before switching to sequential walks
//! - Glob and predicate file filters
//! - Cooperative cancellation through a shared token
//! - Inline or deferred execution of result handlers
//! - Multi-root searches with a single completion notification

pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod search;
pub mod types;
pub mod walk;

#[cfg(test)]
mod testing;

// Re-export main types
pub use cancel::CancellationToken;
pub use config::{ExecuteHandlers, SearchOptions};
pub use dispatch::{FilesFoundHandler, SearchCompletedHandler};
pub use error::{Result, SearchError};
pub use filter::{FileFilter, GlobFilter};
pub use search::{FileSearch, FileSearchBuilder, FileSearchMultiple, FileSearchMultipleBuilder};
pub use types::{FileEntry, FileType, FilesFound, SearchStats, SearchSummary};
