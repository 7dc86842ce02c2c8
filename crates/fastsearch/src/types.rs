//! Value types produced by a search: file descriptors, batches and summaries.

use std::fs;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::time::{Duration, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// File type enumeration.
///
/// Directories never appear here: they are traversed, not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Symlink,
    Other,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }

    pub(crate) fn from_fs(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// A file discovered during a directory listing.
///
/// Metadata fields are `None` when the metadata query failed, typically
/// because the file vanished between listing and stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
    pub size: Option<u64>,
    /// Modification time in unix seconds.
    pub modified_at: Option<u64>,
}

impl FileEntry {
    pub(crate) fn from_dir_entry(entry: &fs::DirEntry, file_type: fs::FileType) -> Self {
        let metadata = entry.metadata().ok();
        Self {
            path: entry.path(),
            name: entry.file_name().to_string_lossy().into_owned(),
            file_type: FileType::from_fs(file_type),
            size: metadata.as_ref().map(fs::Metadata::len),
            modified_at: metadata.as_ref().and_then(modified_secs),
        }
    }
}

fn modified_secs(metadata: &fs::Metadata) -> Option<u64> {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
}

/// One batch of matches, all found directly inside `folder`.
///
/// `files` is never empty and is ordered by file name.
#[derive(Debug, Clone)]
pub struct FilesFound {
    pub folder: PathBuf,
    pub files: Vec<FileEntry>,
}

/// Counters collected over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Directories successfully listed.
    pub scanned_dirs: usize,
    /// Files delivered in batches.
    pub matched_files: usize,
    /// Batches emitted.
    pub batches: usize,
    /// Directories whose listing failed transiently and contributed nothing.
    pub skipped_dirs: usize,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.scanned_dirs += other.scanned_dirs;
        self.matched_files += other.matched_files;
        self.batches += other.batches;
        self.skipped_dirs += other.skipped_dirs;
    }
}

/// What a successful (or suppressed-cancellation) `start_search` returns.
#[derive(Debug, Clone, Copy)]
pub struct SearchSummary {
    /// Whether the traversal was cut short by cancellation.
    pub cancelled: bool,
    pub stats: SearchStats,
    pub elapsed: Duration,
}
