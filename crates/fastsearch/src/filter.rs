//! File filters: the pluggable predicate applied to every listed file.

use std::fmt;

use glob::{MatchOptions, Pattern};

use crate::error::{Result, SearchError};
use crate::types::FileEntry;

/// Pattern used when a search is built without an explicit filter.
pub const MATCH_ALL_PATTERN: &str = "*";

/// Decides whether a listed file belongs in the results.
///
/// Filters are shared by every worker of a session and called concurrently,
/// so they must be `Send + Sync` and free of side effects.
///
/// Any `Fn(&FileEntry) -> bool + Send + Sync` is a filter:
///
/// ```rust
/// use fastsearch::{FileEntry, FileFilter};
///
/// let large = |entry: &FileEntry| entry.size.unwrap_or(0) > 1024;
/// fn accepts(filter: &dyn FileFilter, entry: &FileEntry) -> bool {
///     filter.is_match(entry)
/// }
/// # let _ = (large, accepts);
/// ```
pub trait FileFilter: Send + Sync {
    /// Returns `true` if this entry should be reported.
    fn is_match(&self, entry: &FileEntry) -> bool;
}

impl<F> FileFilter for F
where
    F: Fn(&FileEntry) -> bool + Send + Sync,
{
    fn is_match(&self, entry: &FileEntry) -> bool {
        self(entry)
    }
}

/// Glob pattern matched against the file name (never the full path).
#[derive(Clone)]
pub struct GlobFilter {
    original: String,
    pattern: Pattern,
    options: MatchOptions,
}

impl GlobFilter {
    /// Compiles a glob pattern.
    ///
    /// # Errors
    /// * `SearchError::InvalidInput` if `pattern` is empty.
    /// * `SearchError::InvalidPattern` if the glob does not parse.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self> {
        if pattern.is_empty() {
            return Err(SearchError::InvalidInput(
                "pattern must not be empty".to_string(),
            ));
        }
        let compiled = Pattern::new(pattern).map_err(|error| SearchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: error.to_string(),
        })?;
        Ok(Self {
            original: pattern.to_string(),
            pattern: compiled,
            options: MatchOptions {
                case_sensitive,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            },
        })
    }

    /// Returns the pattern as given.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Matches a bare file name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.pattern.matches_with(name, self.options)
    }
}

impl fmt::Debug for GlobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobFilter")
            .field("pattern", &self.original)
            .field("case_sensitive", &self.options.case_sensitive)
            .finish()
    }
}

impl FileFilter for GlobFilter {
    fn is_match(&self, entry: &FileEntry) -> bool {
        self.matches_name(&entry.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;
    use std::path::PathBuf;

    fn entry(name: &str, size: u64) -> FileEntry {
        FileEntry {
            path: PathBuf::from("/data").join(name),
            name: name.to_string(),
            file_type: FileType::File,
            size: Some(size),
            modified_at: None,
        }
    }

    #[test]
    fn star_matches_everything() {
        let filter = GlobFilter::new(MATCH_ALL_PATTERN, true).unwrap();
        assert!(filter.is_match(&entry("a.txt", 0)));
        assert!(filter.is_match(&entry(".hidden", 0)));
        assert!(filter.is_match(&entry("no_extension", 0)));
    }

    #[test]
    fn extension_pattern() {
        let filter = GlobFilter::new("*.txt", true).unwrap();
        assert!(filter.is_match(&entry("notes.txt", 0)));
        assert!(!filter.is_match(&entry("notes.md", 0)));
        assert!(!filter.is_match(&entry("notes.TXT", 0)));
    }

    #[test]
    fn case_insensitive_pattern() {
        let filter = GlobFilter::new("*.txt", false).unwrap();
        assert!(filter.is_match(&entry("NOTES.TXT", 0)));
    }

    #[test]
    fn matches_name_not_path() {
        let filter = GlobFilter::new("data*", true).unwrap();
        assert!(!filter.is_match(&entry("file.txt", 0)));
    }

    #[test]
    fn empty_pattern_rejected() {
        let error = GlobFilter::new("", true).unwrap_err();
        assert!(matches!(error, SearchError::InvalidInput(_)));
    }

    #[test]
    fn malformed_pattern_rejected() {
        let error = GlobFilter::new("[abc", true).unwrap_err();
        assert!(matches!(error, SearchError::InvalidPattern { .. }));
    }

    #[test]
    fn closures_are_filters() {
        let large = |entry: &FileEntry| entry.size.unwrap_or(0) > 10;
        let filter: &dyn FileFilter = &large;
        assert!(filter.is_match(&entry("big.bin", 11)));
        assert!(!filter.is_match(&entry("small.bin", 10)));
    }
}
