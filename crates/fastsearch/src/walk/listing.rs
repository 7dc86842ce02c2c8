//! Listing a single directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::FileEntry;

/// The direct contents of one directory, split by kind.
///
/// Both lists are sorted by name. Symlinks land in `files`, even when they
/// point at a directory, so they are never followed.
#[derive(Debug, Default)]
pub struct DirListing {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<FileEntry>,
}

/// Reads `folder` once and classifies every entry.
///
/// Any failure, including one surfacing mid-iteration, aborts the listing;
/// the caller decides whether it is transient.
pub fn read_listing(folder: &Path) -> io::Result<DirListing> {
    let mut listing = DirListing::default();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            listing.dirs.push(entry.path());
        } else {
            listing.files.push(FileEntry::from_dir_entry(&entry, file_type));
        }
    }

    listing.dirs.sort_unstable();
    listing.files.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn splits_dirs_and_files_sorted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("zeta")).unwrap();
        fs::create_dir(temp.path().join("alpha")).unwrap();
        File::create(temp.path().join("b.txt")).unwrap();
        File::create(temp.path().join("a.txt")).unwrap();

        let listing = read_listing(temp.path()).unwrap();

        assert_eq!(
            listing.dirs,
            vec![temp.path().join("alpha"), temp.path().join("zeta")]
        );
        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn empty_directory() {
        let temp = TempDir::new().unwrap();
        let listing = read_listing(temp.path()).unwrap();
        assert!(listing.dirs.is_empty());
        assert!(listing.files.is_empty());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let error = read_listing(&temp.path().join("gone")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_listed_as_file() {
        use crate::types::FileType;

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let listing = read_listing(temp.path()).unwrap();

        assert_eq!(listing.dirs, vec![temp.path().join("real")]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "link");
        assert_eq!(listing.files[0].file_type, FileType::Symlink);
    }
}
