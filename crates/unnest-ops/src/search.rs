//! Directory listing and the valid-directory search.

use std::fs;
use std::path::{Path, PathBuf};

use unnest_core::{DirClass, DirListing, Result, UnnestError};

/// List the direct entries of `dir`, split into files and subdirectories.
///
/// Entry types come from `read_dir` without following symlinks, so a link
/// to a directory is listed as a file. Both lists are sorted by path.
pub fn list_dir(dir: &Path) -> Result<DirListing> {
    let entries = fs::read_dir(dir).map_err(|e| UnnestError::io(dir, e))?;

    let mut listing = DirListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| UnnestError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| UnnestError::io(&path, e))?;
        if file_type.is_dir() {
            listing.dirs.push(path);
        } else {
            listing.files.push(path);
        }
    }

    listing.files.sort();
    listing.dirs.sort();
    Ok(listing)
}

/// Find the first valid directory along the single-child chain starting at `dir`.
///
/// Returns `dir` itself when it is already valid, the first descendant that
/// holds a file or more than one subdirectory otherwise, and `None` when the
/// chain ends in a directory with no entries at all.
pub fn find_valid_directory(dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = dir.to_path_buf();

    loop {
        let listing = list_dir(&current)?;
        tracing::debug!(
            dir = %current.display(),
            files = listing.file_count(),
            dirs = listing.dir_count(),
            "examining directory"
        );

        match listing.classify() {
            DirClass::Valid => return Ok(Some(current)),
            DirClass::PassThrough { child } => current = child,
            DirClass::Empty => return Ok(None),
        }
    }
}
