//! Destination conflict helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Whether anything, including a dangling symlink, occupies `path`.
pub(crate) fn path_taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Generate a free sibling path for `path`.
///
/// For "file.txt", tries "file (1).txt", "file (2).txt", etc. Returns `None`
/// when every candidate is taken.
pub fn auto_rename_path(path: &Path) -> Option<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path.file_stem().unwrap_or_default();
    let extension = path.extension();

    (1..=MAX_RENAME_ATTEMPTS)
        .map(|i| {
            let mut name = OsString::from(stem);
            name.push(format!(" ({i})"));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }
            parent.join(name)
        })
        .find(|candidate| !path_taken(candidate))
}
