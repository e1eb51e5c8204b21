//! Directory classification for the chain walk.

use std::path::{Path, PathBuf};

/// Direct contents of one directory, split by kind.
///
/// Anything that is not a directory (regular files, symlinks, sockets, ...)
/// lands in `files`. Symlinks to directories are never followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Non-directory entries.
    pub files: Vec<PathBuf>,
    /// Subdirectories.
    pub dirs: Vec<PathBuf>,
}

/// How a directory behaves during the search for a valid directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirClass {
    /// At least one file, or more than one subdirectory.
    Valid,
    /// No files and exactly one subdirectory; the walk continues into `child`.
    PassThrough { child: PathBuf },
    /// No files and no subdirectories.
    Empty,
}

impl DirListing {
    /// Number of direct non-directory entries.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of direct subdirectories.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// All direct entries, directories first.
    pub fn entries(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().chain(self.files.iter()).map(PathBuf::as_path)
    }

    /// Classify the directory this listing was taken from.
    pub fn classify(&self) -> DirClass {
        match (self.file_count(), self.dir_count()) {
            (0, 0) => DirClass::Empty,
            (0, 1) => DirClass::PassThrough {
                child: self.dirs[0].clone(),
            },
            _ => DirClass::Valid,
        }
    }
}

impl DirClass {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}
