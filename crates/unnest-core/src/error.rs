//! Error types for flatten and prune operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias used throughout the unnest crates.
pub type Result<T, E = UnnestError> = std::result::Result<T, E>;

/// Errors that can occur while flattening or pruning a tree.
#[derive(Debug, Error)]
pub enum UnnestError {
    /// Target directory does not exist or is not a directory.
    #[error("Directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure while walking a subtree.
    #[error("Failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    /// The destination of a move is already taken.
    #[error("Cannot move {} to {}: {kind}", entry.display(), destination.display())]
    MoveConflict {
        entry: PathBuf,
        destination: PathBuf,
        kind: ConflictKind,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl UnnestError {
    /// Create an I/O error with path context.
    ///
    /// Only permission failures get their own variant. A missing path here
    /// may be a file, so it stays a plain `Io` error; `NotFound` is reserved
    /// for the run's root directory.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// What already occupies the destination of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// A file already exists at the destination.
    FileExists,
    /// A directory already exists at the destination.
    DirectoryExists,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileExists => write!(f, "File already exists"),
            Self::DirectoryExists => write!(f, "Directory already exists"),
        }
    }
}
