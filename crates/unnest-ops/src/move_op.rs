//! Moving a single entry up into its new parent.

use std::fs;
use std::path::{Path, PathBuf};

use unnest_core::{ConflictKind, ConflictPolicy, Result, UnnestError};

use crate::conflict::{auto_rename_path, path_taken};

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The entry was renamed to `to`.
    Moved {
        from: PathBuf,
        to: PathBuf,
        is_dir: bool,
    },
    /// The destination was taken and the entry was left in place.
    Skipped { from: PathBuf, destination: PathBuf },
}

/// Move `source` into `dest_dir`, keeping its base name.
///
/// This is a plain rename, so a directory carries its whole subtree along in
/// one step and nothing is copied. `fs::rename` would silently replace an
/// existing file on some platforms, so the destination is checked first and
/// handled according to `policy`.
pub fn move_entry(source: &Path, dest_dir: &Path, policy: ConflictPolicy) -> Result<MoveOutcome> {
    let name = source.file_name().ok_or_else(|| {
        UnnestError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let is_dir = source
        .symlink_metadata()
        .map_err(|e| UnnestError::io(source, e))?
        .is_dir();

    let mut dest = dest_dir.join(name);
    if path_taken(&dest) {
        let kind = if dest.symlink_metadata().is_ok_and(|m| m.is_dir()) {
            ConflictKind::DirectoryExists
        } else {
            ConflictKind::FileExists
        };

        match policy {
            ConflictPolicy::Fail => {
                return Err(UnnestError::MoveConflict {
                    entry: source.to_path_buf(),
                    destination: dest,
                    kind,
                });
            }
            ConflictPolicy::Skip => {
                tracing::warn!(
                    source = %source.display(),
                    destination = %dest.display(),
                    "destination exists, leaving entry in place"
                );
                return Ok(MoveOutcome::Skipped {
                    from: source.to_path_buf(),
                    destination: dest,
                });
            }
            ConflictPolicy::Rename => {
                dest = auto_rename_path(&dest).ok_or_else(|| UnnestError::MoveConflict {
                    entry: source.to_path_buf(),
                    destination: dest.clone(),
                    kind,
                })?;
            }
        }
    }

    fs::rename(source, &dest).map_err(|e| UnnestError::io(source, e))?;

    Ok(MoveOutcome::Moved {
        from: source.to_path_buf(),
        to: dest,
        is_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_file() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("deep");
        fs::create_dir(&src_dir).unwrap();
        fs::write(src_dir.join("x.txt"), "hello").unwrap();

        let outcome =
            move_entry(&src_dir.join("x.txt"), temp.path(), ConflictPolicy::Fail).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: src_dir.join("x.txt"),
                to: temp.path().join("x.txt"),
                is_dir: false,
            }
        );
        assert_eq!(fs::read_to_string(temp.path().join("x.txt")).unwrap(), "hello");
        assert!(!src_dir.join("x.txt").exists());
    }

    #[test]
    fn test_move_dir_carries_subtree() {
        let temp = TempDir::new().unwrap();
        let inner = temp.path().join("deep").join("inner");
        fs::create_dir_all(inner.join("nested")).unwrap();
        fs::write(inner.join("nested").join("y.txt"), "y").unwrap();

        let outcome = move_entry(&inner, temp.path(), ConflictPolicy::Fail).unwrap();

        assert!(matches!(outcome, MoveOutcome::Moved { is_dir: true, .. }));
        assert!(temp.path().join("inner").join("nested").join("y.txt").exists());
        assert!(!inner.exists());
    }

    #[test]
    fn test_vanished_source_is_plain_io_error() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("deep").join("gone.txt");

        let err = move_entry(&gone, temp.path(), ConflictPolicy::Fail).unwrap_err();

        assert!(matches!(err, UnnestError::Io { .. }));
        assert!(!err.to_string().starts_with("Directory not found"));
    }

    #[test]
    fn test_conflict_fail() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("deep");
        fs::create_dir(&src_dir).unwrap();
        fs::write(src_dir.join("x.txt"), "new").unwrap();
        fs::write(temp.path().join("x.txt"), "old").unwrap();

        let err = move_entry(&src_dir.join("x.txt"), temp.path(), ConflictPolicy::Fail).unwrap_err();

        assert!(matches!(
            err,
            UnnestError::MoveConflict {
                kind: ConflictKind::FileExists,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(temp.path().join("x.txt")).unwrap(), "old");
        assert!(src_dir.join("x.txt").exists());
    }

    #[test]
    fn test_conflict_skip() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("deep");
        fs::create_dir_all(src_dir.join("data")).unwrap();
        fs::create_dir(temp.path().join("data")).unwrap();

        let outcome =
            move_entry(&src_dir.join("data"), temp.path(), ConflictPolicy::Skip).unwrap();

        assert!(matches!(outcome, MoveOutcome::Skipped { .. }));
        assert!(src_dir.join("data").exists());
    }

    #[test]
    fn test_conflict_rename() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("deep");
        fs::create_dir(&src_dir).unwrap();
        fs::write(src_dir.join("x.txt"), "new").unwrap();
        fs::write(temp.path().join("x.txt"), "old").unwrap();

        let outcome =
            move_entry(&src_dir.join("x.txt"), temp.path(), ConflictPolicy::Rename).unwrap();

        let renamed = temp.path().join("x (1).txt");
        assert!(matches!(outcome, MoveOutcome::Moved { ref to, .. } if *to == renamed));
        assert_eq!(fs::read_to_string(&renamed).unwrap(), "new");
        assert_eq!(fs::read_to_string(temp.path().join("x.txt")).unwrap(), "old");
    }
}
