//! Collapsing single-child directory chains.

use std::path::Path;

use serde::Serialize;
use unnest_core::{Result, UnnestConfig};

use crate::move_op::{MoveOutcome, move_entry};
use crate::progress::{ProgressEvent, Reporter};
use crate::search::{find_valid_directory, list_dir};

/// Counters for a flatten pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlattenStats {
    /// Immediate subdirectories of the root that were examined.
    pub directories_scanned: usize,
    /// Subdirectories whose chain was collapsed.
    pub directories_flattened: usize,
    /// Entries moved up.
    pub entries_moved: usize,
    /// Entries left in place because of a name conflict.
    pub entries_skipped: usize,
}

/// Moves the contents of each subdirectory's first valid descendant up into
/// the subdirectory itself.
pub struct Flattener<'a, R: Reporter + ?Sized> {
    config: &'a UnnestConfig,
    reporter: &'a mut R,
    stats: FlattenStats,
}

impl<'a, R: Reporter + ?Sized> Flattener<'a, R> {
    pub fn new(config: &'a UnnestConfig, reporter: &'a mut R) -> Self {
        Self {
            config,
            reporter,
            stats: FlattenStats::default(),
        }
    }

    /// Counters so far, including work done before an error.
    pub fn stats(&self) -> FlattenStats {
        self.stats
    }

    /// Flatten every immediate subdirectory of `root`.
    ///
    /// Stops at the first error; entries already moved stay where they are.
    pub fn flatten(&mut self, root: &Path) -> Result<FlattenStats> {
        let subdirs = list_dir(root)?.dirs;

        for subdir in &subdirs {
            self.flatten_subdir(subdir)?;
        }

        tracing::debug!(stats = ?self.stats, "flatten pass complete");
        Ok(self.stats)
    }

    /// Flatten a single subdirectory. Returns whether anything was moved.
    pub fn flatten_subdir(&mut self, subdir: &Path) -> Result<bool> {
        self.stats.directories_scanned += 1;
        self.reporter.report(ProgressEvent::DirectoryFound {
            path: subdir.to_path_buf(),
        });

        let valid = match find_valid_directory(subdir)? {
            Some(valid) if valid != subdir => valid,
            _ => return Ok(false),
        };

        self.reporter.report(ProgressEvent::ValidFound {
            path: valid.clone(),
        });

        let listing = list_dir(&valid)?;
        let mut moved = 0;
        for entry in listing.entries() {
            match move_entry(entry, subdir, self.config.conflict_policy)? {
                MoveOutcome::Moved { from, to, is_dir } => {
                    moved += 1;
                    self.stats.entries_moved += 1;
                    let event = if is_dir {
                        ProgressEvent::MovedDir { from, to }
                    } else {
                        ProgressEvent::MovedFile { from, to }
                    };
                    self.reporter.report(event);
                }
                MoveOutcome::Skipped { from, destination } => {
                    self.stats.entries_skipped += 1;
                    self.reporter.report(ProgressEvent::Skipped {
                        path: from,
                        destination,
                    });
                }
            }
        }

        self.reporter.report(ProgressEvent::SubdirFinished {
            path: subdir.to_path_buf(),
            moved,
        });

        if moved > 0 {
            self.stats.directories_flattened += 1;
        }
        Ok(moved > 0)
    }
}
