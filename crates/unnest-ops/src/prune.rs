//! Deleting directories whose subtree holds no files.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use serde::Serialize;
use unnest_core::{Result, UnnestConfig, UnnestError};

use crate::progress::{ProgressEvent, Reporter};
use crate::search::list_dir;

/// Counters for a prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    /// Directories deleted, each counted once with its whole subtree.
    pub directories_deleted: usize,
}

/// Count every non-directory entry below `dir`, at any depth.
///
/// Hidden entries are included and symlinks are not followed.
pub fn count_files_recursive(dir: &Path) -> Result<usize> {
    let walker = WalkDir::new(dir)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false);

    let mut count = 0;
    for entry in walker {
        let entry = entry.map_err(|err| UnnestError::Walk {
            path: err.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
            message: err.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

/// Deletes every descendant directory of a root that contains no files.
pub struct Pruner<'a, R: Reporter + ?Sized> {
    config: &'a UnnestConfig,
    reporter: &'a mut R,
    stats: PruneStats,
}

impl<'a, R: Reporter + ?Sized> Pruner<'a, R> {
    pub fn new(config: &'a UnnestConfig, reporter: &'a mut R) -> Self {
        Self {
            config,
            reporter,
            stats: PruneStats::default(),
        }
    }

    /// Counters so far, including work done before an error.
    pub fn stats(&self) -> PruneStats {
        self.stats
    }

    /// Prune the tree below `root`. The root itself is never deleted.
    ///
    /// At each level the empty subdirectories are deleted first, then the
    /// survivors are descended into to find empty pockets next to files.
    pub fn prune(&mut self, root: &Path) -> Result<PruneStats> {
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut survivors = Vec::new();
            for subdir in list_dir(&dir)?.dirs {
                if count_files_recursive(&subdir)? == 0 {
                    self.delete_dir(&subdir)?;
                } else {
                    survivors.push(subdir);
                }
            }
            // Reversed so the first survivor is visited next
            pending.extend(survivors.into_iter().rev());
        }

        tracing::debug!(stats = ?self.stats, "prune pass complete");
        Ok(self.stats)
    }

    fn delete_dir(&mut self, path: &Path) -> Result<()> {
        self.delete_dir_with(path, |p| fs::remove_dir_all(p))
    }

    /// Delete `path` with `remove`, retrying per the config.
    fn delete_dir_with(
        &mut self,
        path: &Path,
        mut remove: impl FnMut(&Path) -> io::Result<()>,
    ) -> Result<()> {
        let mut attempts = 0;
        let reporter = &mut *self.reporter;

        retry_with_backoff(
            self.config,
            || {
                attempts += 1;
                match remove(path) {
                    // Already gone after a partially failed attempt
                    Err(e) if e.kind() == io::ErrorKind::NotFound && attempts > 1 => Ok(()),
                    result => result,
                }
            },
            |attempt, err| {
                tracing::warn!(path = %path.display(), attempt, error = %err, "delete failed, retrying");
                reporter.report(ProgressEvent::DeleteRetry {
                    path: path.to_path_buf(),
                    attempt,
                    error: err.to_string(),
                });
            },
        )
        .map_err(|e| UnnestError::io(path, e))?;

        self.stats.directories_deleted += 1;
        self.reporter.report(ProgressEvent::DeletedEmpty {
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

/// Run `op`, retrying failures up to `config.delete_retries` times with
/// doubling backoff. `on_retry` sees each failure that will be retried.
pub(crate) fn retry_with_backoff<T>(
    config: &UnnestConfig,
    mut op: impl FnMut() -> io::Result<T>,
    mut on_retry: impl FnMut(u32, &io::Error),
) -> io::Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.delete_retries => {
                attempt += 1;
                on_retry(attempt, &err);
                std::thread::sleep(config.retry_backoff(attempt));
            }
            Err(err) => return Err(err),
        }
    }
}
