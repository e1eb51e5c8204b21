//! The flatten, settle, prune sequence.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use unnest_core::{Result, UnnestConfig, UnnestError};

use crate::flatten::{FlattenStats, Flattener};
use crate::progress::{Phase, ProgressEvent, Reporter};
use crate::prune::{PruneStats, Pruner};

/// Work done by a run, complete or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub flatten: FlattenStats,
    pub prune: PruneStats,
    pub elapsed: Duration,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Flattened {} directories ({} entries moved",
            self.flatten.directories_flattened, self.flatten.entries_moved
        )?;
        if self.flatten.entries_skipped > 0 {
            write!(f, ", {} skipped", self.flatten.entries_skipped)?;
        }
        write!(
            f,
            "), deleted {} empty directories in {:.2}s",
            self.prune.directories_deleted,
            self.elapsed.as_secs_f64()
        )
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both phases finished.
    Completed(RunSummary),
    /// The run stopped at the first error. Changes made before it remain.
    Failed { message: String, summary: RunSummary },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Completed(summary) | Self::Failed { summary, .. } => summary,
        }
    }

    /// The error message of a failed run.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

/// Flatten every immediate subdirectory of `root`, wait for the file system
/// to settle, then prune directories without files.
///
/// Every error is caught here and returned as [`RunOutcome::Failed`]; the
/// failure is also reported as a [`ProgressEvent::Failed`].
pub fn run<R: Reporter + ?Sized>(
    root: &Path,
    config: &UnnestConfig,
    reporter: &mut R,
) -> RunOutcome {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    let result = run_phases(root, config, &mut *reporter, &mut summary);
    summary.elapsed = start.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(?summary, "run complete");
            reporter.report(ProgressEvent::Finished { summary });
            RunOutcome::Completed(summary)
        }
        Err(err) => {
            let message = err.to_string();
            tracing::debug!(error = ?err, "run aborted");
            reporter.report(ProgressEvent::Failed {
                message: message.clone(),
            });
            RunOutcome::Failed { message, summary }
        }
    }
}

fn run_phases<R: Reporter + ?Sized>(
    root: &Path,
    config: &UnnestConfig,
    reporter: &mut R,
    summary: &mut RunSummary,
) -> Result<()> {
    check_root(root)?;

    reporter.report(ProgressEvent::PhaseStarted {
        phase: Phase::Flatten,
    });
    let mut flattener = Flattener::new(config, &mut *reporter);
    let flattened = flattener.flatten(root);
    summary.flatten = flattener.stats();
    flattened?;

    let settle = config.settle_delay();
    reporter.report(ProgressEvent::Settling {
        millis: config.settle_delay_ms,
    });
    if !settle.is_zero() {
        std::thread::sleep(settle);
    }

    reporter.report(ProgressEvent::PhaseStarted { phase: Phase::Prune });
    let mut pruner = Pruner::new(config, &mut *reporter);
    let pruned = pruner.prune(root);
    summary.prune = pruner.stats();
    pruned?;

    Ok(())
}

/// Anything other than an existing directory counts as not found.
fn check_root(root: &Path) -> Result<()> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        _ => Err(UnnestError::NotFound {
            path: root.to_path_buf(),
        }),
    }
}
