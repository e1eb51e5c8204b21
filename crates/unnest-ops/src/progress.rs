//! Progress events and the sinks that receive them.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::RunSummary;

/// The two phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Flatten,
    Prune,
}

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A phase is starting.
    PhaseStarted { phase: Phase },
    /// An immediate subdirectory of the root is about to be examined.
    DirectoryFound { path: PathBuf },
    /// A deeper valid directory was found below a subdirectory.
    ValidFound { path: PathBuf },
    /// A directory was moved up.
    MovedDir { from: PathBuf, to: PathBuf },
    /// A file was moved up.
    MovedFile { from: PathBuf, to: PathBuf },
    /// All entries of a subdirectory's valid directory were handled.
    SubdirFinished { path: PathBuf, moved: usize },
    /// An entry was left in place because its destination is taken.
    Skipped { path: PathBuf, destination: PathBuf },
    /// Waiting between phases.
    Settling { millis: u64 },
    /// A directory without files was deleted.
    DeletedEmpty { path: PathBuf },
    /// Deleting a directory failed and will be retried.
    DeleteRetry { path: PathBuf, attempt: u32, error: String },
    /// The run stopped on an error.
    Failed { message: String },
    /// The run completed.
    Finished { summary: RunSummary },
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhaseStarted {
                phase: Phase::Flatten,
            } => write!(f, "Flattening directories..."),
            Self::PhaseStarted { phase: Phase::Prune } => {
                write!(f, "Deleting empty directories...")
            }
            Self::DirectoryFound { path } => write!(f, "Dir: {}", path.display()),
            Self::ValidFound { path } => write!(f, "Valid dir found: {}", path.display()),
            Self::MovedDir { from, to } => {
                write!(f, "Move dir: {} to {}", from.display(), to.display())
            }
            Self::MovedFile { from, to } => {
                write!(f, "Move file: {} to {}", from.display(), to.display())
            }
            // Blank separator after each flattened subdirectory
            Self::SubdirFinished { .. } => Ok(()),
            Self::Skipped { path, destination } => write!(
                f,
                "Skip: {} ({} already exists)",
                path.display(),
                destination.display()
            ),
            Self::Settling { millis } => {
                write!(f, "Waiting {millis}ms for the file system to settle...")
            }
            Self::DeletedEmpty { path } => write!(f, "Delete empty dir: {}", path.display()),
            Self::DeleteRetry {
                path,
                attempt,
                error,
            } => write!(
                f,
                "Retrying delete of {} (attempt {attempt}): {error}",
                path.display()
            ),
            Self::Failed { message } => write!(f, "{message}"),
            Self::Finished { summary } => write!(f, "{summary}"),
        }
    }
}

/// Receives progress events from the flattener, the pruner and the pipeline.
pub trait Reporter {
    fn report(&mut self, event: ProgressEvent);
}

/// How a [`ConsoleReporter`] renders events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per event.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Writes events to a stream, stdout in the binary.
///
/// Write errors are ignored: progress output never aborts a run.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl ConsoleReporter<std::io::Stdout> {
    /// Create a reporter writing to standard output.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Create a reporter writing to `writer`.
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: ProgressEvent) {
        let _ = match self.format {
            OutputFormat::Text => {
                // Blank line between phases, like a section break
                if matches!(
                    event,
                    ProgressEvent::PhaseStarted { phase: Phase::Prune }
                ) {
                    let _ = writeln!(self.writer);
                }
                writeln!(self.writer, "{event}")
            }
            OutputFormat::Json => match serde_json::to_string(&event) {
                Ok(line) => writeln!(self.writer, "{line}"),
                Err(_) => Ok(()),
            },
        };
        let _ = self.writer.flush();
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Vec<ProgressEvent>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order.
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Events rendered as text lines.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}
