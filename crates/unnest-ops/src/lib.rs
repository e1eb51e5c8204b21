//! Flatten and prune operations for unnest.
//!
//! The flattener collapses single-child directory chains under each immediate
//! subdirectory of a root, and the pruner deletes every subdirectory whose
//! subtree holds no files. Both run sequentially on the calling thread and
//! report what they do through a [`Reporter`].

mod conflict;
mod flatten;
mod move_op;
mod pipeline;
mod progress;
mod prune;
mod search;

pub use conflict::auto_rename_path;
pub use flatten::{FlattenStats, Flattener};
pub use move_op::{MoveOutcome, move_entry};
pub use pipeline::{RunOutcome, RunSummary, run};
pub use progress::{ConsoleReporter, MemoryReporter, OutputFormat, Phase, ProgressEvent, Reporter};
pub use prune::{PruneStats, Pruner, count_files_recursive};
pub use search::{find_valid_directory, list_dir};
