//! unnest - collapse single-child directory chains and prune empty directories.
//!
//! Usage:
//!   unnest <DIR>                      Flatten, wait, then prune DIR
//!   unnest <DIR> --on-conflict skip   Leave colliding entries in place
//!   unnest <DIR> --format json        Emit progress as JSON lines
//!   unnest --help                     Show help
//!
//! The process always exits with status 0 once arguments are parsed; a failed
//! run prints one line explaining why.

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use unnest_core::{ConflictPolicy, UnnestConfig};
use unnest_ops::{ConsoleReporter, OutputFormat};

const USAGE: &str = "usage: unnest <dir>";

#[derive(Parser)]
#[command(
    name = "unnest",
    version,
    about = "Collapse single-child directory chains",
    long_about = "unnest walks every immediate subdirectory of DIR. When a subdirectory \
                  only wraps a chain of single-child directories, the contents of the \
                  first meaningful level are moved up into it.\n\n\
                  After a short settle delay, every directory that holds no files \
                  anywhere in its subtree is deleted. DIR itself is never deleted."
)]
struct Cli {
    /// Directory whose subdirectories are flattened
    dir: PathBuf,

    /// Pause between flattening and pruning, in milliseconds
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// What to do when a moved entry's name is already taken
    #[arg(long, value_enum, value_name = "POLICY")]
    on_conflict: Option<ConflictArg>,

    /// Extra attempts for a failed delete
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// TOML file with default settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Progress output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Log diagnostics to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictArg {
    Fail,
    Skip,
    Rename,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Fail => Self::Fail,
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Rename => Self::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum FormatArg {
    #[default]
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => {
            println!("{USAGE}");
            eprint!("{err}");
            return Ok(());
        }
    };

    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            println!("{err:#}");
            return Ok(());
        }
    };
    tracing::debug!(?config, dir = %cli.dir.display(), "starting run");

    let mut reporter = ConsoleReporter::stdout(cli.format.into());
    let outcome = unnest_ops::run(&cli.dir, &config, &mut reporter);
    if let Some(message) = outcome.message() {
        tracing::info!(error = message, "run failed");
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "unnest=info",
        _ => "unnest=debug",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

/// Defaults, then the config file, then explicit flags.
fn build_config(cli: &Cli) -> Result<UnnestConfig> {
    let base = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => UnnestConfig::default(),
    };

    let config = UnnestConfig::builder()
        .settle_delay_ms(cli.settle_ms.unwrap_or(base.settle_delay_ms))
        .conflict_policy(cli.on_conflict.map_or(base.conflict_policy, Into::into))
        .delete_retries(cli.retries.unwrap_or(base.delete_retries))
        .retry_backoff_ms(base.retry_backoff_ms)
        .build()
        .context("Invalid configuration")?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<UnnestConfig> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = UnnestConfig::from_toml_str(&input)?;
    Ok(config)
}
