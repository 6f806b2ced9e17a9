//! RiskMatrix CLI: terminal front end for the risk scoring engine.
//!
//! Scores cells, evaluates JSON risk records, and renders the 5x5 matrix.
//! All business rules live in `riskmatrix-core`.

mod commands;
mod render;

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// RiskMatrix: inherent and residual risk scoring on a 5x5 grid
#[derive(Parser, Debug)]
#[command(name = "riskmatrix", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (reads `.riskmatrix/config.toml`)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path, merged over user and workspace config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for JSON log files (file logging is off without it)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Inherent score and level of a single cell
    Score {
        /// Frequency rating (1-5)
        frequency: i64,
        /// Impact rating (1-5)
        impact: i64,
    },
    /// Evaluate a JSON risk record (or an array of them); `-` reads stdin
    Evaluate {
        input: PathBuf,
        /// Print an inherent vs residual comparison instead of the records
        #[arg(long)]
        compare: bool,
    },
    /// Place a scalar score on the grid
    Resolve { target: f64 },
    /// Render the 5x5 matrix with levels and the tolerance boundary
    Matrix {
        #[arg(short, long, value_enum, default_value_t = MatrixArg::Inherente)]
        kind: MatrixArg,
    },
    /// Edit the tolerance set
    Tolerance {
        #[command(subcommand)]
        action: ToleranceAction,
    },
    /// Edit per-cell level assignments
    Level {
        #[command(subcommand)]
        action: LevelAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MatrixArg {
    Inherente,
    Residual,
}

impl From<MatrixArg> for riskmatrix_core::MatrixKind {
    fn from(arg: MatrixArg) -> Self {
        match arg {
            MatrixArg::Inherente => riskmatrix_core::MatrixKind::Inherente,
            MatrixArg::Residual => riskmatrix_core::MatrixKind::Residual,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ToleranceAction {
    /// List tolerable cells
    List,
    /// Flip a cell (`prob-imp`) in the workspace config
    Toggle { cell: String },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum LevelAction {
    /// Advance a cell (`prob-imp`) to the next palette level
    Cycle {
        #[arg(value_enum)]
        kind: MatrixArg,
        cell: String,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show effective configuration
    Show,
    /// Print config file locations
    Path,
}

/// Daily rolling writer under `log_dir`; `None` leaves the filesystem alone.
fn json_log_writer(
    log_dir: Option<&Path>,
) -> std::io::Result<Option<(NonBlocking, WorkerGuard)>> {
    let Some(log_dir) = log_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "riskmatrix.log");
    Ok(Some(tracing_appender::non_blocking(file_appender)))
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging, only when a log directory is given
    let (json_layer, _guard) = match json_log_writer(cli.log_dir.as_deref())? {
        Some((non_blocking, guard)) => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref())
}
