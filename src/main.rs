use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

#[derive(Parser)]
#[command(
    name = "loopnest",
    version,
    about = "loopnest: nested loop kernels on host and emulated device"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tiled shared-memory matrix transpose
    Transpose {
        /// Execution place: host (0) or device (1); overrides the config
        #[arg(long)]
        place: Option<String>,
        /// Rows of the input matrix
        #[arg(long, default_value_t = 267)]
        rows: usize,
        /// Columns of the input matrix
        #[arg(long, default_value_t = 251)]
        cols: usize,
        /// Tile edge (threads per team along x and y)
        #[arg(long, default_value_t = 16)]
        tile: usize,
        /// Launch config (TOML)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Print device limits as a TOML [device] table
    Limits {
        /// Query the first wgpu adapter instead of printing defaults
        #[arg(long)]
        probe: bool,
    },
    /// Show launch requirements and the fitted grid of a sample kernel
    Dims {
        /// Rows (grid-stride over blocks)
        #[arg(long, default_value_t = 1000)]
        rows: i64,
        /// Columns (block-stride over threads)
        #[arg(long, default_value_t = 1000)]
        cols: i64,
        /// Batch (one thread per item along y)
        #[arg(long, default_value_t = 4)]
        batch: i64,
        /// Launch config (TOML) supplying device limits
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Transpose {
            place,
            rows,
            cols,
            tile,
            config,
        } => cli::transpose::cmd_transpose(place, rows, cols, tile, config),
        Command::Limits { probe } => cli::limits::cmd_limits(probe),
        Command::Dims {
            rows,
            cols,
            batch,
            config,
        } => cli::dims::cmd_dims(rows, cols, batch, config),
    }
}
