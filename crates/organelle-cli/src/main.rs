//! Organelle CLI - inspect and convert snapshot documents.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use organelle::prelude::Format;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "organelle")]
#[command(author, version, about = "Organelle - snapshot inspection and conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (forces debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default organelle.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Convert a snapshot document between formats
    Transcode {
        /// Snapshot file to read
        file: String,

        /// Input format (default: from the file extension, then the configured default)
        #[arg(short, long)]
        from: Option<Format>,

        /// Output format
        #[arg(short, long)]
        to: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print a snapshot tree and node statistics
    Inspect {
        /// Snapshot file to read
        file: String,

        /// Input format (default: from the file extension, then the configured default)
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Show the effective configuration
    Config,
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Transcode { file, from, to, output } => {
            commands::transcode::run(&config, &file, from, to, output.as_deref())
        }
        Commands::Inspect { file, format } => commands::inspect::run(&config, &file, format),
        Commands::Config => commands::config::run(&config),
    }
}
