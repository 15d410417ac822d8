//! Command-line interface for crev
//!
//! Provides the `sum` command and its `repo` and `pr` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod sum;
mod utils;

/// Summarize repositories and pull requests with an LLM, caching every stage
#[derive(Parser)]
#[command(name = "crev")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root holding the configuration, repos/ and data/
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    workspace: PathBuf,

    /// Configuration file (defaults to configs.json in the workspace)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize repositories and pull requests
    ///
    /// Without a subcommand, summarizes every configured repository and then
    /// every configured pull request.
    Sum(sum::SumArgs),
}

pub fn run() -> Result<()> {
    let Cli { command, verbose, workspace, config } = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match command {
        Commands::Sum(args) => sum::run(args, &workspace, config.as_deref()),
    }
}
