//! Seedwright CLI - Export object graphs as YAML fixtures

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{completions, config as config_cmd, export};

#[derive(Parser)]
#[command(name = "seedwright")]
#[command(author, version, about = "Export persistent object graphs as YAML fixtures")]
pub struct Cli {
    /// Config file (default: <config dir>/seedwright/config.toml)
    #[arg(long, env = "SEEDWRIGHT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_file_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a snapshot as a YAML fixture document
    Export(export::ExportArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting seedwright CLI");

    match &cli.command {
        Commands::Export(args) => export::run(args, &cli)?,
        Commands::Config(args) => config_cmd::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
