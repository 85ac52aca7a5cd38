//! Vista CLI - Command-line interface
//!
//! Runs the dashboard proxy and drives the search feeds from a terminal.

mod commands;
mod render;

use std::path::PathBuf;

use clap::Parser;
use vista_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "vista")]
#[command(about = "Weather, news and market search backed by a same-origin proxy")]
struct Cli {
    /// Console log level; `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value_t = CliLogLevel::default())]
    log_level: CliLogLevel,

    /// Directory for the per-run trace log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    tracing::debug!("Writing trace log to {}", log_file.display());

    commands::handle_command(cli.command).await
}
