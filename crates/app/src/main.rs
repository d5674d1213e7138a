//! httpiness - command-line entry point
//!
//! Loads settings, initializes logging and dispatches to a subcommand.

mod cli;
mod commands;
mod services;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::services::{Services, load_settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref()).await?;
    init_tracing(&settings.log_filter);

    let mut services = Services::new(&settings)?;
    commands::run(cli.command, &mut services).await
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
