//! kiln - front-end asset build orchestrator.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod paths;
mod pipeline;
mod reload;
mod task;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::KilnConfig;
use paths::PathTable;
use reload::ReloadHandle;
use task::TaskContext;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    let config = Arc::new(KilnConfig::load(&cli)?);
    let table = Arc::new(PathTable::from_config(&config)?);

    match cli.command() {
        Commands::Dev { .. } => cli::dev::run(config, table),
        Commands::Build => cli::build::run(&offline_context(config, table)),
        Commands::Clean => cli::clean::run(&offline_context(config, table)),
    }
}

/// Context for one-shot commands: no reload server attached.
fn offline_context(config: Arc<KilnConfig>, table: Arc<PathTable>) -> TaskContext {
    TaskContext::new(config, table, ReloadHandle::disconnected())
}
