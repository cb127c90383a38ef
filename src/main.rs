//! uberpack - bundles the stylesheets and scripts an html page links.

mod asset;
mod cli;
mod config;
mod core;
mod diagnostics;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::BundlerConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    core::setup_shutdown_handler(cli.is_watch())?;

    let config = BundlerConfig::load(&cli)?;

    match &cli.command {
        Commands::Init { dry } => cli::init::init(&config, *dry),
        Commands::Build { .. } => cli::build::build(&config),
        Commands::Watch { .. } => cli::watch::watch(&config),
    }
}
