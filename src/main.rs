//! Pageswap CLI.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use pageswap::cli::{Cli, Commands, check, replay};
use pageswap::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Check { config } => check::check_config(config).map(|_| ()),
        Commands::Replay { args } => replay::run_replay(args),
    }
}
