//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Pageswap pagination controller CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load and validate a controller config
    #[command(visible_alias = "c")]
    Check {
        /// Config file path
        #[arg(default_value = "pageswap.toml", value_hint = clap::ValueHint::FilePath)]
        config: PathBuf,
    },

    /// Drive a controller through a scripted scenario and print the result
    #[command(visible_alias = "r")]
    Replay {
        #[command(flatten)]
        args: ReplayArgs,
    },
}

/// Replay command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Scenario file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub scenario: PathBuf,

    /// Print the full document instead of the replaced region
    #[arg(short, long)]
    pub full: bool,

    /// Print the report as JSON
    #[arg(short, long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::try_parse_from(["pageswap", "--verbose", "replay", "s.toml", "--json"]).unwrap();
        assert!(cli.verbose);
        let Commands::Replay { args } = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.scenario, PathBuf::from("s.toml"));
        assert!(args.json);
        assert!(!args.full);
    }

    #[test]
    fn test_check_default_path() {
        let cli = Cli::try_parse_from(["pageswap", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check { config } if config == PathBuf::from("pageswap.toml")
        ));
    }
}
