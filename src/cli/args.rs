//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// kiln front-end asset build CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clean, build everything, then watch and serve with live reload
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        serve_args: ServeArgs,
    },

    /// Clean and build everything once
    #[command(visible_alias = "b")]
    Build,

    /// Delete the output directory
    #[command(visible_alias = "c")]
    Clean,
}

/// Development server arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Resolved command, `dev` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            serve_args: ServeArgs::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_dev() {
        let cli = Cli::parse_from(["kiln"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.command(), Commands::Dev { .. }));
    }

    #[test]
    fn test_clean_command() {
        let cli = Cli::parse_from(["kiln", "clean"]);
        assert!(matches!(cli.command(), Commands::Clean));
    }

    #[test]
    fn test_dev_port_override() {
        let cli = Cli::parse_from(["kiln", "dev", "--port", "4000"]);
        match cli.command() {
            Commands::Dev { serve_args } => assert_eq!(serve_args.port, Some(4000)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["kiln", "build", "-C", "site/kiln.toml"]);
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
        assert!(matches!(cli.command(), Commands::Build));
    }
}
