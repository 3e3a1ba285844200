//! CLI command definitions for the `mforge` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Build custom bootable mining ISOs over HTTP.
#[derive(Parser)]
#[command(name = "mforge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to the builder config file (defaults to ~/.minerforge/config.toml).
    #[arg(long, global = true, env = "MINERFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the ISO builder HTTP server.
    Serve {
        /// Address to bind (overrides the config file).
        #[arg(long, env = "MINERFORGE_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides the config file).
        #[arg(short, long, env = "MINERFORGE_PORT")]
        port: Option<u16>,
    },

    /// Validate a build request file and print the effective build config.
    Validate {
        /// JSON file holding a build request.
        file: PathBuf,
    },

    /// Show the resolved builder configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::parse_from(["mforge", "-v", "serve", "--port", "3000"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(3000));
            }
            _ => panic!("expected serve"),
        }
    }
}
