//! Command-line interface definition for porttrack.
//!
//! This module defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// porttrack - ship tracking demo service
#[derive(Debug, Parser)]
#[command(name = "porttrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "PORTTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Returns the log level forced by `-v`/`-q`, if any.
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }

        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Returns the subcommand, falling back to `serve` with defaults.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `serve` subcommand.
///
/// Unset flags leave the configured value alone.
#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Bind address
    #[arg(long)]
    pub bind: Option<String>,

    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,
}

/// Configuration subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommands {
    /// Validate the effective configuration
    Validate,

    /// Print the effective configuration as YAML
    Show,
}
