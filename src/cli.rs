//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use epub_downloader::api::DEFAULT_BASE_URL;

/// Download subscription books as EPUB from the terminal.
///
/// Without a command the interactive client starts.
#[derive(Parser, Debug)]
#[command(name = "epub-downloader")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Service origin
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL, global = true, hide = true)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage saved session cookies
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Validate exported browser cookies and save them
    Import(ImportArgs),
    /// Validate the saved cookies against the service
    Status,
    /// Delete the saved cookies
    Clear,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON cookie export to read, or '-' for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub source: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration and paths
    Show,
}

impl Cli {
    /// Log level implied by the verbosity flags, if any was given.
    #[must_use]
    pub fn level_override(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
