//! CLI command handlers.
//!
//! Every handler prints its result on stdout. Logs go to the configured log
//! sink.

mod auth;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use epub_downloader::config::{AppPaths, Config};

use crate::cli::{AuthCommand, Command, ConfigCommand};

pub use auth::{run_auth_clear_command, run_auth_import_command, run_auth_status_command};
pub use config::run_config_show_command;

/// Resolved state every command runs against.
#[derive(Debug)]
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub paths: AppPaths,
    pub base_url: String,
}

/// Runs `command` to completion.
pub async fn dispatch(command: &Command, ctx: &CommandContext) -> Result<()> {
    match command {
        Command::Auth { command } => match command {
            AuthCommand::Import(args) => run_auth_import_command(&args.source, ctx).await,
            AuthCommand::Status => run_auth_status_command(ctx).await,
            AuthCommand::Clear => run_auth_clear_command(ctx),
        },
        Command::Config { command } => match command {
            ConfigCommand::Show => run_config_show_command(ctx),
        },
    }
}
