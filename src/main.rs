//! CLI entry point for the EPUB downloader.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use epub_downloader::config::{AppPaths, Config, LogContext};
use epub_downloader::errors::AppError;
use epub_downloader::tui;
use tracing::{debug, error, info};

mod cli;
mod commands;

use cli::Cli;
use commands::CommandContext;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::from_env()?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = Config::load_or_create(&config_path, &paths)?;

    // Priority: RUST_LOG env var > -q/-v flags > configured level
    let level = cli
        .level_override()
        .unwrap_or_else(|| config.log_level.as_str());
    let log = LogContext::init(level, config.log_path.as_deref(), config.pretty_log)?;

    debug!(?cli, "CLI arguments parsed");
    info!(
        config = %config_path.display(),
        level = log.level(),
        "epub-downloader starting"
    );

    let Some(command) = &cli.command else {
        return tui::run(tui::Context::new(config, cli.base_url)).await;
    };

    let ctx = CommandContext {
        config,
        config_path,
        paths,
        base_url: cli.base_url.clone(),
    };
    commands::dispatch(command, &ctx).await
}

/// Prefers the user-facing text of classified errors.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app) if !app.code().is_empty() => format!("{} ({})", app.user_message(), app.code()),
        Some(app) => app.user_message(),
        None => format!("{err:#}"),
    }
}
