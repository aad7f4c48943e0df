//! Config command handler: show effective configuration.

use anyhow::Result;

use super::CommandContext;

pub fn run_config_show_command(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;
    let log_path = config
        .log_path
        .as_ref()
        .map_or_else(|| "<stderr>".to_string(), |path| path.display().to_string());

    println!("config_path = {}", ctx.config_path.display());
    println!("config_dir = {}", ctx.paths.config_dir.display());
    println!("data_dir = {}", ctx.paths.data_dir.display());
    println!("cache_dir = {}", ctx.paths.cache_dir.display());
    println!("download_path = {}", config.download_path.display());
    println!("concurrent_downloads = {}", config.concurrent_downloads);
    println!("rate_limit_rps = {}", config.rate_limit_rps);
    println!("theme = {}", config.theme);
    println!(
        "auto_open_after_download = {}",
        config.auto_open_after_download
    );
    println!("log_level = {}", config.log_level);
    println!("log_path = {log_path}");
    println!("pretty_log = {}", config.pretty_log);
    println!("database_path = {}", config.database_path.display());
    println!("cookies_path = {}", config.cookies_path.display());
    println!("base_url = {}", ctx.base_url);

    Ok(())
}
