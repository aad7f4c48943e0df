//! Auth command handlers: import, check and clear saved cookies.

use std::fs;
use std::io::{self, IsTerminal, Read};

use anyhow::{Context as _, Result, bail};
use epub_downloader::api::{REQUEST_TIMEOUT, RetryPolicy, Session, UserProfile};
use epub_downloader::auth::CookieStore;
use tokio::time::Instant;
use tracing::info;

use super::CommandContext;

pub async fn run_auth_import_command(source: &str, ctx: &CommandContext) -> Result<()> {
    let json_text = read_cookie_input(source)?;
    let store = CookieStore::new(&ctx.config.cookies_path);

    // Limiter wait and the request share one budget.
    let deadline = Instant::now() + REQUEST_TIMEOUT * 2;
    let session = Session::import(
        &json_text,
        &store,
        &ctx.base_url,
        ctx.config.rate_limit_rps,
        Some(deadline),
    )
    .await?;

    info!(path = %store.path().display(), "saved session cookies");
    print_profile(&session.profile);
    println!("cookies_path = {}", store.path().display());
    Ok(())
}

pub async fn run_auth_status_command(ctx: &CommandContext) -> Result<()> {
    let store = CookieStore::new(&ctx.config.cookies_path);
    if !store.exists() {
        bail!(
            "No saved session at {}. Run `epub-downloader auth import` first.",
            store.path().display()
        );
    }

    let session = Session::restore(
        &store,
        &ctx.base_url,
        ctx.config.rate_limit_rps,
        &RetryPolicy::default(),
    )
    .await?;
    print_profile(&session.profile);
    Ok(())
}

pub fn run_auth_clear_command(ctx: &CommandContext) -> Result<()> {
    let store = CookieStore::new(&ctx.config.cookies_path);
    let existed = store.exists();
    store.delete()?;

    if existed {
        info!(path = %store.path().display(), "cleared saved cookies");
        println!("Removed saved cookies at {}", store.path().display());
    } else {
        println!("No saved cookies found");
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("Signed in as {}", profile.display_name());
    if !profile.email.is_empty() {
        println!("email = {}", profile.email);
    }
    let plan = if profile.subscription.kind.is_empty() {
        "active"
    } else {
        profile.subscription.kind.as_str()
    };
    println!("subscription = {plan}");
    if let Some(expires_at) = profile.subscription.expires_at {
        println!("expires_at = {}", expires_at.to_rfc3339());
    }
}

fn read_cookie_input(source: &str) -> Result<String> {
    let text = if source == "-" {
        if io::stdin().is_terminal() {
            println!("Paste the exported cookie JSON, then press Ctrl+D:");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Cannot read cookies from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("Cannot read cookie file '{source}'"))?
    };

    if text.trim().is_empty() {
        bail!("No cookie data provided");
    }
    Ok(text)
}
