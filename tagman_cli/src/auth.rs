//! Authentication commands for the Tag Manager CLI
//!
//! The OAuth consent flow happens outside this tool; these commands
//! store, inspect, and remove the resulting token in the local cache
//! keyed by API name.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use dialoguer::{Input, Password};
use tagman_client_core::error::Error;
use tagman_client_core::{StoredToken, TokenCache};

/// Prompt for a token and store it in the credential cache.
pub fn login() -> Result<()> {
    println!("Tag Manager Authentication");
    println!("==========================");
    println!("Paste the tokens produced by your OAuth consent flow.");

    // Masked input; the token never echoes.
    let access_token = Password::new()
        .with_prompt("Access token")
        .interact()
        .context("Failed to read access token")?;

    let refresh_token: String = Input::new()
        .with_prompt("Refresh token (optional)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read refresh token")?;

    let expires_in: String = Input::new()
        .with_prompt("Expires in seconds (optional)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read expiry")?;

    let mut token = StoredToken::new(access_token);
    if !refresh_token.is_empty() {
        token.refresh_token = Some(refresh_token);
    }
    if let Ok(seconds) = expires_in.parse::<i64>() {
        token.expiry = Some(Utc::now() + Duration::seconds(seconds));
    }

    let cache = TokenCache::new();
    cache.store(&token).context("Failed to store credentials")?;

    println!("\n✓ Credentials stored at {}", cache.path().display());
    Ok(())
}

/// Remove stored credentials.
pub fn logout() -> Result<()> {
    let cache = TokenCache::new();
    if cache.load().context("Failed to read credential cache")?.is_none() {
        println!("No stored credentials found.");
        return Ok(());
    }
    cache.clear().context("Failed to delete credentials")?;
    println!("✓ Removed stored credentials");
    Ok(())
}

/// Show stored credential state without exposing the token.
pub fn status() -> Result<()> {
    let cache = TokenCache::new();
    match cache.load().context("Failed to read credential cache")? {
        None => {
            println!("No stored credentials found.");
            println!("Use 'tagman auth login' to add credentials.");
        }
        Some(token) => {
            println!("Credentials stored at {}", cache.path().display());
            match token.expiry {
                Some(expiry) if token.is_expired() => {
                    println!("  • token expired at {expiry} (re-auth required)");
                }
                Some(expiry) => println!("  • token valid until {expiry}"),
                None => println!("  • token has no recorded expiry"),
            }
            if token.refresh_token.is_some() {
                println!("  • refresh token present");
            }
        }
    }
    Ok(())
}

/// Load a usable access token, or fail with an authentication error that
/// points at the re-auth flow.
pub fn require_access_token() -> tagman_client_core::Result<String> {
    let cache = TokenCache::new();
    let token = cache
        .load()?
        .ok_or_else(|| Error::auth("no cached credentials; run 'tagman auth login'"))?;
    if token.is_expired() {
        return Err(Error::auth(
            "cached token has expired; run 'tagman auth login'",
        ));
    }
    Ok(token.access_token)
}
