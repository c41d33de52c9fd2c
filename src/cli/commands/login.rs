//! Login and logout command implementations
//!
//! Implements `ernest login` and `ernest logout`.

use anyhow::{Context as _, Result};

use super::Context;
use crate::cli::output::{create_spinner, status};

/// Execute the login command
pub async fn execute_login(ctx: &Context, user: &str, password: &str) -> Result<()> {
    let client = ctx.client()?;

    let spinner =
        (!ctx.quiet).then(|| create_spinner(&format!("Logging in to {}", client.target())));
    let result = client.authenticate(user, password).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let token = result.context("Login failed")?;

    let mut config = ctx.config.clone();
    config.user = Some(user.to_string());
    config.token = Some(token);
    config
        .save(&ctx.dirs)
        .context("Failed to save configuration")?;

    tracing::info!(user = %user, "logged in");
    if !ctx.quiet {
        println!("{} Logged in as {user}", status::SUCCESS);
    }
    Ok(())
}

/// Execute the logout command
pub fn execute_logout(ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    config.clear_session();
    config
        .save(&ctx.dirs)
        .context("Failed to save configuration")?;

    if !ctx.quiet {
        println!("{} Logged out", status::SUCCESS);
    }
    Ok(())
}
