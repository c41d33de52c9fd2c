//! Target command implementation
//!
//! Implements `ernest target <url>` to point the client at an API.

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::cli::output::status;

/// Execute the target command
pub fn execute(ctx: &Context, url: &str) -> Result<()> {
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!("Invalid target '{url}': must start with http:// or https://");
    }

    let mut config = ctx.config.clone();
    if config.target.as_deref() != Some(url) {
        // A session belongs to the server that issued it
        config.clear_session();
    }
    config.target = Some(url.to_string());
    config
        .save(&ctx.dirs)
        .context("Failed to save configuration")?;

    tracing::info!(url = %url, "target updated");
    if !ctx.quiet {
        println!("{} Target set to {url}", status::SUCCESS);
    }
    Ok(())
}
