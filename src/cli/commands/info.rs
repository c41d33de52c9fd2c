//! Info command implementation
//!
//! Implements `ernest info` to show where the client points.

use anyhow::Result;

use super::Context;

/// Execute the info command
pub fn execute(ctx: &Context) -> Result<()> {
    println!("{}", render(ctx));
    Ok(())
}

fn render(ctx: &Context) -> String {
    let target = ctx.config.target.as_deref().unwrap_or("(not set)");
    let user = match (&ctx.config.user, &ctx.config.token) {
        (Some(user), Some(_)) => user.as_str(),
        (None, Some(_)) => "(token only)",
        _ => "(not logged in)",
    };
    format!(
        "Target:      {target}\nUser:        {user}\nConfig:      {}\nCLI version: {} ({})",
        ctx.dirs.config_path().display(),
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
    )
}
