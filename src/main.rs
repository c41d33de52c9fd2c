//! Ernest CLI - infrastructure orchestration client
//!
//! Entry point for the ernest command-line application.

use clap::Parser;
use std::process::ExitCode;

use ernest::cli::output::display_error;
use ernest::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the redrawn report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level().as_str())),
        )
        .init();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display_error(&e);
            ExitCode::FAILURE
        }
    }
}
