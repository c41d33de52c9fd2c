//! Environment command implementations
//!
//! Implements `ernest env apply|destroy|import|monitor`. Every command that
//! starts a build then follows its event stream until the build ends.

use anyhow::{bail, Context as _, Result};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::Context;
use crate::api::ErnestClient;
use crate::cli::output::{create_spinner, status};
use crate::core::definition::Definition;
use crate::core::monitor::{Monitor, MonitorOutcome};
use crate::infra::terminal::Terminal;

/// Execute `env apply`
pub async fn execute_apply(ctx: &Context, path: &Path, dry: bool) -> Result<()> {
    let definition = Definition::load(path)?;
    let client = ctx.client()?;

    if dry {
        let plan = client
            .dry_run(&definition.project, &definition.name, &definition.body)
            .await
            .context("Dry run failed")?;
        if plan.changes.is_empty() {
            println!("No changes detected");
        }
        for change in &plan.changes {
            println!(
                "  {} {} {}",
                change.action.as_deref().unwrap_or("change"),
                change.component_type,
                change.name.as_deref().unwrap_or_default()
            );
        }
        return Ok(());
    }

    tracing::info!(project = %definition.project, env = %definition.name, "applying definition");
    let build = client
        .apply_definition(&definition.project, &definition.name, &definition.body)
        .await
        .context("Failed to apply definition")?;
    follow_build(ctx, &client, &build.id).await
}

/// Execute `env destroy`
pub async fn execute_destroy(ctx: &Context, project: &str, env: &str, yes: bool) -> Result<()> {
    let client = ctx.client()?;
    if !yes {
        confirm_destroy(project, env)?;
    }

    let build = client
        .destroy_env(project, env)
        .await
        .context("Failed to destroy environment")?;
    follow_build(ctx, &client, &build.id).await
}

/// Execute `env import`
pub async fn execute_import(
    ctx: &Context,
    project: &str,
    env: &str,
    filters: &[String],
) -> Result<()> {
    let client = ctx.client()?;
    let build = client
        .import_env(project, env, filters)
        .await
        .context("Failed to start import")?;
    follow_build(ctx, &client, &build.id).await
}

/// Execute `env monitor`
pub async fn execute_monitor(ctx: &Context, project: &str, env: &str) -> Result<()> {
    let client = ctx.client()?;
    let build = client
        .current_build(project, env)
        .await
        .context("Failed to find the environment's current build")?;
    follow_build(ctx, &client, &build.id).await
}

/// Subscribe to a build's events and draw its progress until it ends.
///
/// Ctrl-C stops monitoring without waiting for the build.
async fn follow_build(ctx: &Context, client: &ErnestClient, build_id: &str) -> Result<()> {
    let spinner = (!ctx.quiet).then(|| create_spinner(&format!("Waiting for build {build_id}")));
    let subscription = client.event_stream(build_id).subscribe().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let mut rx = subscription.context("Failed to subscribe to build events")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut monitor = Monitor::new(Terminal::stdout(ctx.color, ctx.quiet));
    let outcome = monitor.run(&mut rx, &cancel).await;
    ctrl_c.abort();

    report_outcome(outcome.context("Build monitoring failed")?)
}

/// Turn a monitoring outcome into the command result
fn report_outcome(outcome: MonitorOutcome) -> Result<()> {
    match outcome {
        MonitorOutcome::Completed(overall) => {
            tracing::info!(status = %overall, "build completed");
            Ok(())
        }
        MonitorOutcome::Closed => {
            eprintln!(
                "{} Event stream closed before the build reported a final status",
                status::WARNING
            );
            Ok(())
        }
        MonitorOutcome::Failed { failures } => {
            bail!("Build failed with {} component error(s)", failures.len())
        }
        MonitorOutcome::Cancelled => {
            bail!("Monitoring interrupted; the build continues on the server")
        }
    }
}

fn confirm_destroy(project: &str, env: &str) -> Result<()> {
    eprint!("{} Destroy environment '{env}' of project '{project}'? [y/N] ", status::WARNING);
    io::stderr().flush()?;

    if !io::stdin().is_terminal() {
        bail!(
            "Cannot prompt for confirmation in non-interactive mode.\n\
             Use --yes to skip confirmation."
        );
    }

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    if input != "y" && input != "yes" {
        bail!("Destroy cancelled by user.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::global_config::GlobalConfig;
    use crate::core::progress::{ComponentFailure, OverallStatus};
    use crate::infra::dirs::ErnestDirs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_outcome_exit_mapping() {
        assert!(report_outcome(MonitorOutcome::Completed(OverallStatus::Applied)).is_ok());
        assert!(report_outcome(MonitorOutcome::Closed).is_ok());
        assert!(report_outcome(MonitorOutcome::Cancelled).is_err());

        let err = report_outcome(MonitorOutcome::Failed {
            failures: vec![ComponentFailure {
                component_type: "instance".to_string(),
                name: "web-1".to_string(),
                message: "timeout".to_string(),
            }],
        })
        .unwrap_err();
        assert!(err.to_string().contains("1 component error"));
    }

    /// Event stream body carrying one `data:` event per message
    fn sse(messages: &[serde_json::Value]) -> String {
        messages
            .iter()
            .map(|message| format!("data: {message}\n\n"))
            .collect()
    }

    fn context(temp: &TempDir, target: String) -> Context {
        Context {
            dirs: ErnestDirs::with_config_path(temp.path().join(".ernest")),
            config: GlobalConfig {
                target: Some(target),
                token: Some("t0k".to_string()),
                ..GlobalConfig::default()
            },
            quiet: true,
            color: false,
        }
    }

    #[tokio::test]
    async fn test_import_follows_build_to_completion() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/proj/envs/env/actions/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "b-7"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("stream", "b-7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                sse(&[
                    serde_json::json!({
                        "_subject": "build.import", "id": "b-7", "name": "env", "changes": []
                    }),
                    serde_json::json!({
                        "_subject": "build.import.done", "id": "b-7", "name": "env"
                    }),
                ]),
            ))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, mock_server.uri());
        execute_import(&ctx, "proj", "env", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_failure_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/projects/proj/envs/env/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "b-8"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                sse(&[
                    serde_json::json!({
                        "_subject": "build.delete",
                        "id": "b-8",
                        "name": "env",
                        "changes": [{"_component": "instance"}],
                    }),
                    serde_json::json!({
                        "_subject": "instance.delete",
                        "_component": "instance",
                        "_action": "delete",
                        "_state": "errored",
                        "name": "web",
                        "error": "timeout",
                    }),
                    serde_json::json!({
                        "_subject": "build.delete.error", "id": "b-8", "name": "env"
                    }),
                ]),
            ))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, mock_server.uri());
        let err = execute_destroy(&ctx, "proj", "env", true).await.unwrap_err();
        assert!(err.to_string().contains("Build failed"));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_build() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/proj/envs/env/builds/"))
            .and(query_param("dry", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"changes": []})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let definition = temp.path().join("env.yml");
        std::fs::write(&definition, "name: env\nproject: proj\n").unwrap();

        let ctx = context(&temp, mock_server.uri());
        execute_apply(&ctx, &definition, true).await.unwrap();
    }
}
