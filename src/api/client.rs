//! Ernest API client implementation
//!
//! Thin REST wrapper: authentication, build requests, and the URL of a
//! build's event stream.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::event::Change;
use crate::error::ApiError;
use crate::infra::stream::EventStream;

/// Reference to a build started by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildRef {
    pub id: String,
}

/// Planned changes returned by a dry run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DryRun {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Session {
    token: String,
}

#[derive(Serialize)]
struct ImportAction<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    options: ImportOptions<'a>,
}

#[derive(Serialize)]
struct ImportOptions<'a> {
    filters: &'a [String],
}

/// Client for the Ernest REST API
#[derive(Debug, Clone)]
pub struct ErnestClient {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL, without trailing slash
    target: String,
    /// Session token
    token: Option<String>,
}

impl ErnestClient {
    /// Create a client for the given API target
    pub fn new(target: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(defaults::REQUEST_TIMEOUT)
                .connect_timeout(defaults::CONNECT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            target: target.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the API target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Exchange credentials for a session token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("/auth");
        let request = self
            .client
            .post(&url)
            .json(&Credentials { username, password });
        let session: Session = self.send(request, &url).await?;
        Ok(session.token)
    }

    /// Submit a definition and start building it
    pub async fn apply_definition(
        &self,
        project: &str,
        env: &str,
        definition: &serde_json::Value,
    ) -> Result<BuildRef, ApiError> {
        let url = self.url(&format!("/api/projects/{project}/envs/{env}/builds/"));
        let request = self.authed(Method::POST, &url)?.json(definition);
        self.send(request, &url).await
    }

    /// Ask which changes a definition would make without building it
    pub async fn dry_run(
        &self,
        project: &str,
        env: &str,
        definition: &serde_json::Value,
    ) -> Result<DryRun, ApiError> {
        let url = self.url(&format!("/api/projects/{project}/envs/{env}/builds/"));
        let request = self
            .authed(Method::POST, &url)?
            .query(&[("dry", "true")])
            .json(definition);
        self.send(request, &url).await
    }

    /// Destroy an environment
    pub async fn destroy_env(&self, project: &str, env: &str) -> Result<BuildRef, ApiError> {
        let url = self.url(&format!("/api/projects/{project}/envs/{env}/"));
        let request = self.authed(Method::DELETE, &url)?;
        self.send(request, &url).await
    }

    /// Import existing resources into an environment
    pub async fn import_env(
        &self,
        project: &str,
        env: &str,
        filters: &[String],
    ) -> Result<BuildRef, ApiError> {
        let url = self.url(&format!("/api/projects/{project}/envs/{env}/actions/"));
        let request = self.authed(Method::POST, &url)?.json(&ImportAction {
            kind: "import",
            options: ImportOptions { filters },
        });
        self.send(request, &url).await
    }

    /// Most recent build of an environment
    pub async fn current_build(&self, project: &str, env: &str) -> Result<BuildRef, ApiError> {
        let url = self.url(&format!("/api/projects/{project}/envs/{env}/builds/"));
        let request = self.authed(Method::GET, &url)?;
        let builds: Vec<BuildRef> = self.send(request, &url).await?;
        builds
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidResponse {
                url,
                error: "environment has no builds".to_string(),
            })
    }

    /// URL of a build's event stream
    pub fn stream_url(&self, build_id: &str) -> String {
        format!("{}/events?stream={build_id}", self.target)
    }

    /// Event stream subscription for a build, sharing this client's token
    pub fn event_stream(&self, build_id: &str) -> EventStream {
        // The stream stays open for the whole build; no request timeout.
        EventStream::new(reqwest::Client::new(), self.stream_url(build_id))
            .token(self.token.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.target)
    }

    fn authed(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NotAuthenticated)?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "sending request");
        let response = request.send().await.map_err(|e| ApiError::Request {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        response.json().await.map_err(|e| ApiError::InvalidResponse {
            url: url.to_string(),
            error: e.to_string(),
        })
    }
}
