//! Server-sent event transport
//!
//! Opens the build event stream over HTTP and forwards each event payload
//! as a raw message on a channel. The monitor on the other end of the
//! channel decides what the payloads mean.

use backoff::ExponentialBackoff;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::defaults;
use crate::core::monitor::StreamMessage;
use crate::error::StreamError;

/// Incremental parser for a `text/event-stream` body
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    data: Vec<u8>,
    has_data: bool,
}

impl SseParser {
    /// Feed a body chunk; returns every event payload it completed.
    ///
    /// Comment lines (`: ping`) come back as empty payloads so the
    /// consumer sees them as heartbeats.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush an event left unterminated when the body ended
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            let _ = self.line(&line);
        }
        self.dispatch()
    }

    fn line(&mut self, line: &[u8]) -> Option<Vec<u8>> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(b":") {
            return Some(Vec::new());
        }

        let (field, value) = match line.iter().position(|b| *b == b':') {
            Some(i) => {
                let value = &line[i + 1..];
                (&line[..i], value.strip_prefix(b" ").unwrap_or(value))
            }
            None => (line, &[][..]),
        };

        // id, event and retry fields carry nothing the monitor uses
        if field == b"data" {
            if self.has_data {
                self.data.push(b'\n');
            }
            self.data.extend_from_slice(value);
            self.has_data = true;
        }
        None
    }

    fn dispatch(&mut self) -> Option<Vec<u8>> {
        if !self.has_data {
            return None;
        }
        self.has_data = false;
        Some(std::mem::take(&mut self.data))
    }
}

/// A build event stream subscription
#[derive(Debug, Clone)]
pub struct EventStream {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    retry_window: Duration,
}

impl EventStream {
    /// Create a subscription for the given stream URL
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token: None,
            retry_window: defaults::STREAM_CONNECT_RETRY_WINDOW,
        }
    }

    /// Authenticate with a bearer token
    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// How long to keep retrying the initial connection
    #[must_use]
    pub fn retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    /// Connect and start forwarding events.
    ///
    /// Server errors and connection failures are retried with exponential
    /// backoff until the retry window is spent; client errors fail at once.
    /// Once connected, the stream is never re-established: the channel
    /// closes when the body ends.
    pub async fn subscribe(self) -> Result<mpsc::Receiver<StreamMessage>, StreamError> {
        let policy = ExponentialBackoff {
            current_interval: Duration::from_millis(200),
            initial_interval: Duration::from_millis(200),
            max_elapsed_time: Some(self.retry_window),
            ..ExponentialBackoff::default()
        };

        let client = &self.client;
        let url = self.url.as_str();
        let token = self.token.as_deref();

        let response = backoff::future::retry(policy, move || async move {
            tracing::debug!(url = %url, "connecting to event stream");
            let mut request = client.get(url).header(ACCEPT, "text/event-stream");
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    return Err(backoff::Error::transient(StreamError::Connect {
                        url: url.to_string(),
                        error: e.to_string(),
                    }))
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            let err = StreamError::Connect {
                url: url.to_string(),
                error: format!("HTTP {status}"),
            };
            if status.is_server_error() {
                Err(backoff::Error::transient(err))
            } else {
                Err(backoff::Error::permanent(err))
            }
        })
        .await?;

        tracing::info!(url = %self.url, "subscribed to event stream");

        let (tx, rx) = mpsc::channel(defaults::STREAM_CHANNEL_CAPACITY);
        let url = self.url;
        tokio::spawn(async move {
            let mut parser = SseParser::default();
            let mut body = response.bytes_stream();
            loop {
                let chunk = tokio::select! {
                    () = tx.closed() => return,
                    chunk = body.next() => chunk,
                };
                match chunk {
                    Some(Ok(chunk)) => {
                        for event in parser.feed(&chunk) {
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        let _ = tx
                            .send(Err(StreamError::Read {
                                url: url.clone(),
                                error: e.to_string(),
                            }))
                            .await;
                        return;
                    }
                    None => break,
                }
            }
            if let Some(event) = parser.finish() {
                let _ = tx.send(Ok(event)).await;
            }
            tracing::debug!(url = %url, "event stream ended");
        });

        Ok(rx)
    }
}
