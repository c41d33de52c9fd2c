//! Build stream monitoring
//!
//! Drives one build stream to completion: pulls raw messages off a
//! channel, decodes them, folds component updates into a
//! [`ProgressState`], and redraws the report after every message.

use std::io;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::event::{self, BuildPhase, Event};
use super::progress::{ComponentFailure, OverallStatus, ProgressState};
use crate::error::{DecodeError, StreamError};

/// A raw message from the transport, or the error that ended it
pub type StreamMessage = Result<Vec<u8>, StreamError>;

/// Destination for rendered progress
pub trait ReportSink {
    /// Replace the previously drawn report with this one
    fn draw(&mut self, state: &ProgressState) -> io::Result<()>;

    /// Print one collected component failure
    fn failure(&mut self, failure: &ComponentFailure) -> io::Result<()>;
}

/// Errors that abort monitoring
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A message could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The transport failed
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Output could not be written
    #[error("Failed to write progress: {0}")]
    Output(#[from] io::Error),
}

/// How a monitored stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// A `.done` build event arrived
    Completed(OverallStatus),
    /// A `.error` build event arrived
    Failed { failures: Vec<ComponentFailure> },
    /// The channel closed before any terminal build event
    Closed,
    /// Monitoring was stopped through the cancellation token
    Cancelled,
}

impl MonitorOutcome {
    /// Whether the CLI should exit successfully.
    ///
    /// A closed channel counts as success: the transport ends the stream
    /// when the server has nothing more to send.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Closed)
    }
}

/// Per-invocation monitoring state
pub struct Monitor<S> {
    sink: S,
    state: Option<ProgressState>,
}

impl<S: ReportSink> Monitor<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, state: None }
    }

    /// Latest progress, if a build has started
    pub fn state(&self) -> Option<&ProgressState> {
        self.state.as_ref()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Consume `rx` until a terminal build event, channel close, or
    /// cancellation.
    pub async fn run(
        &mut self,
        rx: &mut mpsc::Receiver<StreamMessage>,
        cancel: &CancellationToken,
    ) -> Result<MonitorOutcome, MonitorError> {
        loop {
            let message = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("monitoring cancelled");
                    return Ok(MonitorOutcome::Cancelled);
                }
                message = rx.recv() => message,
            };

            let Some(message) = message else {
                tracing::warn!("event stream closed before the build finished");
                return Ok(MonitorOutcome::Closed);
            };

            if let Some(outcome) = self.handle(&message?)? {
                return Ok(outcome);
            }
        }
    }

    /// Process one raw message; returns the outcome once the stream is over.
    pub fn handle(&mut self, raw: &[u8]) -> Result<Option<MonitorOutcome>, MonitorError> {
        let Some(event) = event::decode(raw)? else {
            tracing::trace!("heartbeat");
            return Ok(None);
        };

        match event {
            Event::Build(build) => match build.subject.phase {
                BuildPhase::Started => {
                    tracing::info!(
                        build = %build.id,
                        env = %build.name,
                        subject = %build.subject,
                        "build started"
                    );
                    let state = ProgressState::from_build(&build);
                    self.sink.draw(&state)?;
                    self.state = Some(state);
                    Ok(None)
                }
                BuildPhase::Done => {
                    tracing::info!(build = %build.id, subject = %build.subject, "build finished");
                    let state = self.finish(&build)?;
                    Ok(Some(MonitorOutcome::Completed(state.overall())))
                }
                BuildPhase::Errored => {
                    tracing::info!(build = %build.id, subject = %build.subject, "build failed");
                    let failures = self.finish(&build)?.failures().to_vec();
                    for failure in &failures {
                        self.sink.failure(failure)?;
                    }
                    Ok(Some(MonitorOutcome::Failed { failures }))
                }
            },
            Event::Component(component) => {
                let Some(state) = self.state.as_mut() else {
                    tracing::warn!(component = %component.id, "component event before build start");
                    return Ok(None);
                };
                state.apply(&component);
                self.sink.draw(state)?;
                Ok(None)
            }
        }
    }

    /// Mark the build terminal and draw the final report
    fn finish(&mut self, build: &event::BuildEvent) -> Result<&ProgressState, MonitorError> {
        let state = match self.state.take() {
            Some(mut state) => {
                state.set_subject(build.subject);
                state
            }
            None => ProgressState::from_build(build),
        };
        self.sink.draw(&state)?;
        Ok(self.state.insert(state))
    }
}
