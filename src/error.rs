//! Error types for ernest
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Errors decoding a single streamed message envelope
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Payload is not valid JSON
    #[error("Invalid event payload: {error}")]
    InvalidJson { error: String },

    /// Payload is JSON but not an object with a `_subject` string
    #[error("Event payload has no '_subject' discriminator")]
    MissingSubject,

    /// Payload matched a subject but its fields did not fit the event shape
    #[error("Malformed '{subject}' event: {error}")]
    Malformed { subject: String, error: String },
}

/// Event stream transport errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// Could not open the stream
    #[error("Failed to connect to event stream '{url}': {error}")]
    Connect { url: String, error: String },

    /// The stream body failed mid-read
    #[error("Event stream '{url}' failed: {error}")]
    Read { url: String, error: String },
}

/// Ernest REST API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request could not be sent or the response could not be read
    #[error("Request to '{url}' failed: {error}")]
    Request { url: String, error: String },

    /// Server answered with a non-success status
    #[error("Server returned {status} for '{url}': {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// No token is configured for an authenticated call
    #[error("Not logged in. Run 'ernest login' first.")]
    NotAuthenticated,

    /// Response body did not have the expected shape
    #[error("Unexpected response from '{url}': {error}")]
    InvalidResponse { url: String, error: String },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Failed to access config file '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// Config file is not valid TOML
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// No API target configured
    #[error("No target configured. Run 'ernest target <url>' first.")]
    NoTarget,
}

/// Environment definition errors
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Failed to read definition file
    #[error("Failed to read definition '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Definition is not valid YAML
    #[error("Failed to parse definition '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Definition lacks a required key
    #[error("Definition '{path}' is missing required field '{field}'")]
    MissingField { path: PathBuf, field: String },
}
