//! Ernest - infrastructure orchestration client
//!
//! This library provides the command-line client for the Ernest
//! orchestration service: it starts builds through the REST API and
//! follows their live event streams in the terminal.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Event decoding, progress tracking, rendering, stream driver
//! - [`api`] - Ernest REST API client
//! - [`infra`] - Infrastructure layer (event stream transport, terminal, config path)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
