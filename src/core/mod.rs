//! Core client logic
//!
//! Everything between the transport and the terminal: decoding streamed
//! build events, tracking per-resource progress, rendering the report,
//! and driving a stream to its end. No network or terminal I/O happens
//! here; those live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`event`] - Event envelope decoding
//! - [`changes`] - Planned change aggregation
//! - [`progress`] - Per-resource progress state machine
//! - [`report`] - Report block rendering
//! - [`monitor`] - Stream driver
//! - [`definition`] - Environment definition loading
//! - [`global_config`] - Client configuration file

pub mod changes;
pub mod definition;
pub mod event;
pub mod global_config;
pub mod monitor;
pub mod progress;
pub mod report;
