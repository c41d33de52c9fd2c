//! Ernest REST API
//!
//! Handles authenticated calls to the orchestration service.

pub mod client;

pub use client::ErnestClient;
