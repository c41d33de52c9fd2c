//! Infrastructure layer
//!
//! Handles all I/O: the event stream transport, terminal output, and the
//! config file location.

pub mod dirs;
pub mod stream;
pub mod terminal;
