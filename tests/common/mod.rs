//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated config file location for a test run
///
/// Points `ERNEST_CONFIG` at a file inside a temporary directory so tests
/// never touch the real `~/.ernest`.
pub struct TestHome {
    /// Temporary directory holding the config file
    pub dir: TempDir,
}

impl TestHome {
    /// Create a new empty home
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path of the config file
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(".ernest")
    }

    /// Write a config file
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// Read the config file back
    pub fn read_config(&self) -> String {
        std::fs::read_to_string(self.config_path()).expect("Failed to read config")
    }

    /// Create a file next to the config
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

/// Build-start message
pub fn build_start(kind: &str, id: &str, changes: &[&str]) -> Vec<u8> {
    let changes: Vec<_> = changes
        .iter()
        .map(|c| serde_json::json!({ "_component": c }))
        .collect();
    serde_json::json!({
        "_subject": format!("build.{kind}"),
        "id": id,
        "name": "my-env",
        "changes": changes,
    })
    .to_string()
    .into_bytes()
}

/// Build terminal message (`suffix` is `done` or `error`)
pub fn build_end(kind: &str, suffix: &str, id: &str) -> Vec<u8> {
    serde_json::json!({
        "_subject": format!("build.{kind}.{suffix}"),
        "id": id,
        "name": "my-env",
    })
    .to_string()
    .into_bytes()
}

/// Component transition message
pub fn component(component_type: &str, action: &str, state: &str) -> Vec<u8> {
    component_with(component_type, action, state, serde_json::json!({}))
}

/// Component transition message with extra fields merged in
pub fn component_with(
    component_type: &str,
    action: &str,
    state: &str,
    extra: serde_json::Value,
) -> Vec<u8> {
    let mut message = serde_json::json!({
        "_subject": format!("{component_type}.{action}"),
        "_component_id": format!("{component_type}::web"),
        "_component": component_type,
        "_action": action,
        "_state": state,
        "_provider": "aws",
        "name": "web",
        "service": "svc",
    });
    if let (Some(message), Some(extra)) = (message.as_object_mut(), extra.as_object()) {
        message.extend(extra.clone());
    }
    message.to_string().into_bytes()
}
