//! Global configuration management
//!
//! Reads and writes the client settings file (`~/.ernest`): the API
//! target, the logged-in user and session token, and output preferences.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::infra::dirs::ErnestDirs;

/// Persistent client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Ernest API base URL
    pub target: Option<String>,

    /// Logged-in user
    pub user: Option<String>,

    /// Session token returned by the API
    pub token: Option<String>,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colored output
    pub color: Option<bool>,
}

impl GlobalConfig {
    /// Load the config file.
    ///
    /// A missing file yields the default configuration; a file that exists
    /// but is not valid TOML is an error.
    pub fn load(dirs: &ErnestDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Save the config file
    pub fn save(&self, dirs: &ErnestDirs) -> Result<(), ConfigError> {
        self.save_to_path(&dirs.config_path())
    }

    /// Save global configuration to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Get the configured API target
    pub fn target(&self) -> Result<&str, ConfigError> {
        self.target
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::NoTarget)
    }

    /// Whether colored output is wanted, defaulting to on
    #[must_use]
    pub fn color(&self) -> bool {
        self.output.color.unwrap_or(true)
    }

    /// Forget the session
    pub fn clear_session(&mut self) {
        self.user = None;
        self.token = None;
    }
}
