//! Config file location
//!
//! The client keeps its settings in a single file in the user's home
//! directory (`~/.ernest`). The `ERNEST_CONFIG` environment variable
//! overrides the location.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::CONFIG_FILE_NAME;

/// Environment variable overriding the config file path
pub const ENV_CONFIG_FILE: &str = "ERNEST_CONFIG";

/// Location of the ernest config file
#[derive(Debug, Clone)]
pub struct ErnestDirs {
    config_path: PathBuf,
}

impl ErnestDirs {
    /// Resolve the config path from the environment or the home directory
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: Self::resolve_config_path(),
        }
    }

    /// Use an explicit config path
    #[must_use]
    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the config file path
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_FILE) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| h.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(CONFIG_FILE_NAME))
    }
}

impl Default for ErnestDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_named_after_app() {
        let dirs = ErnestDirs::new();
        if env::var(ENV_CONFIG_FILE).is_err() {
            assert!(dirs.config_path().ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_explicit_path() {
        let dirs = ErnestDirs::with_config_path(PathBuf::from("/tmp/ernest.toml"));
        assert_eq!(dirs.config_path(), PathBuf::from("/tmp/ernest.toml"));
    }
}
