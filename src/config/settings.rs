use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{KeystashError, Result};
use crate::keychain::WriteSerialization;

/// Project-level configuration, loaded from `.keystash.toml`.
///
/// Every field has a default so keystash works without any config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Service name items are stored under when `--service` is not given.
    #[serde(default = "default_service")]
    pub service: String,

    /// Access group for shared items.  `None` uses the store's default.
    #[serde(default)]
    pub access_group: Option<String>,

    /// Whether `set`/`get`/`delete` on one identity are serialized in-process.
    #[serde(default)]
    pub write_serialization: WriteSerialization,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_service() -> String {
    "keystash".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: default_service(),
            access_group: None,
            write_serialization: WriteSerialization::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".keystash.toml";

    /// Load settings from `<project_dir>/.keystash.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KeystashError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.service.is_empty() {
            return Err(KeystashError::ConfigError(format!(
                "{}: service cannot be empty",
                config_path.display()
            )));
        }

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, service: Option<&str>, access_group: Option<&str>) -> Self {
        if let Some(service) = service {
            self.service = service.to_string();
        }
        if let Some(group) = access_group {
            self.access_group = Some(group.to_string());
        }
        self
    }
}

// ── Tests ────────────────────────────────────────────────────────────
