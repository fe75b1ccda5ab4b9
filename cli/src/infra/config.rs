//! YAML configuration file loader.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::RexrayConfig;
use crate::domain::InstallLayout;

/// Reads `<prefix>/etc/rexray/config.yml` (or an explicit path).
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Uses `explicit` when given, otherwise the layout's default path.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>, layout: &InstallLayout) -> Self {
        Self {
            path: explicit.unwrap_or_else(|| layout.config_file_path()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<RexrayConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(RexrayConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(RexrayConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
