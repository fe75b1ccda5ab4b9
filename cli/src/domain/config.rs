//! Domain types and validators for REX-Ray configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_HOST: &str = "tcp://127.0.0.1:7979";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `<prefix>/etc/rexray/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RexrayConfig {
    pub rexray: RexraySection,
}

/// The `rexray:` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RexraySection {
    /// `error`, `warn` (default), `info`, `debug` or `trace`.
    pub log_level: String,
    /// Control endpoint used by `connect`.
    pub host: String,
    /// Overrides `~/.rexray/known_hosts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<String>,
}

impl Default for RexraySection {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            known_hosts: None,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a log level name, case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything outside
/// [`VALID_LOG_LEVELS`].
pub fn validate_log_level(level: &str) -> Result<String, ConfigError> {
    let lower = level.to_ascii_lowercase();
    if VALID_LOG_LEVELS.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(ConfigError::InvalidValue {
            key: "rexray.logLevel".to_string(),
            value: level.to_string(),
            valid: VALID_LOG_LEVELS.join(", "),
        })
    }
}
