//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::known_hosts::Fingerprint;

// ── Host trust errors ─────────────────────────────────────────────────────────

/// Errors raised while adjudicating a remote host's identity.
#[derive(Debug, Error)]
pub enum HostTrustError {
    /// The presented fingerprint differs from the one on record.
    #[error("remote host identification has changed for {host}")]
    Conflict {
        host: String,
        presented: Fingerprint,
        stored: Fingerprint,
    },

    /// The operator declined to trust a first-contact host.
    #[error("Aborting request, remote host not trusted.")]
    Refused { host: String },

    #[error("malformed known_hosts entry on line {line}: {reason}")]
    MalformedStore { line: usize, reason: String },

    /// Adding would replace an existing entry; only a manual edit may do that.
    #[error("host {0} is already trusted; edit the known_hosts file to replace its key")]
    AlreadyTrusted(String),

    #[error("invalid host identity: {0}")]
    InvalidIdentity(String),

    /// The operator accepted the host but the store write failed.
    #[error("Failed to add entry to known_hosts file: {reason}")]
    Persistence { host: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ── Service installation errors ───────────────────────────────────────────────

/// Errors raised while installing or removing the managed service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("REX-Ray can only be {op} by root")]
    PermissionDenied { op: &'static str },

    #[error("no supported init system found (looked for systemctl, update-rc.d, chkconfig)")]
    UnsupportedInitSystem,

    #[error("`{command}` failed: {detail}")]
    Registration { command: String, detail: String },

    #[error("package query `{command}` failed: {detail}")]
    OwnershipQuery { command: String, detail: String },

    #[error("cannot {action} {}: {detail}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        detail: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration and address validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },

    #[error("Invalid host address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}
