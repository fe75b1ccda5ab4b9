//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod known_hosts;
pub mod service;

pub use config::{RexrayConfig, validate_log_level};
pub use endpoint::{Endpoint, parse_endpoint};
pub use error::{ConfigError, HostTrustError, ServiceError};
pub use known_hosts::{
    Fingerprint, KnownHosts, PendingIdentity, TrustedHostEntry, VerifyOutcome, conflict_warning,
};
pub use service::{InitSystemKind, InstallLayout, InstallationOwnership, ServiceOp};
