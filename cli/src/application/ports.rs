//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::{Endpoint, KnownHosts, PendingIdentity, TrustedHostEntry};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, exceeds `timeout`,
    /// or is cancelled. The child process must be killed in both cases.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Facts about the local host that drive init-system detection.
pub trait HostProbe {
    /// `true` if `program` resolves on the search path.
    fn has_executable(&self, program: &str) -> bool;
    fn is_linux(&self) -> bool;
    /// `true` when running with effective uid 0.
    fn is_elevated(&self) -> bool;
}

/// Raw filesystem operations used by the installer.
pub trait LocalFs {
    /// Held lock; released on drop.
    type Lock;

    /// Blocks until an exclusive advisory lock on `path` is acquired,
    /// creating the file and its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or locked.
    fn lock_exclusive(&self, path: &Path) -> Result<Self::Lock>;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Create or truncate `path`. The handle is closed on return.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Host Trust Ports ──────────────────────────────────────────────────────────

/// File-backed registry of trusted host identities.
pub trait KnownHostsStore {
    /// Location shown to the operator in messages and warnings.
    fn path(&self) -> &Path;
    /// Loads all entries. A missing store is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but is unreadable or malformed.
    fn load(&self) -> Result<KnownHosts>;
    /// Appends `entry`, creating the store and its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the host already has an entry or the write fails.
    fn add(&self, entry: &TrustedHostEntry) -> Result<()>;
}

/// Asks the operator whether to trust a first-contact host.
pub trait TrustPrompt {
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown.
    fn confirm_new_host(&self, pending: &PendingIdentity) -> Result<bool>;
}

/// Retrieves the identity a remote endpoint presents.
#[allow(async_fn_in_trait)]
pub trait IdentityProbe {
    async fn fetch_identity(&self, endpoint: &Endpoint) -> Result<PendingIdentity>;
}
