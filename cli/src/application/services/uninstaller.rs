//! Application service — remove the managed service and, for manual
//! installs, the binary itself.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every removal step tolerates missing files and missing registrations.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, HostProbe, LocalFs, ProgressReporter};
use crate::application::services::installer::acquire_lock;
use crate::application::services::{init_system, ownership, privileges::require_root};
use crate::domain::{InitSystemKind, InstallLayout, InstallationOwnership};

/// Outcome of the `uninstall` use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// The binary belongs to a package; removal was handed to its manager.
    Delegated(InstallationOwnership),
    /// Service deregistered and files removed.
    Removed(InitSystemKind),
}

/// Uninstalls the service.
///
/// `package_driven` is set when a package manager's removal script invokes
/// us: ownership is not checked and the binary is left to the package
/// manager.
///
/// # Errors
///
/// Returns an error if not running as root or the install lock cannot be
/// taken. Every later step only warns.
pub async fn uninstall(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    host: &impl HostProbe,
    reporter: &impl ProgressReporter,
    layout: &InstallLayout,
    package_driven: bool,
) -> Result<UninstallOutcome> {
    require_root(host, "uninstalled")?;

    if !package_driven {
        let owner = ownership::classify(runner, &layout.bin_file_path()).await;
        if owner != InstallationOwnership::Unmanaged {
            ownership::remove_package(runner, reporter, &owner).await;
            return Ok(UninstallOutcome::Delegated(owner));
        }
    }

    // Taken after delegation: the package's removal script re-enters with
    // `uninstall --package` and needs the lock itself.
    let _lock = acquire_lock(fs, layout)?;

    let kind = init_system::detect(host);
    init_system::stop_quietly(runner, fs, layout, kind).await;

    match kind {
        InitSystemKind::SystemD => {
            deregister(runner, reporter, kind).await;
            remove_quietly(fs, reporter, &layout.unit_file_path());
            remove_quietly(fs, reporter, &layout.docker_wants_link());
        }
        InitSystemKind::UpdateRcD => {
            // update-rc.d refuses to remove links while the script exists.
            remove_quietly(fs, reporter, &layout.init_file_path());
            deregister(runner, reporter, kind).await;
        }
        InitSystemKind::ChkConfig => {
            deregister(runner, reporter, kind).await;
            remove_quietly(fs, reporter, &layout.init_file_path());
        }
        InitSystemKind::Unknown => {
            tracing::warn!("no supported init system found, skipping service removal");
        }
    }

    if !package_driven {
        remove_quietly(fs, reporter, &layout.bin_file_path());
        if let Some(prefix) = layout.prefix()
            && fs.exists(prefix)
        {
            reporter.step(&format!("removing {}", prefix.display()));
            if let Err(e) = fs.remove_dir_all(prefix) {
                tracing::warn!("{e:#}");
                reporter.warn(&format!("could not remove {}: {e:#}", prefix.display()));
            }
        }
    }

    reporter.success("service uninstalled");
    Ok(UninstallOutcome::Removed(kind))
}

async fn deregister(runner: &impl CommandRunner, reporter: &impl ProgressReporter, kind: InitSystemKind) {
    if let Err(e) = init_system::unregister(runner, kind).await {
        tracing::warn!("{e}");
        reporter.warn(&e.to_string());
    }
}

fn remove_quietly(fs: &impl LocalFs, reporter: &impl ProgressReporter, path: &Path) {
    if !fs.exists(path) {
        tracing::debug!(path = %path.display(), "already absent");
        return;
    }
    match fs.remove_file(path) {
        Ok(()) => tracing::info!(path = %path.display(), "removed"),
        Err(e) => {
            tracing::warn!("{e:#}");
            reporter.warn(&format!("could not remove {}: {e:#}", path.display()));
        }
    }
}
