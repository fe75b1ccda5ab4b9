//! Application service — install the binary as a managed service.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, HostProbe, LocalFs, ProgressReporter};
use crate::application::services::{init_system, privileges::require_root};
use crate::domain::service::{render_env_file, render_init_script, render_unit_file};
use crate::domain::{InitSystemKind, InstallLayout, ServiceError};

const UNIT_FILE_MODE: u32 = 0o644;
const INIT_SCRIPT_MODE: u32 = 0o755;

/// Outcome of the `install` use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Descriptor written and registered.
    Installed(InitSystemKind),
    /// No supported init system; nothing was written.
    Skipped,
}

/// Writes the service descriptor for the detected init system and registers
/// it. Running twice overwrites the descriptor and re-registers. Concurrent
/// runs are serialized on the host-wide install lock.
///
/// # Errors
///
/// Returns an error if not running as root, the install lock cannot be
/// taken, a descriptor cannot be written, or registration fails.
pub async fn install(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    host: &impl HostProbe,
    reporter: &impl ProgressReporter,
    layout: &InstallLayout,
) -> Result<InstallOutcome> {
    require_root(host, "installed")?;

    let kind = init_system::detect(host);
    if kind == InitSystemKind::Unknown {
        tracing::warn!("no supported init system found, skipping service installation");
        return Ok(InstallOutcome::Skipped);
    }
    let _lock = acquire_lock(fs, layout)?;

    match kind {
        InitSystemKind::Unknown => {}
        InitSystemKind::SystemD => {
            // The unit references the env file, so it is written last.
            let etc = layout.etc_dir();
            fs.create_dir_all(&etc).map_err(|e| ServiceError::Filesystem {
                action: "create",
                path: etc.clone(),
                detail: format!("{e:#}"),
            })?;
            write_file(fs, &layout.env_file_path(), &render_env_file(layout), UNIT_FILE_MODE)?;

            let unit = layout.unit_file_path();
            reporter.step(&format!("writing {}", unit.display()));
            write_file(fs, &unit, &render_unit_file(layout), UNIT_FILE_MODE)?;
        }
        InitSystemKind::UpdateRcD | InitSystemKind::ChkConfig => {
            let script = layout.init_file_path();
            reporter.step(&format!("writing {}", script.display()));
            write_file(fs, &script, &render_init_script(layout), INIT_SCRIPT_MODE)?;
        }
    }

    reporter.step(&format!("registering service with {kind}"));
    init_system::register(runner, kind).await?;
    reporter.success(&format!("service installed ({kind})"));
    Ok(InstallOutcome::Installed(kind))
}

/// Takes the host-wide install lock, held until the guard is dropped.
pub(crate) fn acquire_lock<F: LocalFs>(
    fs: &F,
    layout: &InstallLayout,
) -> Result<F::Lock, ServiceError> {
    let path = layout.lock_file_path();
    let lock = fs.lock_exclusive(&path).map_err(|e| ServiceError::Filesystem {
        action: "lock",
        path: path.clone(),
        detail: format!("{e:#}"),
    })?;
    tracing::debug!(path = %path.display(), "install lock acquired");
    Ok(lock)
}

/// Writes and closes `path`, then applies `mode`.
fn write_file(fs: &impl LocalFs, path: &Path, content: &str, mode: u32) -> Result<(), ServiceError> {
    let fs_err = |action: &'static str, e: anyhow::Error| ServiceError::Filesystem {
        action,
        path: path.to_path_buf(),
        detail: format!("{e:#}"),
    };
    fs.write(path, content).map_err(|e| fs_err("write", e))?;
    fs.set_mode(path, mode).map_err(|e| fs_err("chmod", e))?;
    tracing::info!(path = %path.display(), "wrote service file with mode {mode:o}");
    Ok(())
}
