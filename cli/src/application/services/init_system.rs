//! Application service — init-system detection, registration and control.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::application::ports::{CommandRunner, HostProbe, LocalFs};
use crate::domain::service::UNIT_FILE_NAME;
use crate::domain::{InitSystemKind, InstallLayout, ServiceError, ServiceOp};

/// Probes the search path. Non-Linux hosts are always [`InitSystemKind::Unknown`].
pub fn detect(host: &impl HostProbe) -> InitSystemKind {
    if !host.is_linux() {
        tracing::debug!("not a Linux host, skipping init system detection");
        return InitSystemKind::Unknown;
    }
    let kind = InitSystemKind::detect(|tool| host.has_executable(tool));
    tracing::debug!(init_system = %kind, "detected init system");
    kind
}

/// Enables the service with the init system.
///
/// # Errors
///
/// Returns [`ServiceError::Registration`] if the command cannot run or exits
/// non-zero, and [`ServiceError::UnsupportedInitSystem`] for `Unknown`.
pub async fn register(runner: &impl CommandRunner, kind: InitSystemKind) -> Result<(), ServiceError> {
    let (program, args) = kind
        .registration_command()
        .ok_or(ServiceError::UnsupportedInitSystem)?;
    run_checked(runner, program, args).await?;
    tracing::info!(init_system = %kind, "service registered");
    Ok(())
}

/// Reverses [`register`].
///
/// # Errors
///
/// Returns [`ServiceError::Registration`] if the command cannot run or exits
/// non-zero. Callers removing the service treat this as a warning.
pub async fn unregister(runner: &impl CommandRunner, kind: InitSystemKind) -> Result<(), ServiceError> {
    let Some((program, args)) = kind.deregistration_command() else {
        return Ok(());
    };
    run_checked(runner, program, args).await?;
    tracing::info!(init_system = %kind, "service deregistered");
    Ok(())
}

/// Forwards `op` to the installed service with inherited stdio.
///
/// # Errors
///
/// Returns an error if no init system is found, the init script is missing,
/// or the command cannot be spawned.
pub async fn control(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    layout: &InstallLayout,
    kind: InitSystemKind,
    op: ServiceOp,
) -> Result<ExitStatus> {
    match kind {
        InitSystemKind::SystemD => runner.run_status("systemctl", &[op.as_str(), UNIT_FILE_NAME]).await,
        InitSystemKind::UpdateRcD | InitSystemKind::ChkConfig => {
            let script = layout.init_file_path();
            anyhow::ensure!(
                fs.exists(&script),
                "service is not installed ({} not found)",
                script.display()
            );
            runner.run_status(&script.to_string_lossy(), &[op.as_str()]).await
        }
        InitSystemKind::Unknown => Err(ServiceError::UnsupportedInitSystem.into()),
    }
}

/// Stops the service, swallowing every failure.
pub async fn stop_quietly(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    layout: &InstallLayout,
    kind: InitSystemKind,
) {
    let result = match kind {
        InitSystemKind::SystemD => runner.run("systemctl", &["stop", UNIT_FILE_NAME]).await,
        InitSystemKind::UpdateRcD | InitSystemKind::ChkConfig => {
            let script = layout.init_file_path();
            if !fs.exists(&script) {
                return;
            }
            runner.run(&script.to_string_lossy(), &["stop"]).await
        }
        InitSystemKind::Unknown => return,
    };
    match result {
        Ok(out) if out.status.success() => tracing::debug!("service stopped"),
        Ok(out) => tracing::debug!(status = %out.status, "stopping service failed, continuing"),
        Err(e) => tracing::debug!("stopping service failed, continuing: {e:#}"),
    }
}

async fn run_checked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<Output, ServiceError> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    let output = runner
        .run(program, args)
        .await
        .map_err(|e| ServiceError::Registration {
            command: command.clone(),
            detail: format!("{e:#}"),
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match stderr.trim() {
            "" => format!("exited with {}", output.status),
            msg => msg.to_string(),
        };
        return Err(ServiceError::Registration { command, detail });
    }
    Ok(output)
}
