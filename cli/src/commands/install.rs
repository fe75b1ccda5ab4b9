//! `rexray install` and `rexray uninstall`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::installer::{InstallOutcome, install};
use crate::application::services::uninstaller::{UninstallOutcome, uninstall};
use crate::domain::InstallationOwnership;
use crate::output::TerminalReporter;

/// Arguments for the uninstall command.
#[derive(Args)]
pub struct UninstallArgs {
    /// Invoked from a package manager's removal script; leaves the binary
    /// and package records alone
    #[arg(long)]
    pub package: bool,
}

/// Run `rexray install`.
///
/// # Errors
///
/// Returns an error if not root, a service file cannot be written, or the
/// init system rejects the registration.
pub async fn run_install(app: &AppContext) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let outcome = install(&app.runner, &app.fs, &app.host, &reporter, &app.layout).await?;

    if let InstallOutcome::Installed(kind) = outcome
        && let Some(hint) = app.layout.start_hint(kind)
    {
        app.output.command_hint("REX-Ray has been installed. To start the service run:", &hint);
        app.output.info(&format!(
            "the service runs `{}`; that binary must be a REX-Ray daemon build",
            app.layout.daemon_command()
        ));
    }
    Ok(ExitCode::SUCCESS)
}

/// Run `rexray uninstall [--package]`.
///
/// # Errors
///
/// Returns an error if not root. Cleanup failures are reported as warnings.
pub async fn run_uninstall(app: &AppContext, args: &UninstallArgs) -> Result<ExitCode> {
    let reporter = TerminalReporter::new(&app.output);
    let outcome = uninstall(
        &app.runner,
        &app.fs,
        &app.host,
        &reporter,
        &app.layout,
        args.package,
    )
    .await?;

    match outcome {
        UninstallOutcome::Delegated(InstallationOwnership::RpmManaged(pkg)) => {
            app.output.info(&format!("REX-Ray is managed by the RPM package {pkg}"));
        }
        UninstallOutcome::Delegated(InstallationOwnership::DebManaged(pkg)) => {
            app.output.info(&format!("REX-Ray is managed by the Debian package {pkg}"));
        }
        UninstallOutcome::Delegated(InstallationOwnership::Unmanaged) | UninstallOutcome::Removed(_) => {}
    }
    Ok(ExitCode::SUCCESS)
}
