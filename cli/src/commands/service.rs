//! `rexray service` — drive the installed service through its init system.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::{init_system, privileges::require_root};
use crate::domain::ServiceOp;

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Start the service
    Start,
    /// Stop the service
    Stop,
    /// Restart the service
    Restart,
    /// Show the service status
    Status,
    /// Print the detected init system
    Initsys,
}

/// Run a `rexray service` subcommand.
///
/// # Errors
///
/// Returns an error if a privileged operation is attempted without root, no
/// init system is found, or the init system command cannot be spawned.
pub async fn run(app: &AppContext, cmd: &ServiceCommand) -> Result<ExitCode> {
    let op = match cmd {
        ServiceCommand::Initsys => {
            println!("{}", init_system::detect(&app.host).command_name());
            return Ok(ExitCode::SUCCESS);
        }
        ServiceCommand::Start => ServiceOp::Start,
        ServiceCommand::Stop => ServiceOp::Stop,
        ServiceCommand::Restart => ServiceOp::Restart,
        ServiceCommand::Status => ServiceOp::Status,
    };

    if let Some(past) = op.privileged_as() {
        require_root(&app.host, past)?;
    }
    let kind = init_system::detect(&app.host);
    let status = init_system::control(&app.runner, &app.fs, &app.layout, kind, op).await?;

    if status.success() {
        return Ok(ExitCode::SUCCESS);
    }
    tracing::debug!(%status, op = op.as_str(), "init system reported failure");
    let code = status.code().and_then(|c| u8::try_from(c).ok()).unwrap_or(1);
    Ok(ExitCode::from(code))
}
