//! Application service — package-manager ownership of the installed binary.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::service::{parse_dpkg_owner, parse_rpm_owner};
use crate::domain::{InstallationOwnership, ServiceError};

/// Asks RPM, then dpkg, which package owns `bin`. Query failures count as
/// "not owned".
pub async fn classify(runner: &impl CommandRunner, bin: &Path) -> InstallationOwnership {
    let bin = bin.to_string_lossy();

    match query(runner, "rpm", &["-qf", &bin], parse_rpm_owner).await {
        Ok(Some(pkg)) => return InstallationOwnership::RpmManaged(pkg),
        Ok(None) => {}
        Err(e) => tracing::debug!("{e}"),
    }
    match query(runner, "dpkg-query", &["-S", &bin], parse_dpkg_owner).await {
        Ok(Some(pkg)) => return InstallationOwnership::DebManaged(pkg),
        Ok(None) => {}
        Err(e) => tracing::debug!("{e}"),
    }
    tracing::debug!(path = %bin, "binary not owned by a package");
    InstallationOwnership::Unmanaged
}

/// Hands removal to the owning package manager. Failures are reported, not
/// returned.
pub async fn remove_package(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    ownership: &InstallationOwnership,
) {
    let (program, args) = match ownership {
        InstallationOwnership::RpmManaged(pkg) => ("rpm", ["-e", pkg.as_str()]),
        InstallationOwnership::DebManaged(pkg) => ("dpkg", ["-r", pkg.as_str()]),
        InstallationOwnership::Unmanaged => return,
    };
    reporter.step(&format!("removing package with {program} {}", args.join(" ")));
    match runner.run(program, &args).await {
        Ok(out) if out.status.success() => {
            tracing::info!(program, package = args[1], "package removed");
            reporter.success(&format!("removed package {}", args[1]));
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            tracing::warn!(program, status = %out.status, "package removal failed: {}", stderr.trim());
            reporter.warn(&format!("{program} {} failed: {}", args.join(" "), stderr.trim()));
        }
        Err(e) => {
            tracing::warn!(program, "package removal failed: {e:#}");
            reporter.warn(&format!("{program} {} failed: {e:#}", args.join(" ")));
        }
    }
}

async fn query(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
    parse: fn(&str) -> Option<String>,
) -> Result<Option<String>, ServiceError> {
    let command = format!("{program} {}", args.join(" "));
    let output = runner
        .run(program, args)
        .await
        .map_err(|e| ServiceError::OwnershipQuery {
            command: command.clone(),
            detail: format!("{e:#}"),
        })?;
    if !output.status.success() {
        tracing::debug!(%command, status = %output.status, "no owning package");
        return Ok(None);
    }
    Ok(parse(&String::from_utf8_lossy(&output.stdout)))
}
