//! `rexray connect` — establish a trusted session with the control endpoint.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::ports::KnownHostsStore as _;
use crate::application::services::connect::{TrustedSession, open_session};
use crate::application::services::host_trust::TrustDecision;
use crate::domain::{HostTrustError, conflict_warning, parse_endpoint};
use crate::infra::tls_probe::{DEFAULT_HANDSHAKE_TIMEOUT, TlsIdentityProbe};
use crate::output::OutputContext;

/// Arguments for the connect command.
#[derive(Args)]
pub struct ConnectArgs {
    /// Control endpoint, e.g. `tcp://10.0.0.5:7979` (overrides `rexray.host`)
    #[arg(long, short = 'H')]
    pub host: Option<String>,
}

/// How a connection attempt ended when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Connected,
    /// Identity conflict or operator refusal.
    Rejected,
}

impl From<ConnectStatus> for ExitCode {
    fn from(status: ConnectStatus) -> Self {
        match status {
            ConnectStatus::Connected => ExitCode::SUCCESS,
            ConnectStatus::Rejected => ExitCode::FAILURE,
        }
    }
}

/// Run `rexray connect [--host <addr>]`.
///
/// # Errors
///
/// Returns an error if the address is invalid, the trust store is malformed,
/// or the endpoint cannot be reached.
pub async fn run(app: &AppContext, args: &ConnectArgs) -> Result<ExitCode> {
    let address = args.host.as_deref().unwrap_or(&app.config.rexray.host);
    let endpoint = parse_endpoint(address)?;
    let store = app.known_hosts()?;
    let probe = TlsIdentityProbe::new(DEFAULT_HANDSHAKE_TIMEOUT, app.cancel.clone())?;

    let result = open_session(&probe, &store, app, &endpoint).await;
    let status = report(&app.output, store.path(), result, &mut std::io::stderr())?;
    Ok(status.into())
}

/// Prints the operator-facing outcome of a session attempt. Trust messages
/// and the identity-change warning go to `err`.
///
/// # Errors
///
/// Passes through failures other than conflict and refusal, and write errors.
pub fn report(
    output: &OutputContext,
    store_path: &Path,
    result: Result<TrustedSession, HostTrustError>,
    err: &mut impl Write,
) -> Result<ConnectStatus> {
    let session = match result {
        Ok(session) => session,
        Err(HostTrustError::Conflict { host, presented, .. }) => {
            let warning = conflict_warning(&presented, &store_path.display().to_string(), &host);
            write!(err, "{}", warning.style(output.styles.error))?;
            return Ok(ConnectStatus::Rejected);
        }
        Err(e @ HostTrustError::Refused { .. }) => {
            writeln!(err, "{e}")?;
            return Ok(ConnectStatus::Rejected);
        }
        Err(e) => return Err(e.into()),
    };

    match &session.decision {
        TrustDecision::Confirmed => {}
        TrustDecision::Added(entry) => writeln!(
            err,
            "Permanently added host {} to known_hosts file {}",
            entry.host_name,
            store_path.display()
        )?,
        TrustDecision::AddFailed { error, .. } => writeln!(err, "{error}")?,
    }

    output.success(&format!("connected to {}", session.endpoint));
    output.kv(
        "fingerprint",
        &format!("{} {}", session.identity.algorithm, session.identity.fingerprint),
    );
    Ok(ConnectStatus::Connected)
}
