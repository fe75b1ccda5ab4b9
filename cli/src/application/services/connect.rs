//! Application service — client session setup against the control endpoint.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Context;

use crate::application::ports::{IdentityProbe, KnownHostsStore, TrustPrompt};
use crate::application::services::host_trust::{TrustDecision, establish_trust};
use crate::domain::{Endpoint, HostTrustError, PendingIdentity};

/// A session whose peer identity has been adjudicated.
#[derive(Debug)]
pub struct TrustedSession {
    pub endpoint: Endpoint,
    pub identity: PendingIdentity,
    pub decision: TrustDecision,
}

/// Loads the trust store, probes `endpoint` for its identity and adjudicates it.
///
/// The store is loaded before any network traffic so a malformed store fails
/// fast.
///
/// # Errors
///
/// Returns a [`HostTrustError`] if the store is unreadable or malformed, the
/// probe fails, or the identity is refused or conflicts with the store.
pub async fn open_session(
    probe: &impl IdentityProbe,
    store: &impl KnownHostsStore,
    prompt: &impl TrustPrompt,
    endpoint: &Endpoint,
) -> Result<TrustedSession, HostTrustError> {
    let known = store.load()?;
    tracing::debug!(path = %store.path().display(), entries = known.len(), "loaded known_hosts");

    let identity = probe
        .fetch_identity(endpoint)
        .await
        .with_context(|| format!("retrieving identity of {endpoint}"))?;

    let decision = establish_trust(&known, store, prompt, identity.clone())?;
    Ok(TrustedSession {
        endpoint: endpoint.clone(),
        identity,
        decision,
    })
}
