//! Application service — trust-on-first-use adjudication.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{KnownHostsStore, TrustPrompt};
use crate::domain::{HostTrustError, KnownHosts, PendingIdentity, TrustedHostEntry, VerifyOutcome};

/// What happened to a presented identity that the caller may proceed with.
#[derive(Debug)]
pub enum TrustDecision {
    /// Already on record with a matching fingerprint.
    Confirmed,
    /// Accepted by the operator and persisted.
    Added(TrustedHostEntry),
    /// Accepted by the operator, but the store write failed. The current
    /// connection may still proceed.
    /// Carries [`HostTrustError::Persistence`].
    AddFailed {
        entry: TrustedHostEntry,
        error: HostTrustError,
    },
}

/// Verifies `pending` against `known` and, on first contact, asks the
/// operator before persisting it through `store`.
///
/// # Errors
///
/// - [`HostTrustError::InvalidIdentity`] if `pending` has empty fields.
/// - [`HostTrustError::Conflict`] if a stored entry differs. The store is
///   not touched.
/// - [`HostTrustError::Refused`] if the operator declines.
pub fn establish_trust(
    known: &KnownHosts,
    store: &impl KnownHostsStore,
    prompt: &impl TrustPrompt,
    pending: PendingIdentity,
) -> Result<TrustDecision, HostTrustError> {
    pending.validate()?;

    match known.verify(&pending) {
        VerifyOutcome::Confirmed => {
            tracing::debug!(host = %pending.host_name, "host identity confirmed");
            Ok(TrustDecision::Confirmed)
        }
        VerifyOutcome::Conflict(stored) => {
            tracing::warn!(
                host = %pending.host_name,
                stored = %stored.fingerprint,
                presented = %pending.fingerprint,
                "host identity changed"
            );
            Err(HostTrustError::Conflict {
                host: pending.host_name,
                presented: pending.fingerprint,
                stored: stored.fingerprint,
            })
        }
        VerifyOutcome::Trusted => {
            if !prompt.confirm_new_host(&pending)? {
                return Err(HostTrustError::Refused {
                    host: pending.host_name,
                });
            }
            let entry = pending.into_entry();
            match store.add(&entry) {
                Ok(()) => {
                    tracing::info!(host = %entry.host_name, path = %store.path().display(), "host added to known_hosts");
                    Ok(TrustDecision::Added(entry))
                }
                Err(e) => {
                    tracing::warn!(host = %entry.host_name, "failed to persist host identity: {e:#}");
                    let error = HostTrustError::Persistence {
                        host: entry.host_name.clone(),
                        reason: format!("{e:#}"),
                    };
                    Ok(TrustDecision::AddFailed { entry, error })
                }
            }
        }
    }
}
