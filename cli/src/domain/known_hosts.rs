//! Trust-on-first-use host identity model.
//!
//! Pure parsing and adjudication over the `known_hosts` text format:
//! `<host> <algorithm> <fingerprint>`, one entry per line. No I/O.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::HostTrustError;

/// Digest algorithm recorded for TLS peer identities.
pub const DEFAULT_ALGORITHM: &str = "sha256";

// ── Fingerprint ───────────────────────────────────────────────────────────────

/// Raw fingerprint bytes. Displays as colon-separated uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    /// Accepts `AA:BB:CC` and plain `aabbcc`. Colon-separated groups must be
    /// exactly two hex digits each.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty fingerprint".to_string());
        }
        if !s.contains(':') {
            return hex::decode(s)
                .map(Self)
                .map_err(|e| format!("invalid fingerprint {s:?}: {e}"));
        }
        s.split(':')
            .map(|group| {
                if group.len() != 2 {
                    return Err(format!("invalid fingerprint {s:?}: group {group:?} is not one byte"));
                }
                let mut byte = [0u8; 1];
                hex::decode_to_slice(group, &mut byte)
                    .map(|()| byte[0])
                    .map_err(|e| format!("invalid fingerprint {s:?}: {e}"))
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Self)
    }
}

// ── Entries ───────────────────────────────────────────────────────────────────

/// A persisted, operator-approved host identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHostEntry {
    pub host_name: String,
    pub algorithm: String,
    pub fingerprint: Fingerprint,
}

impl fmt::Display for TrustedHostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.host_name, self.algorithm, self.fingerprint)
    }
}

/// An identity presented during a connection attempt. Never persisted unless
/// promoted with [`PendingIdentity::into_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIdentity {
    pub host_name: String,
    pub algorithm: String,
    pub fingerprint: Fingerprint,
}

impl PendingIdentity {
    #[must_use]
    pub fn new(host_name: impl Into<String>, algorithm: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            host_name: host_name.into(),
            algorithm: algorithm.into(),
            fingerprint,
        }
    }

    /// Checks the fields can be written as a single `known_hosts` line.
    ///
    /// # Errors
    ///
    /// Returns [`HostTrustError::InvalidIdentity`] if the host name or
    /// fingerprint is empty, or a field contains whitespace.
    pub fn validate(&self) -> Result<(), HostTrustError> {
        if self.host_name.is_empty() {
            return Err(HostTrustError::InvalidIdentity("empty host name".to_string()));
        }
        if self.fingerprint.is_empty() {
            return Err(HostTrustError::InvalidIdentity(format!(
                "empty fingerprint for {}",
                self.host_name
            )));
        }
        if self.algorithm.is_empty() {
            return Err(HostTrustError::InvalidIdentity(format!(
                "empty algorithm for {}",
                self.host_name
            )));
        }
        if self.host_name.contains(char::is_whitespace) || self.algorithm.contains(char::is_whitespace) {
            return Err(HostTrustError::InvalidIdentity(format!(
                "whitespace in identity for {:?}",
                self.host_name
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_entry(self) -> TrustedHostEntry {
        TrustedHostEntry {
            host_name: self.host_name,
            algorithm: self.algorithm,
            fingerprint: self.fingerprint,
        }
    }
}

/// Result of checking a presented identity against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// First contact: no entry for this host. The caller must ask the operator.
    Trusted,
    /// Stored entry matches algorithm and fingerprint.
    Confirmed,
    /// Stored entry differs. Carries the stored entry, which stays untouched.
    Conflict(TrustedHostEntry),
}

// ── Store contents ────────────────────────────────────────────────────────────

/// Parsed contents of a `known_hosts` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownHosts {
    entries: Vec<TrustedHostEntry>,
}

impl KnownHosts {
    /// Parses `known_hosts` text. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HostTrustError::MalformedStore`] on a wrong field count, bad
    /// hex, an empty fingerprint, or a duplicate host.
    pub fn parse(content: &str) -> Result<Self, HostTrustError> {
        let mut hosts = Self::default();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = |reason: String| HostTrustError::MalformedStore {
                line: idx + 1,
                reason,
            };
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [host, algorithm, fingerprint] = fields.as_slice() else {
                return Err(malformed(format!(
                    "expected 3 fields (host algorithm fingerprint), found {}",
                    fields.len()
                )));
            };
            let fingerprint = fingerprint.parse::<Fingerprint>().map_err(malformed)?;
            if hosts.get(host).is_some() {
                return Err(malformed(format!("duplicate entry for host {host}")));
            }
            hosts.entries.push(TrustedHostEntry {
                host_name: (*host).to_string(),
                algorithm: (*algorithm).to_string(),
                fingerprint,
            });
        }
        Ok(hosts)
    }

    #[must_use]
    pub fn get(&self, host_name: &str) -> Option<&TrustedHostEntry> {
        self.entries.iter().find(|e| e.host_name == host_name)
    }

    /// Adjudicates a presented identity. Never mutates the store.
    #[must_use]
    pub fn verify(&self, pending: &PendingIdentity) -> VerifyOutcome {
        match self.get(&pending.host_name) {
            None => VerifyOutcome::Trusted,
            Some(stored)
                if stored.algorithm == pending.algorithm
                    && stored.fingerprint == pending.fingerprint =>
            {
                VerifyOutcome::Confirmed
            }
            Some(stored) => VerifyOutcome::Conflict(stored.clone()),
        }
    }

    /// Adds a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`HostTrustError::AlreadyTrusted`] if the host already has an
    /// entry; existing entries are never replaced.
    pub fn insert(&mut self, entry: TrustedHostEntry) -> Result<(), HostTrustError> {
        if self.get(&entry.host_name).is_some() {
            return Err(HostTrustError::AlreadyTrusted(entry.host_name));
        }
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders the identity-change warning printed when a stored entry conflicts.
#[must_use]
pub fn conflict_warning(presented: &Fingerprint, store_path: &str, host: &str) -> String {
    format!(
        "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
         @ WARNING: REMOTE HOST IDENTIFICATION HAS CHANGED! @\n\
         @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
         IT IS POSSIBLE THAT SOMEONE IS DOING SOMETHING NASTY!\n\
         Someone could be eavesdropping on you right now (man-in-the-middle attack)!\n\
         It is also possible that the RSA host key has just been changed.\n\
         The fingerprint for the RSA key sent by the remote host is\n\
         {presented}.\n\
         Please contact your system administrator.\n\
         Add correct host key in {store_path} to get rid of this message.\n\
         Offending key in {store_path}\n\
         RSA host key for {host} has changed and you have requested strict checking.\n\
         Host key verification failed.\n"
    )
}
