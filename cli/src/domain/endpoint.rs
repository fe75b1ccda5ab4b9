//! Control endpoint addresses.

use std::fmt;

use crate::domain::error::ConfigError;

pub const DEFAULT_PORT: u16 = 7979;

/// A `host:port` pair. `host` is stored without IPv6 brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// The name recorded in `known_hosts`: the bare host, no port.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parses `tcp://host:port`, `https://host:port`, `host:port`,
/// `[v6]:port` or a bare host.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidAddress`] for unknown schemes, empty hosts,
/// or an unparsable port.
pub fn parse_endpoint(address: &str) -> Result<Endpoint, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let rest = match address.split_once("://") {
        Some(("tcp" | "https" | "tls", rest)) => rest,
        Some((scheme, _)) => return Err(invalid(&format!("unsupported scheme {scheme:?}"))),
        None => address,
    };
    let rest = rest.trim_end_matches('/');

    let (host, port) = if let Some(v6) = rest.strip_prefix('[') {
        let (host, tail) = v6.split_once(']').ok_or_else(|| invalid("unterminated '['"))?;
        match tail {
            "" => (host, None),
            _ => (
                host,
                Some(tail.strip_prefix(':').ok_or_else(|| invalid("expected ':' after ']'"))?),
            ),
        }
    } else if rest.matches(':').count() > 1 {
        // Unbracketed IPv6 literal.
        (rest, None)
    } else {
        match rest.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        }
    };

    if host.is_empty() {
        return Err(invalid("empty host"));
    }
    let port = match port {
        Some(p) => p.parse::<u16>().map_err(|_| invalid("invalid port"))?,
        None => DEFAULT_PORT,
    };
    Ok(Endpoint {
        host: host.to_string(),
        port,
    })
}
