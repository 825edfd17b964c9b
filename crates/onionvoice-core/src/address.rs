//! Resolve `scheme://host:port[...]` addresses into host and port.

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::{IdentityError, Result};

/// A server address, parsed once from a URL-shaped string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    host: String,
    port: String,
}

impl Address {
    /// Host name without brackets (onion name, DNS name or IP literal)
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port exactly as written in the address
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Port as a number
    ///
    /// Always succeeds for addresses built by [`resolve`], which validates
    /// the port range.
    #[must_use]
    pub fn port_number(&self) -> u16 {
        self.port.parse().unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parse a URL-shaped address into its host and explicit port.
///
/// The port must be written out, even when it is the default for the
/// scheme: `http://host:80/` resolves, `http://host/` does not.
pub fn resolve(address: &str) -> Result<Address> {
    let invalid = |reason: &str| IdentityError::InvalidAddress(format!("{address:?}: {reason}"));

    Url::parse(address).map_err(|e| invalid(&e.to_string()))?;

    // The url crate drops ports that match the scheme default, so the
    // authority is split from the raw text instead.
    let (_, rest) = address
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme separator"))?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port"))?;
        (host, port)
    } else {
        host_port
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    if port.is_empty() {
        return Err(invalid("missing port"));
    }
    port.parse::<u16>().map_err(|_| invalid("port is not a number"))?;

    Ok(Address {
        host: host.to_string(),
        port: port.to_string(),
    })
}
