//! Transport configuration types.

use std::time::Duration;

/// Tor's default SOCKS listener. `socks5h` lets the proxy resolve `.onion`
/// names.
pub const DEFAULT_TOR_PROXY: &str = "socks5h://127.0.0.1:9050";

/// Default request timeout. Onion services are slow to build circuits to.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How requests leave the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// SOCKS/HTTP proxy URL, `None` for direct connections
    pub proxy: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::tor()
    }
}

impl TransportConfig {
    /// Route through the local Tor SOCKS proxy
    #[must_use]
    pub fn tor() -> Self {
        Self {
            proxy: Some(DEFAULT_TOR_PROXY.to_string()),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("onionvoice/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Connect directly, without any proxy
    #[must_use]
    pub fn direct() -> Self {
        Self {
            proxy: None,
            ..Self::tor()
        }
    }

    /// Set the proxy URL
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_route_through_tor() {
        let config = TransportConfig::default();
        assert_eq!(config.proxy.as_deref(), Some(DEFAULT_TOR_PROXY));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("onionvoice/"));
    }

    #[test]
    fn test_direct_has_no_proxy() {
        let config = TransportConfig::direct().timeout(Duration::from_secs(5));
        assert!(config.proxy.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
