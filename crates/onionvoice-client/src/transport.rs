//! HTTP transport capability.

use async_trait::async_trait;
use onionvoice_core::{IdentityError, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::debug;

use crate::config::TransportConfig;

/// Fetches the body behind a URL.
///
/// Errors are reported as-is; implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the raw response body
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// [`Transport`] backed by reqwest, optionally through a proxy
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    /// Create a transport from a configuration
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = HttpTransportBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.clone());
        }
        builder.build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %url, "GET request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        debug!(url = %url, bytes = body.len(), "response received");
        Ok(body.to_vec())
    }
}

/// Builder for configuring an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    proxy: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransportBuilder {
    /// Direct connections with default timeout and User-Agent
    #[must_use]
    pub fn new() -> Self {
        let defaults = TransportConfig::direct();
        Self {
            proxy: None,
            timeout: defaults.timeout,
            user_agent: defaults.user_agent,
        }
    }

    /// Route every request through `proxy` (e.g. `socks5h://127.0.0.1:9050`)
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

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .no_proxy();

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| IdentityError::Transport(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(HttpTransport { http })
    }
}
