//! Server certificate retrieval.
//!
//! A Mumble server provisioned for onion use publishes its certificate as a
//! plain PEM document on a fixed side port. We fetch it once and trust it.

use onionvoice_core::{
    decode_certificate, fingerprint, Address, Certificate, Fingerprint, IdentityError, Result,
};
use tracing::{debug, info};
use url::Url;

use crate::transport::Transport;

/// Port the certificate server listens on, next to the voice port.
pub const CERT_SERVER_PORT: u16 = 8181;

/// Everything learned about a server from its certificate endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// Address the user asked for
    pub address: Address,
    /// Certificate served on [`CERT_SERVER_PORT`]
    pub certificate: Certificate,
    /// SHA-1 digest of the certificate
    pub fingerprint: Fingerprint,
}

/// Fetches server certificates through a [`Transport`]
#[derive(Debug, Clone)]
pub struct CertificateFetcher<T> {
    transport: T,
}

impl<T: Transport> CertificateFetcher<T> {
    /// Create a fetcher on top of `transport`
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// URL of the certificate endpoint for `host`
    pub fn certificate_url(host: &str) -> Result<Url> {
        let mut url =
            Url::parse("http://localhost/").map_err(|e| IdentityError::Internal(e.to_string()))?;

        let host_part = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        url.set_host(Some(&host_part))
            .map_err(|e| IdentityError::InvalidAddress(format!("{host:?}: {e}")))?;
        url.set_port(Some(CERT_SERVER_PORT)).map_err(|()| {
            IdentityError::InvalidAddress(format!("{host:?}: cannot carry a port"))
        })?;

        Ok(url)
    }

    /// Fetch the raw candidate certificate served for `host`.
    ///
    /// Transport errors are returned unchanged and never retried.
    pub async fn fetch(&self, host: &str) -> Result<Vec<u8>> {
        let url = Self::certificate_url(host)?;
        debug!(url = %url, "fetching server certificate");
        self.transport.fetch(url.as_str()).await
    }

    /// Fetch, decode and fingerprint the certificate for `address`.
    pub async fn fetch_identity(&self, address: &Address) -> Result<ServerIdentity> {
        let body = self.fetch(address.host()).await?;
        let certificate = decode_certificate(&body)?;
        let fingerprint = fingerprint(&certificate);

        info!(
            host = address.host(),
            port = address.port(),
            digest = %fingerprint,
            "fetched server certificate"
        );

        Ok(ServerIdentity {
            address: address.clone(),
            certificate,
            fingerprint,
        })
    }
}
