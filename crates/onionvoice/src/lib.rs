//! Provision portable Mumble clients for Tor onion voice servers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use onionvoice::{ClientLayout, TorSession, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> onionvoice::Result<()> {
//!     let session = TorSession::tor(&TransportConfig::tor(), "openssl")?;
//!
//!     // Fresh templates shipped with the client bundle
//!     let database = include_bytes!("templates/.mumble.sqlite").to_vec();
//!     let config = include_str!("templates/mumble.ini").to_string();
//!     session.initialize("/opt/mumble".as_ref(), database, config).await?;
//!
//!     // Trust the server and mint a client certificate
//!     let report = session.provision("mumble://example.onion:64738").await?;
//!     println!("Server digest: {}", report.digest);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/onionvoice/0.1.0")]

// Re-export core types
pub use onionvoice_core::*;

// Re-export transport
pub use onionvoice_client::{
    CertificateFetcher, HttpTransport, HttpTransportBuilder, ServerIdentity, Transport,
    TransportConfig, CERT_SERVER_PORT, DEFAULT_TIMEOUT, DEFAULT_TOR_PROXY,
};

// Re-export provisioning
pub use onionvoice_provision::{
    client_config, client_dir, database, identity, layout, pkcs12, ClientLayout, DatabasePatch,
    EmbedOutcome, OpensslExporter, PatchOutcome, Pkcs12Exporter, ProvisionReport,
    ProvisioningSession, TorSession,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
