//! Transport and certificate fetching for onionvoice.
//!
//! The [`Transport`] trait is the seam to the anonymizing network: the
//! default [`HttpTransport`] routes requests through the local Tor SOCKS
//! proxy, tests substitute their own implementation.

#![doc(html_root_url = "https://docs.rs/onionvoice-client/0.1.0")]

mod config;
mod fetcher;
mod transport;

pub use config::*;
pub use fetcher::{CertificateFetcher, ServerIdentity, CERT_SERVER_PORT};
pub use onionvoice_core::{IdentityError, Result};
pub use transport::{HttpTransport, HttpTransportBuilder, Transport};
