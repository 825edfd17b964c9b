//! # onionvoice-provision
//!
//! Provisions a portable Mumble client for a Tor onion server:
//!
//! - [`database`]: write the server's host, port and certificate digest into
//!   the client database template
//! - [`identity`] and [`pkcs12`]: mint a self-signed client certificate and
//!   package it as PKCS#12
//! - [`client_config`]: embed that container in `mumble.ini`
//! - [`ProvisioningSession`]: run the above against one client directory,
//!   one run at a time
//!
//! ## Example
//!
//! ```rust,ignore
//! use onionvoice_client::TransportConfig;
//! use onionvoice_provision::{ClientLayout, TorSession};
//!
//! let session = TorSession::tor(&TransportConfig::tor(), "openssl")?;
//! session.attach(ClientLayout::in_dir("/opt/mumble".as_ref())).await;
//! let report = session.provision("mumble://example.onion:64738").await?;
//! println!("{}", report.digest);
//! ```

pub mod client_config;
pub mod database;
mod fs;
pub mod identity;
pub mod layout;
pub mod pkcs12;
mod session;

pub use database::{DatabasePatch, PatchOutcome};
pub use layout::{client_dir, ClientLayout};
pub use pkcs12::{OpensslExporter, Pkcs12Exporter};
pub use session::{EmbedOutcome, ProvisionReport, ProvisioningSession, TorSession};

pub use onionvoice_core::{IdentityError, Result};
