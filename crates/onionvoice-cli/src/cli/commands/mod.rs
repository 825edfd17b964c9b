//! Command implementations.

pub mod config;
pub mod decode;
pub mod encode;
pub mod fingerprint;
pub mod generate;
pub mod init;
pub mod install_server;
pub mod provision;
pub mod resolve;

use std::io::Read;
use std::path::{Path, PathBuf};

use onionvoice::{
    client_dir, CertificateFetcher, ClientLayout, HttpTransport, OpensslExporter, TorSession,
    TransportConfig,
};

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// How requests reach the server
    pub transport: TransportConfig,

    /// openssl binary for PKCS#12 export
    pub openssl: PathBuf,

    /// Default client directory from the config file
    pub client_dir: Option<PathBuf>,
}

impl Context {
    /// Resolve the client directory from the argument or the config file.
    pub fn require_client_dir(&self, arg: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        let path = arg.or_else(|| self.client_dir.clone()).ok_or_else(|| {
            anyhow::anyhow!(
                "Client directory required.\n\n\
                 Set it with one of:\n  \
                 1. --dir <PATH>\n  \
                 2. ONIONVOICE_CLIENT_DIR environment variable\n  \
                 3. onionvoice config set client_dir <PATH>"
            )
        })?;
        Ok(client_dir(&path))
    }

    /// Session over the configured transport and openssl binary.
    pub fn session(&self) -> anyhow::Result<TorSession> {
        Ok(TorSession::tor(&self.transport, &self.openssl)?)
    }

    /// Session already attached to the client directory at `dir`.
    pub async fn attached_session(&self, dir: &Path) -> anyhow::Result<TorSession> {
        let session = self.session()?;
        session.attach(ClientLayout::in_dir(dir)).await;
        Ok(session)
    }

    /// Certificate fetcher over the configured transport.
    pub fn fetcher(&self) -> anyhow::Result<CertificateFetcher<HttpTransport>> {
        Ok(CertificateFetcher::new(HttpTransport::new(&self.transport)?))
    }

    /// PKCS#12 exporter using the configured openssl binary.
    pub fn exporter(&self) -> OpensslExporter {
        OpensslExporter::new(&self.openssl)
    }
}

/// Read a whole file, or stdin when `path` is `None`.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}
