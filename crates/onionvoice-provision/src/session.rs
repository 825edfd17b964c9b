//! Provisioning session.
//!
//! The session owns the client's configuration state (where the database
//! and config file live) behind an async mutex, so at most one provisioning
//! run touches those files at a time.
//!
//! ```text
//! provision(address)
//!   ├── Flow A: resolve ─> fetch :8181 ─> fingerprint ─> patch .mumble.sqlite
//!   └── Flow B: RSA key + cert ─> openssl pkcs12 ─> @ByteArray ─> mumble.ini
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use onionvoice_client::{
    CertificateFetcher, HttpTransport, ServerIdentity, Transport, TransportConfig,
};
use onionvoice_core::{resolve, ByteArrayLiteral, IdentityError, Result};

use crate::client_config;
use crate::database::{self, DatabasePatch, PatchOutcome};
use crate::identity;
use crate::layout::{self, ClientLayout};
use crate::pkcs12::{OpensslExporter, Pkcs12Exporter};

/// What happened to the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedOutcome {
    /// A fresh client certificate replaced the marker
    Injected,
    /// The marker was already consumed; no certificate was generated
    TokenAbsent,
}

/// Result of a full provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Server host
    pub host: String,
    /// Server voice port
    pub port: String,
    /// SHA-1 fingerprint of the server certificate
    pub digest: String,
    /// Database patch result
    pub database: PatchOutcome,
    /// Config file result
    pub config: EmbedOutcome,
}

#[derive(Debug, Default)]
struct ClientState {
    layout: Option<ClientLayout>,
}

impl ClientState {
    fn layout(&self) -> Result<&ClientLayout> {
        self.layout.as_ref().ok_or(IdentityError::NotInitialized)
    }
}

/// Session over the default transport and exporter
pub type TorSession = ProvisioningSession<HttpTransport, OpensslExporter>;

/// Serializes provisioning work against one client's files
pub struct ProvisioningSession<T, E> {
    state: Mutex<ClientState>,
    fetcher: CertificateFetcher<T>,
    exporter: Arc<E>,
}

impl TorSession {
    /// Session fetching through `config` and exporting with the openssl at `openssl`
    pub fn tor(config: &TransportConfig, openssl: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(
            HttpTransport::new(config)?,
            OpensslExporter::new(openssl),
        ))
    }
}

async fn run_blocking<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IdentityError::Internal(format!("blocking task failed: {e}")))?
}

impl<T, E> ProvisioningSession<T, E>
where
    T: Transport,
    E: Pkcs12Exporter + 'static,
{
    /// Create a session with no client layout yet
    pub fn new(transport: T, exporter: E) -> Self {
        Self {
            state: Mutex::new(ClientState::default()),
            fetcher: CertificateFetcher::new(transport),
            exporter: Arc::new(exporter),
        }
    }

    /// Currently tracked client layout
    pub async fn layout(&self) -> Option<ClientLayout> {
        self.state.lock().await.layout.clone()
    }

    /// Track an existing client layout without writing anything
    pub async fn attach(&self, layout: ClientLayout) {
        self.state.lock().await.layout = Some(layout);
    }

    /// Write fresh templates into the client directory at `path` and track them.
    ///
    /// A config file tracked from an earlier layout elsewhere is removed.
    pub async fn initialize(
        &self,
        path: &Path,
        database_template: Vec<u8>,
        config_template: String,
    ) -> Result<ClientLayout> {
        let mut state = self.state.lock().await;

        let path = path.to_path_buf();
        let layout = run_blocking(move || {
            layout::initialize(&path, &database_template, &config_template)
        })
        .await?;

        if let Some(previous) = state.layout.take() {
            if previous.config_file != layout.config_file && previous.config_file.is_file() {
                if let Err(e) = std::fs::remove_file(&previous.config_file) {
                    warn!(
                        path = %previous.config_file.display(),
                        error = %e,
                        "could not remove old config file"
                    );
                }
            }
        }

        info!(dir = ?layout.dir(), "client configuration initialized");
        state.layout = Some(layout.clone());
        Ok(layout)
    }

    /// Flow A: fetch the server certificate for `address` and store it in the database.
    pub async fn install_server_identity(
        &self,
        address: &str,
    ) -> Result<(ServerIdentity, PatchOutcome)> {
        let state = self.state.lock().await;
        self.install_locked(&state, address).await
    }

    /// Flow B: mint a client certificate and store it in the config file.
    pub async fn embed_client_certificate(&self) -> Result<EmbedOutcome> {
        let state = self.state.lock().await;
        self.embed_locked(&state).await
    }

    /// Run both flows under one lock, waiting for any run in progress.
    pub async fn provision(&self, address: &str) -> Result<ProvisionReport> {
        let state = self.state.lock().await;
        self.provision_locked(&state, address).await
    }

    /// Like [`provision`](Self::provision), but fail with
    /// [`IdentityError::SessionBusy`] instead of waiting.
    pub async fn try_provision(&self, address: &str) -> Result<ProvisionReport> {
        let state = self
            .state
            .try_lock()
            .map_err(|_| IdentityError::SessionBusy)?;
        self.provision_locked(&state, address).await
    }

    /// Mint a client certificate literal without touching any client file.
    pub async fn generate_client_literal(&self) -> Result<ByteArrayLiteral> {
        let exporter = Arc::clone(&self.exporter);
        run_blocking(move || identity::generate_client_literal(exporter.as_ref())).await
    }

    async fn provision_locked(
        &self,
        state: &MutexGuard<'_, ClientState>,
        address: &str,
    ) -> Result<ProvisionReport> {
        let (identity, database) = self.install_locked(state, address).await?;
        let config = self.embed_locked(state).await?;

        Ok(ProvisionReport {
            host: identity.address.host().to_string(),
            port: identity.address.port().to_string(),
            digest: identity.fingerprint.to_string(),
            database,
            config,
        })
    }

    async fn install_locked(
        &self,
        state: &ClientState,
        address: &str,
    ) -> Result<(ServerIdentity, PatchOutcome)> {
        let database = state.layout()?.database.clone();
        let address = resolve(address)?;

        let identity = self.fetcher.fetch_identity(&address).await?;
        let patch = DatabasePatch::for_server(&identity)?;

        let outcome = run_blocking(move || database::patch_file(&database, &patch)).await?;
        Ok((identity, outcome))
    }

    async fn embed_locked(&self, state: &ClientState) -> Result<EmbedOutcome> {
        let config_file = state.layout()?.config_file.clone();
        let exporter = Arc::clone(&self.exporter);

        run_blocking(move || {
            if !client_config::has_token(Some(&config_file))? {
                info!(path = %config_file.display(), "client certificate already present");
                return Ok(EmbedOutcome::TokenAbsent);
            }
            let literal = identity::generate_client_literal(exporter.as_ref())?;
            client_config::inject_certificate(Some(&config_file), &literal)?;
            Ok(EmbedOutcome::Injected)
        })
        .await
    }
}
