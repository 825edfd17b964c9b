//! Patch the Mumble client database template in place.
//!
//! The database (`.mumble.sqlite`) ships as a template with one favourite
//! server whose host, port and certificate digest are well-known dummy
//! values. Instead of parsing SQLite we overwrite those byte sequences with
//! the real ones. Replacements must be exactly as wide as the placeholders so
//! no page or record offset moves.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use onionvoice_client::ServerIdentity;
use onionvoice_core::{Fingerprint, IdentityError, Result};

use crate::fs::{atomic_write, SHARED_MODE};

/// Host of the template's favourite server (56-character v3 onion name).
pub const PLACEHOLDER_HOST: &str =
    "ffaaffaabbddaabbddeeaaddccaaffeebbaabbeeddeeaaddbbeeeeff.onion";

/// Port of the template's favourite server.
pub const PLACEHOLDER_PORT: u16 = 64738;

/// Certificate digest of the template's favourite server.
pub const PLACEHOLDER_DIGEST: &str = "AAABACADAFBABBBCBDBEBFCACBCCCDCECFDADBDC";

/// Values to write over the template placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePatch {
    host: String,
    port: u16,
    digest: String,
}

impl DatabasePatch {
    /// Build a patch, rejecting values that do not fit the placeholder width
    pub fn new(host: impl Into<String>, port: u16, digest: impl Into<String>) -> Result<Self> {
        let host = host.into();
        let digest = digest.into();

        if host.len() != PLACEHOLDER_HOST.len() {
            return Err(IdentityError::LengthMismatch {
                field: "host",
                expected: PLACEHOLDER_HOST.len(),
                actual: host.len(),
            });
        }
        if digest.len() != PLACEHOLDER_DIGEST.len() {
            return Err(IdentityError::LengthMismatch {
                field: "digest",
                expected: PLACEHOLDER_DIGEST.len(),
                actual: digest.len(),
            });
        }

        Ok(Self { host, port, digest })
    }

    /// Patch installing a fetched server identity
    pub fn for_server(identity: &ServerIdentity) -> Result<Self> {
        Self::new(
            identity.address.host(),
            identity.address.port_number(),
            identity.fingerprint.as_str(),
        )
    }

    /// Patch from explicit host, port and fingerprint
    pub fn from_fingerprint(host: &str, port: u16, fingerprint: &Fingerprint) -> Result<Self> {
        Self::new(host, port, fingerprint.as_str())
    }

    /// Replacement host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Replacement port
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Replacement digest
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// What a patch did to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PatchOutcome {
    /// Placeholders were replaced
    Applied {
        /// Occurrences of the placeholder host replaced
        host_replacements: usize,
        /// Occurrences of the placeholder digest replaced
        digest_replacements: usize,
    },
    /// The host was already present; nothing was changed
    AlreadyInstalled,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut start = 0;
    while let Some(pos) = find(&haystack[start..], needle) {
        positions.push(start + pos);
        start += pos + needle.len();
    }
    positions
}

/// Apply `patch` to an in-memory database image.
///
/// Every occurrence of the placeholder host and digest is replaced, and the
/// first big-endian occurrence of the placeholder port. All three
/// placeholders are located before anything is written, so on error
/// `database` is untouched.
pub fn patch_bytes(database: &mut [u8], patch: &DatabasePatch) -> Result<PatchOutcome> {
    if find(database, patch.host.as_bytes()).is_some() {
        return Ok(PatchOutcome::AlreadyInstalled);
    }

    let hosts = find_all(database, PLACEHOLDER_HOST.as_bytes());
    if hosts.is_empty() {
        return Err(IdentityError::PlaceholderNotFound { placeholder: "host" });
    }
    let digests = find_all(database, PLACEHOLDER_DIGEST.as_bytes());
    if digests.is_empty() {
        return Err(IdentityError::PlaceholderNotFound {
            placeholder: "digest",
        });
    }
    let port = find(database, &PLACEHOLDER_PORT.to_be_bytes())
        .ok_or(IdentityError::PlaceholderNotFound { placeholder: "port" })?;

    for &pos in &hosts {
        database[pos..pos + patch.host.len()].copy_from_slice(patch.host.as_bytes());
    }
    for &pos in &digests {
        database[pos..pos + patch.digest.len()].copy_from_slice(patch.digest.as_bytes());
    }
    database[port..port + 2].copy_from_slice(&patch.port.to_be_bytes());

    Ok(PatchOutcome::Applied {
        host_replacements: hosts.len(),
        digest_replacements: digests.len(),
    })
}

/// Apply `patch` to the database file at `path`.
///
/// The file is replaced atomically, and only when something changed.
pub fn patch_file(path: &Path, patch: &DatabasePatch) -> Result<PatchOutcome> {
    let mut database = std::fs::read(path).map_err(|e| IdentityError::read(path, e))?;

    debug!(
        path = %path.display(),
        default_host = PLACEHOLDER_HOST,
        default_port = PLACEHOLDER_PORT,
        default_digest = PLACEHOLDER_DIGEST,
        new_host = patch.host(),
        new_port = patch.port(),
        new_digest = patch.digest(),
        "replacing content in client database"
    );

    let outcome = patch_bytes(&mut database, patch)?;
    match outcome {
        PatchOutcome::AlreadyInstalled => {
            info!(host = patch.host(), "server identity already installed");
        }
        PatchOutcome::Applied { .. } => {
            atomic_write(path, &database, SHARED_MODE)?;
            info!(
                host = patch.host(),
                port = patch.port(),
                digest = patch.digest(),
                "stored server identity in client database"
            );
        }
    }

    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A 62-byte onion host distinct from the placeholder.
    pub fn onion_host(c: char) -> String {
        format!("{}.onion", c.to_string().repeat(56))
    }

    /// Something shaped like the client's database template.
    pub fn template() -> Vec<u8> {
        let mut db = b"SQLite format 3\0".to_vec();
        db.extend_from_slice(&[0u8; 84]);
        db.extend_from_slice(b"\x0b\x17");
        db.extend_from_slice(PLACEHOLDER_HOST.as_bytes());
        db.extend_from_slice(&PLACEHOLDER_PORT.to_be_bytes());
        db.extend_from_slice(b"\x07Tor server");
        db.extend_from_slice(PLACEHOLDER_DIGEST.as_bytes());
        db.extend_from_slice(&[0u8; 32]);
        // The host is repeated in the server's ACL cache row.
        db.extend_from_slice(PLACEHOLDER_HOST.as_bytes());
        db.extend_from_slice(&[0xff; 16]);
        db
    }
}
