//! Inject the client certificate into `mumble.ini`.

use std::path::Path;
use tracing::{info, warn};

use onionvoice_core::{ByteArrayLiteral, IdentityError, Result};

use crate::fs::{atomic_write, PRIVATE_MODE};

/// Marker line the config template carries where the certificate goes.
pub const CERTIFICATE_TOKEN: &str = "#CERTIFICATE";

fn find_token(content: &[u8]) -> Option<usize> {
    content
        .windows(CERTIFICATE_TOKEN.len())
        .position(|w| w == CERTIFICATE_TOKEN.as_bytes())
}

/// Replace the first [`CERTIFICATE_TOKEN`] in `content` with
/// `certificate=<literal>`. Later occurrences are kept as they are.
///
/// Works on raw bytes, so ini files in legacy encodings pass through intact.
/// Returns `None` when there is no token.
#[must_use]
pub fn inject(content: &[u8], literal: &ByteArrayLiteral) -> Option<Vec<u8>> {
    let pos = find_token(content)?;
    let replacement = format!("certificate={literal}");

    let mut out = Vec::with_capacity(content.len() + replacement.len());
    out.extend_from_slice(&content[..pos]);
    out.extend_from_slice(replacement.as_bytes());
    out.extend_from_slice(&content[pos + CERTIFICATE_TOKEN.len()..]);
    Some(out)
}

fn existing(path: Option<&Path>) -> Result<&Path> {
    match path {
        Some(path) if path.is_file() => Ok(path),
        other => Err(IdentityError::ConfigFileMissing(other.map(Path::to_path_buf))),
    }
}

/// Returns true if the config file still carries the certificate token
pub fn has_token(path: Option<&Path>) -> Result<bool> {
    let path = existing(path)?;
    let content = std::fs::read(path).map_err(|e| IdentityError::read(path, e))?;
    Ok(find_token(&content).is_some())
}

/// Write `literal` into the config file at `path`.
///
/// Returns whether a token was found. Without one the file is left alone;
/// otherwise it is rewritten atomically and owner-only, since the literal
/// carries a private key.
pub fn inject_certificate(path: Option<&Path>, literal: &ByteArrayLiteral) -> Result<bool> {
    let path = existing(path)?;
    let content = std::fs::read(path).map_err(|e| IdentityError::read(path, e))?;

    let Some(injected) = inject(&content, literal) else {
        warn!(path = %path.display(), "config file has no {CERTIFICATE_TOKEN} marker");
        return Ok(false);
    };

    atomic_write(path, &injected, PRIVATE_MODE)?;
    info!(path = %path.display(), "stored client certificate in config file");
    Ok(true)
}
