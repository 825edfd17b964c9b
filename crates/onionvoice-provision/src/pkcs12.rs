//! PKCS#12 export through an external tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

use onionvoice_core::{IdentityError, Result};

/// Bundles a PEM key and certificate into a password-less PKCS#12 container.
pub trait Pkcs12Exporter: Send + Sync {
    /// Write the container to `out_path` and return its bytes.
    ///
    /// Blocks until the conversion finishes.
    fn export(&self, key_path: &Path, cert_path: &Path, out_path: &Path) -> Result<Vec<u8>>;
}

impl<E: Pkcs12Exporter + ?Sized> Pkcs12Exporter for Arc<E> {
    fn export(&self, key_path: &Path, cert_path: &Path, out_path: &Path) -> Result<Vec<u8>> {
        (**self).export(key_path, cert_path, out_path)
    }
}

/// Runs `openssl pkcs12 -export`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpensslExporter {
    program: PathBuf,
}

impl Default for OpensslExporter {
    fn default() -> Self {
        Self::new("openssl")
    }
}

impl OpensslExporter {
    /// Use `program` instead of `openssl` from `PATH`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program that will be invoked
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to the program
    #[must_use]
    pub fn args(key_path: &Path, cert_path: &Path, out_path: &Path) -> Vec<OsString> {
        vec![
            "pkcs12".into(),
            "-passout".into(),
            "pass:".into(),
            "-inkey".into(),
            key_path.into(),
            "-in".into(),
            cert_path.into(),
            "-export".into(),
            "-out".into(),
            out_path.into(),
        ]
    }
}

impl Pkcs12Exporter for OpensslExporter {
    fn export(&self, key_path: &Path, cert_path: &Path, out_path: &Path) -> Result<Vec<u8>> {
        let program = self.program.display();
        debug!(program = %program, out = %out_path.display(), "exporting PKCS#12 container");

        let output = Command::new(&self.program)
            .args(Self::args(key_path, cert_path, out_path))
            .output()
            .map_err(|e| IdentityError::ExternalTool(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IdentityError::ExternalTool(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        std::fs::read(out_path).map_err(|e| {
            IdentityError::ExternalTool(format!(
                "{program} produced no readable output at {}: {e}",
                out_path.display()
            ))
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Stands in for openssl: checks its inputs exist and returns fixed bytes.
    #[derive(Debug, Default)]
    pub struct FakeExporter {
        pub calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
        pub fail: bool,
    }

    pub const FAKE_CONTAINER: &[u8] = &[0x30, 0x82, 0x0a, 0x00, b'1', b'f', 0x00, b'\n', b'"'];

    impl Pkcs12Exporter for FakeExporter {
        fn export(&self, key_path: &Path, cert_path: &Path, out_path: &Path) -> Result<Vec<u8>> {
            assert!(key_path.is_file(), "key missing: {}", key_path.display());
            assert!(cert_path.is_file(), "cert missing: {}", cert_path.display());
            self.calls.lock().unwrap().push((
                key_path.to_path_buf(),
                cert_path.to_path_buf(),
                out_path.to_path_buf(),
            ));
            if self.fail {
                return Err(IdentityError::ExternalTool("unable to load private key".into()));
            }
            std::fs::write(out_path, FAKE_CONTAINER).map_err(|e| IdentityError::write(out_path, e))?;
            Ok(FAKE_CONTAINER.to_vec())
        }
    }
}
