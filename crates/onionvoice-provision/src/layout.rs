//! On-disk layout of a Mumble client directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use onionvoice_core::{IdentityError, Result};

use crate::fs::{atomic_write, PRIVATE_MODE, SHARED_MODE};

/// Client config file name.
pub const CONFIG_FILE_NAME: &str = "mumble.ini";

/// Client database file name.
pub const DATABASE_FILE_NAME: &str = ".mumble.sqlite";

/// Folders the client expects next to its binary. Created best-effort.
pub const AUXILIARY_DIRS: [&str; 3] = ["Overlay", "Plugins", "Themes"];

/// The two artifacts provisioning mutates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientLayout {
    /// Binary client database (`.mumble.sqlite`)
    pub database: PathBuf,
    /// Text config file (`mumble.ini`)
    pub config_file: PathBuf,
}

impl ClientLayout {
    /// Standard file names inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            database: dir.join(DATABASE_FILE_NAME),
            config_file: dir.join(CONFIG_FILE_NAME),
        }
    }

    /// Directory holding the config file
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.config_file.parent()
    }
}

/// Resolve the client directory from a directory or a path inside it.
///
/// An existing file (typically the client binary) resolves to its parent;
/// anything else is taken as the directory itself.
#[must_use]
pub fn client_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        path.to_path_buf()
    }
}

/// Create the client directory and write fresh database and config templates.
///
/// Missing auxiliary folders are logged and otherwise ignored. Existing
/// database and config files are replaced.
pub fn initialize(
    path: &Path,
    database_template: &[u8],
    config_template: &str,
) -> Result<ClientLayout> {
    let dir = client_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| IdentityError::write(&dir, e))?;

    for name in AUXILIARY_DIRS {
        let aux = dir.join(name);
        if let Err(e) = std::fs::create_dir_all(&aux) {
            warn!(path = %aux.display(), error = %e, "could not create client folder");
        }
    }

    let layout = ClientLayout::in_dir(&dir);
    atomic_write(&layout.database, database_template, SHARED_MODE)?;
    atomic_write(&layout.config_file, config_template.as_bytes(), PRIVATE_MODE)?;

    debug!(
        database = %layout.database.display(),
        config = %layout.config_file.display(),
        "initialized client layout"
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_writes_templates() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("mumble");

        let layout = initialize(&dir, b"db-template", "#CERTIFICATE\n").unwrap();
        assert_eq!(layout, ClientLayout::in_dir(&dir));
        assert_eq!(std::fs::read(&layout.database).unwrap(), b"db-template");
        assert_eq!(
            std::fs::read_to_string(&layout.config_file).unwrap(),
            "#CERTIFICATE\n"
        );
        for name in AUXILIARY_DIRS {
            assert!(dir.join(name).is_dir());
        }
    }

    #[test]
    fn test_initialize_from_binary_path() {
        let root = TempDir::new().unwrap();
        let binary = root.path().join("mumble");
        std::fs::write(&binary, b"\x7fELF").unwrap();

        let layout = initialize(&binary, b"db", "ini").unwrap();
        assert_eq!(layout.dir(), Some(root.path()));
        assert_eq!(std::fs::read(&binary).unwrap(), b"\x7fELF");
    }

    #[test]
    fn test_auxiliary_dir_failure_is_not_fatal() {
        let root = TempDir::new().unwrap();
        // A file squatting on a folder name makes create_dir_all fail.
        std::fs::write(root.path().join("Plugins"), b"").unwrap();

        let layout = initialize(root.path(), b"db", "ini").unwrap();
        assert!(layout.database.is_file());
        assert!(root.path().join("Overlay").is_dir());
        assert!(root.path().join("Plugins").is_file());
    }

    #[test]
    fn test_reinitialize_replaces_files() {
        let root = TempDir::new().unwrap();
        initialize(root.path(), b"first", "first").unwrap();
        let layout = initialize(root.path(), b"second", "second").unwrap();
        assert_eq!(std::fs::read(&layout.database).unwrap(), b"second");
        assert_eq!(std::fs::read_to_string(&layout.config_file).unwrap(), "second");
    }
}
