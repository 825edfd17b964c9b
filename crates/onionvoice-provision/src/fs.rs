//! File writes with explicit permissions.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use onionvoice_core::{IdentityError, Result};
use tempfile::NamedTempFile;

/// Owner read/write only. Used for anything holding key material.
pub const PRIVATE_MODE: u32 = 0o600;

/// Owner read/write, world readable.
pub const SHARED_MODE: u32 = 0o644;

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// Replace `path` with `contents` atomically.
///
/// The data goes to a sibling temporary file which is synced and then
/// renamed over `path`. On any failure the temporary file is removed and
/// `path` keeps its previous content.
pub fn atomic_write(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| IdentityError::write(path, e))?;
    tmp.write_all(contents)
        .map_err(|e| IdentityError::write(path, e))?;
    set_mode(tmp.as_file(), mode).map_err(|e| IdentityError::write(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| IdentityError::write(path, e))?;
    tmp.persist(path)
        .map_err(|e| IdentityError::write(path, e.error))?;

    Ok(())
}

/// Create or truncate `path` with owner-only permissions and write `contents`.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_MODE);
    }

    let mut file = options.open(path).map_err(|e| IdentityError::write(path, e))?;
    // The mode above only applies to newly created files.
    set_mode(&file, PRIVATE_MODE).map_err(|e| IdentityError::write(path, e))?;
    file.write_all(contents)
        .map_err(|e| IdentityError::write(path, e))?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn mode_of(path: &Path) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.bin");
        std::fs::write(&path, b"old").unwrap();

        atomic_write(&path, b"new content", SHARED_MODE).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new content");
        // No temporary files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_sets_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mumble.ini");

        atomic_write(&path, b"[net]", PRIVATE_MODE).unwrap();
        assert_eq!(mode_of(&path), 0o600);

        atomic_write(&path, b"[net]", SHARED_MODE).unwrap();
        assert_eq!(mode_of(&path), 0o644);
    }

    #[test]
    fn test_atomic_write_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("file.bin");
        assert!(matches!(
            atomic_write(&path, b"x", SHARED_MODE),
            Err(IdentityError::Write { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.pem");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"secret").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"secret");
        assert_eq!(mode_of(&path), 0o600);
    }
}
