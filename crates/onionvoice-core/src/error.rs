use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for identity provisioning operations
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Broad classification of an [`IdentityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input (address, certificate, literal)
    Input,
    /// Filesystem failure
    Io,
    /// The external conversion tool failed
    ExternalTool,
    /// The HTTP transport failed
    Transport,
    /// Key generation or certificate encoding failed
    Crypto,
    /// The session is not in a state that allows the operation
    State,
    /// The database template does not look like the one we expect
    Placeholder,
    /// Anything else
    Internal,
}

/// Errors that can occur while provisioning a client identity
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The address is not URL-shaped or lacks an explicit port
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// No PEM block could be decoded, or it is not a certificate
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// A `@ByteArray(...)` literal could not be decoded
    #[error("malformed byte array literal at offset {offset}: {reason}")]
    MalformedLiteral {
        /// Character offset of the problem, relative to the whole literal
        offset: usize,
        /// What went wrong
        reason: String,
    },

    /// Reading a file failed
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The scratch directory for key material could not be created
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    /// The conversion tool is missing, exited with failure, or produced nothing
    #[error("external tool failed: {0}")]
    ExternalTool(String),

    /// The HTTP transport could not complete the request
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// RSA key generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Certificate or key encoding failed
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The client layout has not been initialized or attached yet
    #[error("client configuration has not been initialized")]
    NotInitialized,

    /// The config file is unset or does not exist on disk
    #[error("client config file is missing: {}", display_optional(.0.as_deref()))]
    ConfigFileMissing(Option<PathBuf>),

    /// Another provisioning run holds the session
    #[error("a provisioning operation is already in progress")]
    SessionBusy,

    /// A default template value could not be found in the database
    #[error("placeholder {placeholder} not found in database")]
    PlaceholderNotFound {
        /// Which placeholder is missing (host, digest or port)
        placeholder: &'static str,
    },

    /// A replacement value does not have the width of its placeholder
    #[error("{field} replacement is {actual} bytes, placeholder is {expected} bytes")]
    LengthMismatch {
        /// Which field (host or digest)
        field: &'static str,
        /// Placeholder width in bytes
        expected: usize,
        /// Replacement width in bytes
        actual: usize,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

fn display_optional(path: Option<&Path>) -> String {
    path.map_or_else(|| "(unset)".to_string(), |p| p.display().to_string())
}

impl IdentityError {
    /// Build a [`IdentityError::Read`] for `path`
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Build a [`IdentityError::Write`] for `path`
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress(_) | Self::InvalidCertificate(_) | Self::MalformedLiteral { .. } => {
                ErrorKind::Input
            }
            Self::Read { .. } | Self::Write { .. } | Self::TempDir(_) => ErrorKind::Io,
            Self::ExternalTool(_) => ErrorKind::ExternalTool,
            Self::Transport(_) | Self::HttpStatus { .. } => ErrorKind::Transport,
            Self::KeyGeneration(_) | Self::Encoding(_) => ErrorKind::Crypto,
            Self::NotInitialized | Self::ConfigFileMissing(_) | Self::SessionBusy => {
                ErrorKind::State
            }
            Self::PlaceholderNotFound { .. } | Self::LengthMismatch { .. } => {
                ErrorKind::Placeholder
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the error was caused by malformed caller input
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Input)
    }

    /// Returns true if the database did not match the expected template
    #[must_use]
    pub const fn is_foreign_template(&self) -> bool {
        matches!(self.kind(), ErrorKind::Placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            IdentityError::InvalidAddress("x".into()).kind(),
            ErrorKind::Input
        );
        assert_eq!(IdentityError::NotInitialized.kind(), ErrorKind::State);
        assert!(IdentityError::PlaceholderNotFound { placeholder: "host" }.is_foreign_template());
        assert!(!IdentityError::SessionBusy.is_input_error());
    }

    #[test]
    fn test_config_missing_message() {
        let unset = IdentityError::ConfigFileMissing(None);
        assert_eq!(unset.to_string(), "client config file is missing: (unset)");

        let missing = IdentityError::ConfigFileMissing(Some(PathBuf::from("/tmp/mumble.ini")));
        assert!(missing.to_string().ends_with("/tmp/mumble.ini"));
    }
}
