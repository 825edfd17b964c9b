//! Core types and pure algorithms for onionvoice.
//!
//! Everything in this crate is deterministic and side-effect free:
//!
//! - **Addresses**: [`resolve`] splits `scheme://host:port` into an [`Address`]
//! - **Certificates**: [`decode_certificate`] and [`fingerprint`] turn a PEM
//!   response into the SHA-1 digest Mumble stores for a server
//! - **Encoding**: [`ByteArrayLiteral`] renders bytes in the `@ByteArray(...)`
//!   syntax of Qt ini files
//! - **Errors**: [`IdentityError`] covers every failure across the workspace
//!
//! # Example
//!
//! ```rust,ignore
//! use onionvoice_core::{resolve, ByteArrayLiteral};
//!
//! let addr = resolve("mumble://example.onion:64738")?;
//! assert_eq!(addr.port(), "64738");
//!
//! let literal = ByteArrayLiteral::encode(&[0xab, b'1']);
//! assert_eq!(literal.as_str(), r"@ByteArray(\xab\x31)");
//! ```

#![doc(html_root_url = "https://docs.rs/onionvoice-core/0.1.0")]

mod address;
mod certificate;
pub mod encoding;
mod error;

pub use address::{resolve, Address};
pub use certificate::{
    decode_certificate, fingerprint, fingerprint_der, Certificate, Fingerprint, CERTIFICATE_TAG,
};
pub use encoding::ByteArrayLiteral;
pub use error::{ErrorKind, IdentityError, Result};
