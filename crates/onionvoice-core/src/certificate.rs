//! PEM certificate decoding and SHA-1 fingerprinting.
//!
//! Mumble identifies a server certificate by the SHA-1 digest of its DER
//! encoding. The fetched certificate is trusted once fetched, so nothing
//! here validates the chain or even parses the X.509 structure.

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use serde::Serialize;
use std::fmt;

use crate::error::{IdentityError, Result};

/// PEM block tag a certificate must carry.
pub const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// A DER-encoded certificate decoded from a PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    block_type: String,
}

impl Certificate {
    /// DER bytes of the certificate
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM block type, always [`CERTIFICATE_TAG`]
    #[must_use]
    pub fn block_type(&self) -> &str {
        &self.block_type
    }
}

/// Lowercase hex SHA-1 digest of a certificate's DER encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest algorithm name
    pub const ALGORITHM: &'static str = "sha1";

    /// Length of the hex digest in characters
    pub const HEX_LEN: usize = 40;

    /// The 40-character hex digest
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode the first PEM block in `input` as a certificate.
///
/// Leading text before the block is ignored.
pub fn decode_certificate(input: &[u8]) -> Result<Certificate> {
    let block = pem::parse(input).map_err(|e| IdentityError::InvalidCertificate(e.to_string()))?;

    if block.tag() != CERTIFICATE_TAG {
        return Err(IdentityError::InvalidCertificate(format!(
            "expected a {CERTIFICATE_TAG} block, found {}",
            block.tag()
        )));
    }

    Ok(Certificate {
        block_type: block.tag().to_string(),
        der: block.contents().to_vec(),
    })
}

/// Compute the SHA-1 fingerprint of a certificate.
#[must_use]
pub fn fingerprint(certificate: &Certificate) -> Fingerprint {
    fingerprint_der(certificate.der())
}

/// Compute the SHA-1 fingerprint of raw DER bytes.
#[must_use]
pub fn fingerprint_der(der: &[u8]) -> Fingerprint {
    let digest = digest(&SHA1_FOR_LEGACY_USE_ONLY, der);
    Fingerprint(hex::encode(digest.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pem_block(tag: &str, contents: &[u8]) -> String {
        pem::encode(&pem::Pem::new(tag, contents.to_vec()))
    }

    #[test]
    fn test_decode_and_fingerprint() {
        let input = pem_block("CERTIFICATE", b"hello world");
        let cert = decode_certificate(input.as_bytes()).unwrap();
        assert_eq!(cert.der(), b"hello world");
        assert_eq!(cert.block_type(), "CERTIFICATE");

        let fp = fingerprint(&cert);
        assert_eq!(fp.as_str(), "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(fp.as_str().len(), Fingerprint::HEX_LEN);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let der: Vec<u8> = (0..=255).collect();
        let a = fingerprint_der(&der);
        let b = fingerprint_der(&der.clone());
        assert_eq!(a, b);
        assert_ne!(a, fingerprint_der(&der[1..]));
        assert!(a
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_fingerprint_empty_der() {
        assert_eq!(
            fingerprint_der(&[]).as_str(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_leading_text_is_skipped() {
        let input = format!("server says hi\n{}", pem_block("CERTIFICATE", b"abc"));
        let cert = decode_certificate(input.as_bytes()).unwrap();
        assert_eq!(cert.der(), b"abc");
    }

    #[test]
    fn test_rejects_wrong_block_type() {
        let input = pem_block("RSA PRIVATE KEY", b"secret");
        assert!(matches!(
            decode_certificate(input.as_bytes()),
            Err(IdentityError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_rejects_non_pem() {
        assert!(matches!(
            decode_certificate(b"<html>502 Bad Gateway</html>"),
            Err(IdentityError::InvalidCertificate(_))
        ));
        assert!(decode_certificate(b"").is_err());
    }
}
