//! Self-signed client certificate generation.
//!
//! Mumble authenticates users by client certificate. We mint a throwaway
//! RSA identity per provisioning run, export it as PKCS#12 and hand the
//! container to the client through its ini file.

use rand::rngs::OsRng;
use rcgen::{
    CertificateParams, CustomExtension, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose, SerialNumber, PKCS_RSA_SHA256,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use std::path::Path;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use onionvoice_core::{ByteArrayLiteral, IdentityError, Result};

use crate::fs::write_private;
use crate::pkcs12::Pkcs12Exporter;

/// Subject common name of every generated client certificate.
pub const CERTIFICATE_COMMON_NAME: &str = "onionvoice Autogenerated Certificate";

/// RSA modulus size.
pub const KEY_BITS: usize = 2048;

/// How far `notBefore` is backdated to absorb clock skew.
pub const BACKDATE: Duration = Duration::seconds(300);

/// Validity period.
pub const VALIDITY: Duration = Duration::days(365);

/// Fixed subject key identifier.
pub const SUBJECT_KEY_ID: [u8; 4] = [1, 2, 3, 4];

/// id-ce-subjectKeyIdentifier
const SUBJECT_KEY_ID_OID: &[u64] = &[2, 5, 29, 14];

/// [`SUBJECT_KEY_ID`] as a DER OCTET STRING, the extension's value.
const SUBJECT_KEY_ID_DER: [u8; 6] = [0x04, 0x04, 1, 2, 3, 4];

/// Prefix of the scratch directory holding key material.
const SCRATCH_PREFIX: &str = "onionvoice_cert_generation";

/// A freshly minted certificate and its private key, both PEM encoded
pub struct SelfSignedIdentity {
    /// `CERTIFICATE` block
    pub certificate_pem: String,
    /// `RSA PRIVATE KEY` (PKCS#1) block
    pub private_key_pem: String,
}

impl std::fmt::Debug for SelfSignedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfSignedIdentity")
            .field("certificate_pem", &self.certificate_pem)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Generate an RSA key pair and a self-signed certificate for it.
pub fn build_self_signed() -> Result<SelfSignedIdentity> {
    let private_key = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
        .map_err(|e| IdentityError::KeyGeneration(e.to_string()))?;

    let pkcs8 = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| IdentityError::Encoding(e.to_string()))?;
    let key_pair = KeyPair::from_pem_and_sign_algo(&pkcs8, &PKCS_RSA_SHA256)
        .map_err(|e| IdentityError::KeyGeneration(e.to_string()))?;

    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, CERTIFICATE_COMMON_NAME);
    params.distinguished_name = dn;

    params.serial_number = Some(SerialNumber::from_slice(&[0]));

    let now = OffsetDateTime::now_utc();
    params.not_before = now - BACKDATE;
    params.not_after = now + VALIDITY;

    // rcgen only emits the extensions block (and with it key usage) once
    // basic constraints are set, and only derives a key identifier for CAs.
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::KeyEncipherment,
        KeyUsagePurpose::DigitalSignature,
    ];
    params
        .custom_extensions
        .push(CustomExtension::from_oid_content(
            SUBJECT_KEY_ID_OID,
            SUBJECT_KEY_ID_DER.to_vec(),
        ));

    let certificate = params
        .self_signed(&key_pair)
        .map_err(|e| IdentityError::Encoding(e.to_string()))?;

    let private_key_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| IdentityError::Encoding(e.to_string()))?;

    Ok(SelfSignedIdentity {
        certificate_pem: certificate.pem(),
        private_key_pem: private_key_pem.to_string(),
    })
}

/// Generate a self-signed identity and write it to `cert_path` and `key_path`.
///
/// Both files are created owner read/write only.
pub fn generate_self_signed(cert_path: &Path, key_path: &Path) -> Result<()> {
    let identity = build_self_signed()?;

    write_private(cert_path, identity.certificate_pem.as_bytes())?;
    write_private(key_path, identity.private_key_pem.as_bytes())?;

    debug!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "wrote self-signed client identity"
    );
    Ok(())
}

/// Mint a client identity and return it as a `@ByteArray(...)` PKCS#12 literal.
///
/// Key material only ever lives in a private scratch directory, which is
/// removed when this returns, whether it succeeds or not.
pub fn generate_client_literal<E: Pkcs12Exporter + ?Sized>(
    exporter: &E,
) -> Result<ByteArrayLiteral> {
    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()
        .map_err(IdentityError::TempDir)?;

    let cert_path = scratch.path().join("cert.pem");
    let key_path = scratch.path().join("key.pem");
    let out_path = scratch.path().join("transformed.p12");

    generate_self_signed(&cert_path, &key_path)?;
    let container = exporter.export(&key_path, &cert_path, &out_path)?;

    debug!(bytes = container.len(), "exported PKCS#12 container");
    Ok(ByteArrayLiteral::encode(&container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mode_of;
    use crate::pkcs12::testing::{FakeExporter, FAKE_CONTAINER};
    use tempfile::TempDir;
    use x509_parser::prelude::*;

    #[test]
    fn test_generated_certificate_fields() {
        let dir = TempDir::new().unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");

        generate_self_signed(&cert_path, &key_path).unwrap();

        let cert_pem = std::fs::read(&cert_path).unwrap();
        let block = ::pem::parse(&cert_pem).unwrap();
        assert_eq!(block.tag(), "CERTIFICATE");

        let key_pem = std::fs::read(&key_path).unwrap();
        assert_eq!(::pem::parse(&key_pem).unwrap().tag(), "RSA PRIVATE KEY");

        let (_, cert) = X509Certificate::from_der(block.contents()).unwrap();
        assert_eq!(cert.tbs_certificate.serial.to_string(), "0");

        let cn = cert.subject().iter_common_name().next().unwrap();
        assert_eq!(cn.as_str().unwrap(), CERTIFICATE_COMMON_NAME);

        let key_usage = cert.key_usage().unwrap().unwrap();
        assert!(key_usage.value.digital_signature());
        assert!(key_usage.value.key_encipherment());
        assert!(!key_usage.value.key_cert_sign());

        let constraints = cert.basic_constraints().unwrap().unwrap();
        assert!(!constraints.value.ca);

        let skis: Vec<&[u8]> = cert
            .extensions()
            .iter()
            .filter_map(|ext| match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(id) => Some(id.0),
                _ => None,
            })
            .collect();
        assert_eq!(skis, [&SUBJECT_KEY_ID[..]]);

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let not_before = cert.validity().not_before.timestamp();
        let not_after = cert.validity().not_after.timestamp();
        assert!(not_before <= now - 290 && not_before >= now - 400);
        let year = VALIDITY.whole_seconds();
        assert!((not_after - now - year).abs() < 120);
    }

    #[cfg(unix)]
    #[test]
    fn test_pem_files_are_private() {
        let dir = TempDir::new().unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");

        generate_self_signed(&cert_path, &key_path).unwrap();
        assert_eq!(mode_of(&cert_path), 0o600);
        assert_eq!(mode_of(&key_path), 0o600);
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = generate_self_signed(&missing.join("cert.pem"), &missing.join("key.pem"))
            .unwrap_err();
        assert!(matches!(err, IdentityError::Write { .. }));
    }

    #[test]
    fn test_client_literal_and_scratch_cleanup() {
        let exporter = FakeExporter::default();
        let literal = generate_client_literal(&exporter).unwrap();
        assert_eq!(literal.decode().unwrap(), FAKE_CONTAINER);

        let calls = exporter.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (key, cert, out) = &calls[0];
        assert!(key.ends_with("key.pem"));
        assert!(cert.ends_with("cert.pem"));
        assert!(out.ends_with("transformed.p12"));
        let scratch = key.parent().unwrap();
        assert!(!scratch.exists(), "scratch directory survived");
    }

    #[test]
    fn test_scratch_removed_when_export_fails() {
        let exporter = FakeExporter {
            fail: true,
            ..FakeExporter::default()
        };
        let err = generate_client_literal(&exporter).unwrap_err();
        assert!(matches!(err, IdentityError::ExternalTool(_)));

        let calls = exporter.calls.lock().unwrap();
        let scratch = calls[0].0.parent().unwrap();
        assert!(!scratch.exists());
    }
}
