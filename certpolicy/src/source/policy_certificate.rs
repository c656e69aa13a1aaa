//! Wrapper around a decoded certificate that presents its extensions to the policy engine

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use der::{asn1::ObjectIdentifier, Decode, Encode};
use x509_cert::Certificate;

use crate::source::extension_source::ExtensionSource;
use crate::util::error::{Error, Result};
use crate::util::policy_utilities::sha256_hex;

/// [`PolicyCertificate`] is used to aggregate a binary, DER-encoded Certificate, a parsed Certificate,
/// an optional locator (i.e., a file name) and a map of extension OIDs to raw extension values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Optional locator for troubleshooting purposes, i.e., a file name or message identifier
    pub locator: Option<String>,
    extensions: BTreeMap<ObjectIdentifier, Vec<u8>>,
    fingerprint: String,
}

impl TryFrom<&[u8]> for PolicyCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        Ok(PolicyCertificate::assemble(enc_cert.to_vec(), cert))
    }
}

impl TryFrom<Certificate> for PolicyCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        Ok(PolicyCertificate::assemble(enc_cert, cert))
    }
}

impl PolicyCertificate {
    fn assemble(encoded_cert: Vec<u8>, decoded_cert: Certificate) -> Self {
        let mut extensions = BTreeMap::new();
        if let Some(exts) = decoded_cert.tbs_certificate.extensions.as_ref() {
            for ext in exts {
                // first occurrence wins when an extension is (improperly) repeated
                extensions
                    .entry(ext.extn_id)
                    .or_insert_with(|| ext.extn_value.as_bytes().to_vec());
            }
        }
        let fingerprint = sha256_hex(&encoded_cert);
        PolicyCertificate {
            encoded_cert,
            decoded_cert,
            locator: None,
            extensions,
            fingerprint,
        }
    }

    /// `parse_cert` parses a binary DER-encoded certificate and records the given locator.
    pub fn parse_cert(buffer: &[u8], locator: &str) -> Result<PolicyCertificate> {
        let mut cert = PolicyCertificate::try_from(buffer).map_err(Error::Asn1Error)?;
        cert.locator = Some(locator.to_string());
        Ok(cert)
    }

    /// `fingerprint` returns the lower case hex SHA256 digest of the encoded certificate.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// `is_self_issued` returns true if the subject and issuer names are the same.
    pub fn is_self_issued(&self) -> bool {
        self.decoded_cert.tbs_certificate.subject == self.decoded_cert.tbs_certificate.issuer
    }

    /// `extension_oids` returns the OIDs of all extensions in the certificate.
    pub fn extension_oids(&self) -> Vec<ObjectIdentifier> {
        self.extensions.keys().copied().collect()
    }
}

impl ExtensionSource for PolicyCertificate {
    fn extension_value(&self, oid: &ObjectIdentifier) -> Option<&[u8]> {
        self.extensions.get(oid).map(|v| v.as_slice())
    }

    fn subject_name(&self) -> String {
        self.decoded_cert.tbs_certificate.subject.to_string()
    }

    fn issuer_name(&self) -> String {
        self.decoded_cert.tbs_certificate.issuer.to_string()
    }
}
