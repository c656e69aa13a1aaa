//! The extension_source module defines how certificates are presented to the policy engine

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use const_oid::db::rfc5912::{ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_SUBJECT_KEY_IDENTIFIER};
use der::asn1::ObjectIdentifier;
use der::Decode;
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, SubjectKeyIdentifier};

use crate::util::policy_utilities::buffer_to_hex;

/// `ExtensionSource` is implemented by certificates (or certificate stand-ins) presented to the
/// policy engine. The engine never parses whole certificates; it asks for the raw DER-encoded value
/// of individual extensions by OID.
pub trait ExtensionSource {
    /// `extension_value` returns the DER-encoded extnValue for the extension identified by `oid`, if
    /// the certificate contains that extension.
    fn extension_value(&self, oid: &ObjectIdentifier) -> Option<&[u8]>;

    /// `subject_name` returns a string representation of the subject for use in diagnostics.
    fn subject_name(&self) -> String;

    /// `issuer_name` returns a string representation of the issuer, used for issuer resolution when
    /// key identifiers are not available.
    fn issuer_name(&self) -> String;

    /// `subject_key_identifier` returns the lower case hex subject key identifier, if present and
    /// decodable.
    fn subject_key_identifier(&self) -> Option<String> {
        let enc = self.extension_value(&ID_CE_SUBJECT_KEY_IDENTIFIER)?;
        let skid = SubjectKeyIdentifier::from_der(enc).ok()?;
        Some(buffer_to_hex(skid.0.as_bytes()))
    }

    /// `authority_key_identifier` returns the lower case hex keyIdentifier from the authority key
    /// identifier extension, if present and decodable.
    fn authority_key_identifier(&self) -> Option<String> {
        let enc = self.extension_value(&ID_CE_AUTHORITY_KEY_IDENTIFIER)?;
        let akid = AuthorityKeyIdentifier::from_der(enc).ok()?;
        akid.key_identifier.map(|kid| buffer_to_hex(kid.as_bytes()))
    }
}

/// `ExtensionMap` is a plain map from extension OID to DER-encoded extension value. It serves
/// callers that parse certificates elsewhere and tests that need certificates with precisely
/// controlled extension content.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtensionMap {
    /// Subject name used in diagnostics
    pub subject: String,
    /// Issuer name used for issuer resolution
    pub issuer: String,
    /// Map of extension OID to DER-encoded extension value
    pub extensions: BTreeMap<ObjectIdentifier, Vec<u8>>,
}

impl ExtensionMap {
    /// Creates a new [`ExtensionMap`] with no extensions for a self-issued subject
    pub fn new(subject: &str) -> Self {
        ExtensionMap {
            subject: subject.to_string(),
            issuer: subject.to_string(),
            extensions: BTreeMap::new(),
        }
    }

    /// Sets the issuer name
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    /// Adds or replaces the value for an extension
    pub fn insert(&mut self, oid: ObjectIdentifier, value: Vec<u8>) {
        self.extensions.insert(oid, value);
    }

    /// Removes an extension, returning the value if it was present
    pub fn remove(&mut self, oid: &ObjectIdentifier) -> Option<Vec<u8>> {
        self.extensions.remove(oid)
    }
}

impl ExtensionSource for ExtensionMap {
    fn extension_value(&self, oid: &ObjectIdentifier) -> Option<&[u8]> {
        self.extensions.get(oid).map(|v| v.as_slice())
    }

    fn subject_name(&self) -> String {
        self.subject.clone()
    }

    fn issuer_name(&self) -> String {
        self.issuer.clone()
    }
}

#[test]
fn extension_map_test() {
    use alloc::vec;
    use hex_literal::hex;

    let mut em = ExtensionMap::new("CN=Leaf").with_issuer("CN=Issuer");
    assert_eq!(None, em.subject_key_identifier());
    assert_eq!(None, em.authority_key_identifier());

    em.insert(ID_CE_SUBJECT_KEY_IDENTIFIER, hex!("0404DEADBEEF").to_vec());
    em.insert(ID_CE_AUTHORITY_KEY_IDENTIFIER, hex!("300680040A0B0C0D").to_vec());
    assert_eq!(Some("deadbeef".to_string()), em.subject_key_identifier());
    assert_eq!(Some("0a0b0c0d".to_string()), em.authority_key_identifier());
    assert_eq!("CN=Issuer", em.issuer_name());

    // undecodable values read as absent for issuer resolution purposes
    em.insert(ID_CE_SUBJECT_KEY_IDENTIFIER, vec![0x05]);
    assert_eq!(None, em.subject_key_identifier());
    assert!(em.remove(&ID_CE_SUBJECT_KEY_IDENTIFIER).is_some());
}
