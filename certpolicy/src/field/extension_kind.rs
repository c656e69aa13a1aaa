//! The closed set of certificate extension kinds that policy fields can be defined over

use core::fmt;

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_CRL_DISTRIBUTION_POINTS, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER, ID_PE_AUTHORITY_INFO_ACCESS,
};
use der::asn1::ObjectIdentifier;
use serde::{Deserialize, Serialize};

use crate::field::policy_value::{Comparison, PolicyValue};
use crate::util::policy_utilities::{is_hex_key_identifier, lowercase_all, normalize_hex};

/// `ExtensionKind` identifies the certificate extension a policy field is defined over. Each kind
/// has its own derivation rule (see [`extractors`](crate::field::extractors)) and its own
/// normalization rule for comparisons.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ExtensionKind {
    /// keyIdentifier component of the authority key identifier extension
    AuthorityKeyIdentifierKeyId,
    /// subject key identifier extension
    SubjectKeyIdentifier,
    /// access locations from the authority information access extension
    AuthorityInfoAccess,
    /// cA flag from the basic constraints extension
    BasicConstraints,
    /// key usage bits
    KeyUsage,
    /// extended key usage purposes
    ExtendedKeyUsage,
    /// certificate policy identifiers
    CertificatePolicies,
    /// subject alternative names
    SubjectAltName,
    /// CRL distribution point URIs
    CrlDistributionPoints,
}

/// Every extension kind, in declaration order.
pub const ALL_EXTENSION_KINDS: [ExtensionKind; 9] = [
    ExtensionKind::AuthorityKeyIdentifierKeyId,
    ExtensionKind::SubjectKeyIdentifier,
    ExtensionKind::AuthorityInfoAccess,
    ExtensionKind::BasicConstraints,
    ExtensionKind::KeyUsage,
    ExtensionKind::ExtendedKeyUsage,
    ExtensionKind::CertificatePolicies,
    ExtensionKind::SubjectAltName,
    ExtensionKind::CrlDistributionPoints,
];

impl ExtensionKind {
    /// `oid` returns the object identifier of the extension this kind reads.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            ExtensionKind::AuthorityKeyIdentifierKeyId => ID_CE_AUTHORITY_KEY_IDENTIFIER,
            ExtensionKind::SubjectKeyIdentifier => ID_CE_SUBJECT_KEY_IDENTIFIER,
            ExtensionKind::AuthorityInfoAccess => ID_PE_AUTHORITY_INFO_ACCESS,
            ExtensionKind::BasicConstraints => ID_CE_BASIC_CONSTRAINTS,
            ExtensionKind::KeyUsage => ID_CE_KEY_USAGE,
            ExtensionKind::ExtendedKeyUsage => ID_CE_EXT_KEY_USAGE,
            ExtensionKind::CertificatePolicies => ID_CE_CERTIFICATE_POLICIES,
            ExtensionKind::SubjectAltName => ID_CE_SUBJECT_ALT_NAME,
            ExtensionKind::CrlDistributionPoints => ID_CE_CRL_DISTRIBUTION_POINTS,
        }
    }

    /// `from_oid` maps an extension OID to the corresponding kind, if one is supported.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<ExtensionKind> {
        ALL_EXTENSION_KINDS.iter().find(|k| k.oid() == *oid).copied()
    }

    /// `normalize` returns the canonical form of a value for comparison purposes. Key identifiers
    /// are compared as lower case hex without separators. Subject alternative names and access
    /// location URIs are compared case insensitively, as is the caIssuers URI an authority key
    /// identifier field derives when falling back to the authority information access extension.
    /// Other kinds compare as-is.
    pub fn normalize(&self, value: &PolicyValue) -> PolicyValue {
        match (self, value) {
            (
                ExtensionKind::AuthorityKeyIdentifierKeyId | ExtensionKind::SubjectKeyIdentifier,
                PolicyValue::String(s),
            ) if is_hex_key_identifier(s) => PolicyValue::String(normalize_hex(s)),
            (
                ExtensionKind::AuthorityKeyIdentifierKeyId | ExtensionKind::SubjectKeyIdentifier,
                PolicyValue::String(s),
            ) => PolicyValue::String(s.to_ascii_lowercase()),
            (
                ExtensionKind::SubjectAltName
                | ExtensionKind::AuthorityInfoAccess
                | ExtensionKind::CrlDistributionPoints,
                PolicyValue::Strings(v),
            ) => PolicyValue::Strings(lowercase_all(v)),
            (
                ExtensionKind::SubjectAltName
                | ExtensionKind::AuthorityInfoAccess
                | ExtensionKind::CrlDistributionPoints,
                PolicyValue::String(s),
            ) => PolicyValue::String(s.to_ascii_lowercase()),
            _ => value.clone(),
        }
    }

    /// `matches` compares a derived value against an expected value using this kind's
    /// normalization rule and the given comparison operator.
    pub fn matches(
        &self,
        derived: &PolicyValue,
        expected: &PolicyValue,
        comparison: Comparison,
    ) -> bool {
        self.normalize(derived)
            .satisfies(&self.normalize(expected), comparison)
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKind::AuthorityKeyIdentifierKeyId => write!(f, "AuthorityKeyIdentifierKeyId"),
            ExtensionKind::SubjectKeyIdentifier => write!(f, "SubjectKeyIdentifier"),
            ExtensionKind::AuthorityInfoAccess => write!(f, "AuthorityInfoAccess"),
            ExtensionKind::BasicConstraints => write!(f, "BasicConstraints"),
            ExtensionKind::KeyUsage => write!(f, "KeyUsage"),
            ExtensionKind::ExtendedKeyUsage => write!(f, "ExtendedKeyUsage"),
            ExtensionKind::CertificatePolicies => write!(f, "CertificatePolicies"),
            ExtensionKind::SubjectAltName => write!(f, "SubjectAltName"),
            ExtensionKind::CrlDistributionPoints => write!(f, "CrlDistributionPoints"),
        }
    }
}

#[test]
fn oid_round_trip_test() {
    for kind in ALL_EXTENSION_KINDS {
        assert_eq!(Some(kind), ExtensionKind::from_oid(&kind.oid()));
    }
    assert_eq!(
        None,
        ExtensionKind::from_oid(&const_oid::db::rfc5912::ID_CE_NAME_CONSTRAINTS)
    );
}

#[test]
fn key_identifier_normalization_test() {
    use alloc::string::ToString;

    let derived = PolicyValue::String("3aa0074b77b2493efb447de5ce6cd055085de3f0".to_string());
    let expected = PolicyValue::String(
        "3A:A0:07:4B:77:B2:49:3E:FB:44:7D:E5:CE:6C:D0:55:08:5D:E3:F0".to_string(),
    );
    assert!(ExtensionKind::AuthorityKeyIdentifierKeyId.matches(
        &derived,
        &expected,
        Comparison::Equals
    ));
    // only key identifiers are separator insensitive
    assert!(!ExtensionKind::CertificatePolicies.matches(
        &derived,
        &expected,
        Comparison::Equals
    ));
}

#[test]
fn fallback_uri_normalization_test() {
    use alloc::string::ToString;

    let aki = ExtensionKind::AuthorityKeyIdentifierKeyId;
    let derived = PolicyValue::String("http://ca-a.example/x".to_string());
    assert!(!aki.matches(
        &derived,
        &PolicyValue::String("http://caa.example/x".to_string()),
        Comparison::Equals
    ));
    assert!(aki.matches(
        &derived,
        &PolicyValue::String("HTTP://CA-A.example/x".to_string()),
        Comparison::Equals
    ));
    assert_eq!(
        PolicyValue::String("http://ca-a.example/x".to_string()),
        aki.normalize(&derived)
    );
}
