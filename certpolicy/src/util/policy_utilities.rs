//! Utility functions used when deriving and comparing policy values

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str;

use sha2::{Digest, Sha256};
use subtle_encoding::hex;
use x509_cert::ext::pkix::name::GeneralName;

/// `buffer_to_hex` takes a byte array and returns a string featuring lower case ASCII hex characters
/// (without commas, spaces, brackets, etc.).
///
/// ```
/// use certpolicy::buffer_to_hex;
/// let buf :[u8; 3] = [1,0xab,3];
/// let bufhex = buffer_to_hex(&buf);
/// assert_eq!(bufhex, "01ab03");
/// ```
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    let hex = hex::encode(buffer);
    let r = str::from_utf8(hex.as_slice());
    if let Ok(s) = r {
        s.to_string()
    } else {
        "".to_string()
    }
}

/// `normalize_hex` lowercases a hex string and removes the separators commonly used when key
/// identifiers are copied from certificate viewers (colons, spaces and hyphens).
///
/// ```
/// use certpolicy::normalize_hex;
/// assert_eq!(normalize_hex("3A:A0:07 4B-77"), "3aa0074b77");
/// ```
pub fn normalize_hex(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ':' | ' ' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `is_hex_key_identifier` returns true if the value consists only of hex digits, optionally
/// separated by `:`, ` ` or `-`, i.e., it can be compared in [`normalize_hex`] form.
///
/// ```
/// use certpolicy::is_hex_key_identifier;
/// assert!(is_hex_key_identifier("3A:A0:07 4B-77"));
/// assert!(!is_hex_key_identifier("http://ca-a.example/x"));
/// ```
pub fn is_hex_key_identifier(value: &str) -> bool {
    let digits = normalize_hex(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// `sha256_hex` returns the lower case hex representation of the SHA256 digest of the given buffer.
/// It is used to fingerprint certificates held by a certificate store.
pub fn sha256_hex(buffer: &[u8]) -> String {
    let digest = Sha256::digest(buffer).to_vec();
    buffer_to_hex(digest.as_slice())
}

/// `general_name_to_string` renders a GeneralName as `type:value`, i.e., `rfc822Name:a@b.example`
/// or `uniformResourceIdentifier:http://ca.example/ca.der`. Values without a natural textual form
/// are rendered as hex.
pub fn general_name_to_string(gn: &GeneralName) -> String {
    match gn {
        GeneralName::OtherName(on) => format!("otherName:{}", on.type_id),
        GeneralName::Rfc822Name(rfc822) => format!("rfc822Name:{}", rfc822),
        GeneralName::DnsName(dns) => format!("dNSName:{}", dns),
        GeneralName::DirectoryName(dn) => format!("directoryName:{}", dn),
        GeneralName::EdiPartyName(_) => "ediPartyName:".to_string(),
        GeneralName::UniformResourceIdentifier(uri) => {
            format!("uniformResourceIdentifier:{}", uri)
        }
        GeneralName::IpAddress(ip) => format!("iPAddress:{}", buffer_to_hex(ip.as_bytes())),
        GeneralName::RegisteredId(oid) => format!("registeredID:{}", oid),
    }
}

/// `uri_from_general_name` returns the URI carried by a GeneralName when it is a
/// uniformResourceIdentifier and None otherwise.
pub fn uri_from_general_name(gn: &GeneralName) -> Option<String> {
    match gn {
        GeneralName::UniformResourceIdentifier(uri) => Some(uri.to_string()),
        _ => None,
    }
}

/// `lowercase_all` returns a copy of the given strings with ASCII characters lowercased.
pub fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_ascii_lowercase()).collect()
}

#[test]
fn general_name_to_string_test() {
    use der::asn1::Ia5String;

    let gn = GeneralName::Rfc822Name(Ia5String::new("AlAnderson@hospitalA.direct.example.com").unwrap());
    assert_eq!(
        "rfc822Name:AlAnderson@hospitalA.direct.example.com",
        general_name_to_string(&gn)
    );
    assert_eq!(None, uri_from_general_name(&gn));

    let gn = GeneralName::UniformResourceIdentifier(
        Ia5String::new("http://crl.example-direct-trust.org/root.crl").unwrap(),
    );
    assert_eq!(
        Some("http://crl.example-direct-trust.org/root.crl".to_string()),
        uri_from_general_name(&gn)
    );
}

#[test]
fn sha256_hex_test() {
    assert_eq!(
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        sha256_hex(&[])
    );
}
