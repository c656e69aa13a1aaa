//! The message_extractor module locates PEM-encoded certificates within message bodies, i.e., the
//! text of a referral message that includes the sender's certificate and that of its issuer.
//!
//! Blocks are decoded leniently: line width, indentation and `>` quoting introduced by mail clients
//! are ignored. Encapsulated headers within a block are not supported.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use base64ct::{Base64, Encoding};

use crate::source::policy_certificate::PolicyCertificate;
use crate::util::error::{Error, Result};
use crate::util::logging::{log_message, PolicyLogLevels};

const PEM_BEGIN: &[u8] = b"-----BEGIN CERTIFICATE-----";
const PEM_END: &[u8] = b"-----END CERTIFICATE-----";

/// CertificateReader walks a message body, yielding one decode attempt per encapsulated
/// certificate block, in order of appearance.
struct CertificateReader<'a> {
    body: &'a [u8],
    position: usize,
}

impl<'a> CertificateReader<'a> {
    fn new(body: &'a [u8]) -> Self {
        CertificateReader { body, position: 0 }
    }

    fn next_block(&mut self) -> Option<&'a [u8]> {
        let start = find(self.body, PEM_BEGIN, self.position)?;
        match find(self.body, PEM_END, start + PEM_BEGIN.len()) {
            Some(end) => {
                let stop = end + PEM_END.len();
                self.position = stop;
                self.body.get(start..stop)
            }
            None => {
                // unterminated block, nothing further can be read
                self.position = self.body.len();
                None
            }
        }
    }
}

impl<'a> Iterator for CertificateReader<'a> {
    type Item = Result<PolicyCertificate>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.next_block()?;
        Some(decode_block(block))
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn decode_block(block: &[u8]) -> Result<PolicyCertificate> {
    let inner = block
        .get(PEM_BEGIN.len()..block.len().saturating_sub(PEM_END.len()))
        .ok_or(Error::ParseError)?;
    // mail bodies rewrap, indent and quote lines, so only the base64 alphabet is kept
    let encoded: String = core::str::from_utf8(inner)
        .map_err(|_| Error::ParseError)?
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != '>')
        .collect();
    let der = Base64::decode_vec(&encoded).map_err(|e| {
        log_message(
            &PolicyLogLevels::PolicyDebug,
            &format!("Failed to decode certificate block: {}", e),
        );
        Error::ParseError
    })?;
    PolicyCertificate::try_from(der.as_slice()).map_err(Error::Asn1Error)
}

/// `extract_certificates` returns the certificates found in PEM `CERTIFICATE` blocks within a message
/// body, in order of appearance. Blocks that cannot be decoded are logged and skipped. Each returned
/// certificate's locator records its position among the blocks, i.e., `message:0`.
pub fn extract_certificates(body: &[u8]) -> Vec<PolicyCertificate> {
    let mut certs = Vec::new();
    for (i, r) in CertificateReader::new(body).enumerate() {
        match r {
            Ok(mut cert) => {
                cert.locator = Some(format!("message:{}", i));
                certs.push(cert);
            }
            Err(e) => log_message(
                &PolicyLogLevels::PolicyWarn,
                &format!("Ignoring certificate block {} in message: {}", i, e),
            ),
        }
    }
    certs
}

#[test]
fn find_test() {
    assert_eq!(Some(2), find(b"abcdcd", b"cd", 0));
    assert_eq!(Some(4), find(b"abcdcd", b"cd", 3));
    assert_eq!(None, find(b"abcdcd", b"cd", 5));
    assert_eq!(None, find(b"abc", b"cd", 10));
}

#[test]
fn unterminated_block_test() {
    let body = b"Hello\r\n-----BEGIN CERTIFICATE-----\r\nMIIB\r\n";
    assert!(extract_certificates(body).is_empty());
    let mut reader = CertificateReader::new(body);
    assert!(reader.next().is_none());
    assert!(reader.next().is_none());
}
