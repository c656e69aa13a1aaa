//! The cert_store module provides a manually populated in-memory store of trust anchors and
//! intermediate CA certificates that resolves issuers for chain walks.
//!
//! ```
//! use certpolicy::{CertificateStore, ChainPolicy, ChainWalker, PolicyEvaluator, PolicySettings};
//!
//! let mut store = CertificateStore::new();
//! // populate the store via add_trust_anchor, add_intermediate or add_dns_certificates
//!
//! let settings = PolicySettings::default();
//! let evaluator = PolicyEvaluator::from_settings(&settings);
//! let walker = ChainWalker::new(&evaluator, &settings);
//! # let _ = (&mut store, &walker, ChainPolicy::default());
//! ```

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::chain::chain_walker::IssuerResolver;
use crate::source::dns_record_store::{DnsRecordStore, DnsRecordType};
use crate::source::extension_source::ExtensionSource;
use crate::source::policy_certificate::PolicyCertificate;
use crate::util::error::Result;
use crate::util::logging::{log_message, PolicyLogLevels};

/// `CertificateStore` holds trust anchors and intermediate CA certificates indexed by hex subject
/// key identifier and by subject name.
#[derive(Clone, Debug, Default)]
pub struct CertificateStore {
    certs: Vec<PolicyCertificate>,
    anchors: BTreeSet<String>,
    fingerprints: BTreeSet<String>,
    skid_map: BTreeMap<String, Vec<usize>>,
    name_map: BTreeMap<String, Vec<usize>>,
}

impl CertificateStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// `add_trust_anchor` adds a trust anchor. Returns false if the certificate was already present
    /// as a trust anchor.
    pub fn add_trust_anchor(&mut self, cert: PolicyCertificate) -> bool {
        self.anchors.insert(String::from(cert.fingerprint()));
        self.index(cert)
    }

    /// `add_intermediate` adds an intermediate CA certificate. Returns false if the certificate was
    /// already present.
    pub fn add_intermediate(&mut self, cert: PolicyCertificate) -> bool {
        self.index(cert)
    }

    fn index(&mut self, cert: PolicyCertificate) -> bool {
        if !self.fingerprints.insert(String::from(cert.fingerprint())) {
            return false;
        }
        let i = self.certs.len();
        if let Some(skid) = cert.subject_key_identifier() {
            self.skid_map.entry(skid).or_default().push(i);
        }
        self.name_map
            .entry(cert.subject_name())
            .or_default()
            .push(i);
        self.certs.push(cert);
        true
    }

    /// `add_dns_certificates` adds the certificates published in CERT records for `domain_name` as
    /// intermediates and returns the number added. Records that do not carry a parseable
    /// certificate are logged and skipped.
    pub fn add_dns_certificates(
        &mut self,
        dns: &dyn DnsRecordStore,
        domain_name: &str,
    ) -> Result<usize> {
        let mut added = 0;
        for record in dns.query_domain(domain_name, DnsRecordType::Cert) {
            let data = match record.certificate_data() {
                Some(data) => data,
                None => {
                    log_message(
                        &PolicyLogLevels::PolicyWarn,
                        &format!(
                            "Ignoring CERT record {} for {} that does not carry an X.509 certificate",
                            record.record_id, domain_name
                        ),
                    );
                    continue;
                }
            };
            let locator = format!("dns:{}#{}", record.domain_name, record.record_id);
            match PolicyCertificate::parse_cert(data, &locator) {
                Ok(cert) => {
                    if self.add_intermediate(cert) {
                        added += 1;
                    }
                }
                Err(e) => {
                    log_message(
                        &PolicyLogLevels::PolicyWarn,
                        &format!("Failed to parse certificate from {}: {}", locator, e),
                    );
                }
            }
        }
        Ok(added)
    }

    /// Returns the number of certificates in the store
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Returns true if the store is empty
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Returns the certificates in the store
    pub fn certificates(&self) -> &[PolicyCertificate] {
        &self.certs
    }

    /// `get_certificates_for_skid` returns the certificates whose subject key identifier matches the
    /// given hex value.
    pub fn get_certificates_for_skid(&self, hex_skid: &str) -> Vec<&PolicyCertificate> {
        self.lookup(&self.skid_map, hex_skid)
    }

    /// `get_certificates_for_name` returns the certificates with the given subject name.
    pub fn get_certificates_for_name(&self, name: &str) -> Vec<&PolicyCertificate> {
        self.lookup(&self.name_map, name)
    }

    fn lookup(&self, map: &BTreeMap<String, Vec<usize>>, key: &str) -> Vec<&PolicyCertificate> {
        map.get(key)
            .map(|v| v.iter().filter_map(|i| self.certs.get(*i)).collect())
            .unwrap_or_default()
    }

    /// `log_certificates` logs the contents of the store at debug level
    pub fn log_certificates(&self) {
        for c in &self.certs {
            log_message(
                &PolicyLogLevels::PolicyDebug,
                &format!(
                    "{} - {} ({})",
                    if self.anchors.contains(c.fingerprint()) {
                        "Trust anchor"
                    } else {
                        "Intermediate"
                    },
                    c.subject_name(),
                    c.locator.as_deref().unwrap_or("")
                ),
            );
        }
    }
}

impl IssuerResolver<PolicyCertificate> for CertificateStore {
    fn is_trust_anchor(&self, cert: &PolicyCertificate) -> bool {
        self.anchors.contains(cert.fingerprint())
    }

    /// Candidates whose subject key identifier matches the authority key identifier are preferred;
    /// subject name matching is used when no key identifier match exists. Among candidates, those
    /// whose subject matches the certificate's issuer name come first.
    fn resolve_issuer(&self, cert: &PolicyCertificate) -> Option<&PolicyCertificate> {
        let issuer_name = cert.issuer_name();
        let not_self = |c: &&PolicyCertificate| c.fingerprint() != cert.fingerprint();

        if let Some(akid) = cert.authority_key_identifier() {
            let candidates: Vec<&PolicyCertificate> = self
                .get_certificates_for_skid(&akid)
                .into_iter()
                .filter(not_self)
                .collect();
            if let Some(c) = candidates
                .iter()
                .find(|c| c.subject_name() == issuer_name)
                .or_else(|| candidates.first())
            {
                return Some(*c);
            }
        }

        self.get_certificates_for_name(&issuer_name)
            .into_iter()
            .find(not_self)
    }
}
