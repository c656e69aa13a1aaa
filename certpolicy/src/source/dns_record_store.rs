//! The dns_record_store module provides CRUD access to DNS records, including CERT records that
//! publish certificates for a domain. Certificates published this way can seed a
//! [`CertificateStore`](crate::CertificateStore) used for issuer resolution.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::util::error::{Error, Result};
use crate::util::logging::{log_message, PolicyLogLevels};

/// CERT record certificate type for X.509 as PKIX (RFC 4398)
const CERT_TYPE_PKIX: [u8; 2] = [0, 1];

/// Length of the CERT record header: type (2), key tag (2) and algorithm (1)
const CERT_HEADER_LEN: usize = 5;

/// `DnsRecordType` enumerates the record types a store may hold.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum DnsRecordType {
    /// IPv4 address
    A,
    /// Name server
    Ns,
    /// Canonical name
    Cname,
    /// Start of authority
    Soa,
    /// Mail exchanger
    Mx,
    /// Text
    Txt,
    /// IPv6 address
    Aaaa,
    /// Service locator
    Srv,
    /// Certificate (RFC 4398)
    Cert,
}

impl DnsRecordType {
    /// `type_code` returns the numeric RR type code.
    pub fn type_code(&self) -> u16 {
        match self {
            DnsRecordType::A => 1,
            DnsRecordType::Ns => 2,
            DnsRecordType::Cname => 5,
            DnsRecordType::Soa => 6,
            DnsRecordType::Mx => 15,
            DnsRecordType::Txt => 16,
            DnsRecordType::Aaaa => 28,
            DnsRecordType::Srv => 33,
            DnsRecordType::Cert => 37,
        }
    }
}

/// `DnsRecord` is a single record held by a [`DnsRecordStore`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Store-assigned identifier. Ignored by [`DnsRecordStore::add`].
    pub record_id: i64,
    /// Owner name of the record
    pub domain_name: String,
    /// Record type
    pub record_type: DnsRecordType,
    /// Time to live in seconds
    pub ttl: u32,
    /// Record data. For CERT records this is either the full RDATA or a bare DER certificate.
    pub record_data: Vec<u8>,
    /// Free-form notes
    pub notes: String,
}

impl DnsRecord {
    /// Creates a record with no identifier, a TTL of one hour and no notes
    pub fn new(domain_name: &str, record_type: DnsRecordType, record_data: Vec<u8>) -> Self {
        DnsRecord {
            record_id: 0,
            domain_name: String::from(domain_name),
            record_type,
            ttl: 3600,
            record_data,
            notes: String::new(),
        }
    }

    /// `certificate_data` returns the DER certificate carried by a CERT record. Record data that
    /// begins with a SEQUENCE tag is taken as a bare certificate; otherwise a PKIX-typed RFC 4398
    /// header is expected and skipped.
    pub fn certificate_data(&self) -> Option<&[u8]> {
        if self.record_type != DnsRecordType::Cert {
            return None;
        }
        match self.record_data.first() {
            Some(0x30) => Some(self.record_data.as_slice()),
            Some(_) if self.record_data.get(0..2) == Some(&CERT_TYPE_PKIX[..]) => {
                self.record_data.get(CERT_HEADER_LEN..)
            }
            _ => None,
        }
    }

    /// `matches_domain` compares domain names case insensitively, ignoring a trailing dot.
    pub fn matches_domain(&self, domain_name: &str) -> bool {
        self.domain_name
            .trim_end_matches('.')
            .eq_ignore_ascii_case(domain_name.trim_end_matches('.'))
    }
}

/// `DnsRecordStore` provides CRUD operations over DNS records keyed by record identifier.
pub trait DnsRecordStore {
    /// `add` stores a new record, assigns its identifier and returns the stored record.
    fn add(&mut self, record: DnsRecord) -> Result<DnsRecord>;

    /// `update` replaces the record with the same identifier. Returns [`Error::NotFound`] if there
    /// is no such record.
    fn update(&mut self, record: &DnsRecord) -> Result<()>;

    /// `delete` removes the record with the same identifier. Returns [`Error::NotFound`] if there
    /// is no such record.
    fn delete(&mut self, record: &DnsRecord) -> Result<()>;

    /// `get` returns the record with the given identifier.
    fn get(&self, record_id: i64) -> Result<DnsRecord>;

    /// `query` returns every record in the store.
    fn query(&self) -> Vec<DnsRecord>;

    /// `query_domain` returns the records of the given type for a domain.
    fn query_domain(&self, domain_name: &str, record_type: DnsRecordType) -> Vec<DnsRecord> {
        self.query()
            .into_iter()
            .filter(|r| r.record_type == record_type && r.matches_domain(domain_name))
            .collect()
    }
}

/// `MemoryDnsRecordStore` is an in-memory [`DnsRecordStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryDnsRecordStore {
    records: BTreeMap<i64, DnsRecord>,
    next_id: i64,
}

impl MemoryDnsRecordStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DnsRecordStore for MemoryDnsRecordStore {
    fn add(&mut self, mut record: DnsRecord) -> Result<DnsRecord> {
        if record.domain_name.is_empty() {
            log_message(
                &PolicyLogLevels::PolicyError,
                "Refusing to add DNS record with empty domain name",
            );
            return Err(Error::Misconfiguration);
        }
        self.next_id += 1;
        record.record_id = self.next_id;
        self.records.insert(record.record_id, record.clone());
        Ok(record)
    }

    fn update(&mut self, record: &DnsRecord) -> Result<()> {
        match self.records.get_mut(&record.record_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => {
                log_message(
                    &PolicyLogLevels::PolicyDebug,
                    &format!("No DNS record with identifier {} to update", record.record_id),
                );
                Err(Error::NotFound)
            }
        }
    }

    fn delete(&mut self, record: &DnsRecord) -> Result<()> {
        match self.records.remove(&record.record_id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound),
        }
    }

    fn get(&self, record_id: i64) -> Result<DnsRecord> {
        self.records.get(&record_id).cloned().ok_or(Error::NotFound)
    }

    fn query(&self) -> Vec<DnsRecord> {
        self.records.values().cloned().collect()
    }
}
