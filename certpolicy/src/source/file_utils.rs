//! The file_utils module contains utility functions related to interactions with the filesystem.

use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{error, info};
use walkdir::WalkDir;

use crate::chain::chain_policy::ChainPolicy;
use crate::policy::policy_node::PolicyNode;
use crate::source::cert_store::CertificateStore;
use crate::source::policy_certificate::PolicyCertificate;
use crate::util::error::{Error, Result};

/// File extensions processed when loading certificates from a folder
pub const CERTIFICATE_FILE_EXTENSIONS: [&str; 4] = ["der", "crt", "cer", "pem"];

/// `get_file_as_byte_vec` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::StdIoError].
pub fn get_file_as_byte_vec(filename: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(filename)?;
    let mut buffer = Vec::new();
    f.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// `get_file_as_byte_vec_pem` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::StdIoError]. If the file is PEM encoded, it is decoded
/// prior to returning the vector of bytes. To read without PEM, use `get_file_as_byte_vec`.
pub fn get_file_as_byte_vec_pem(filename: &Path) -> Result<Vec<u8>> {
    let b = get_file_as_byte_vec(filename)?;
    if b.first() == Some(&0x2D) {
        return match pem_rfc7468::decode_vec(b.as_slice()) {
            Ok((_label, der)) => Ok(der),
            Err(e) => {
                error!("Failed to parse certificate from {:?}: {:?}", filename, e);
                Err(Error::ParseError)
            }
        };
    }
    Ok(b)
}

/// `load_certificate_file` reads a binary DER or PEM-encoded certificate from a file.
pub fn load_certificate_file(filename: &Path) -> Result<PolicyCertificate> {
    let buffer = get_file_as_byte_vec_pem(filename)?;
    PolicyCertificate::parse_cert(&buffer, filename.to_str().unwrap_or(""))
}

/// `cert_folder_to_vec` recursively traverses a folder and returns the certificates that could be
/// parsed from files with one of the [`CERTIFICATE_FILE_EXTENSIONS`]. Files that fail to parse are
/// logged and skipped.
pub fn cert_folder_to_vec(certs_dir: &str) -> Result<Vec<PolicyCertificate>> {
    if !Path::is_dir(Path::new(certs_dir)) {
        error!("{} does not exist or is not a directory", certs_dir);
        return Err(Error::NotFound);
    }

    let mut certs = vec![];
    for entry in WalkDir::new(certs_dir) {
        let e = match entry {
            Ok(e) => e,
            Err(_) => {
                error!("Failed to unwrap entry in cert_folder_to_vec");
                continue;
            }
        };
        if e.file_type().is_dir() {
            continue;
        }
        let path = e.path();
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if CERTIFICATE_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {}
            _ => continue,
        }
        match load_certificate_file(path) {
            Ok(cert) => certs.push(cert),
            Err(err) => error!("Ignored {}: {}", path.display(), err),
        }
    }
    Ok(certs)
}

/// `populate_certificate_store` loads trust anchors from `ta_folder` and, optionally, intermediate
/// CA certificates from `ca_folder` into a new [`CertificateStore`].
pub fn populate_certificate_store(
    ta_folder: &str,
    ca_folder: Option<&str>,
) -> Result<CertificateStore> {
    let mut store = CertificateStore::new();
    let mut ta_count = 0;
    for ta in cert_folder_to_vec(ta_folder)? {
        if store.add_trust_anchor(ta) {
            ta_count += 1;
        }
    }
    info!("Loaded {} trust anchors from {}", ta_count, ta_folder);

    if let Some(ca_folder) = ca_folder {
        let mut ca_count = 0;
        for ca in cert_folder_to_vec(ca_folder)? {
            if store.add_intermediate(ca) {
                ca_count += 1;
            }
        }
        info!("Loaded {} CA certificates from {}", ca_count, ca_folder);
    }
    Ok(store)
}

/// `read_policy` reads a JSON-encoded [`PolicyNode`] from a file.
///
/// ```json
/// {"All": [
///     {"FieldLeaf": {"kind": "AuthorityKeyIdentifierKeyId", "required": true}},
///     {"FieldLeaf": {"kind": "KeyUsage", "expected": {"Code": 1}, "comparison": "Contains"}}
/// ]}
/// ```
pub fn read_policy(filename: &Path) -> Result<PolicyNode> {
    let json = get_file_as_byte_vec(filename)?;
    serde_json::from_slice(&json).map_err(|e| {
        error!("Failed to parse policy from {}: {}", filename.display(), e);
        Error::ParseError
    })
}

/// `read_chain_policy` reads a JSON-encoded [`ChainPolicy`] from a file. Unknown members are
/// rejected, as is a chain policy that sets no position, since walking with it would evaluate
/// nothing.
///
/// ```json
/// {"leaf": {"policy": {"FieldLeaf": {"kind": "SubjectAltName", "required": true}}},
///  "intermediate": {"policy": {"FieldLeaf": {"kind": "BasicConstraints", "expected": {"Bool": true}}},
///                   "advisory": true}}
/// ```
pub fn read_chain_policy(filename: &Path) -> Result<ChainPolicy> {
    let json = get_file_as_byte_vec(filename)?;
    let chain_policy: ChainPolicy = serde_json::from_slice(&json).map_err(|e| {
        error!("Failed to parse chain policy from {}: {}", filename.display(), e);
        Error::ParseError
    })?;
    if chain_policy.is_empty() {
        error!("Chain policy in {} does not set a policy for any position", filename.display());
        return Err(Error::ParseError);
    }
    Ok(chain_policy)
}

#[test]
fn non_existent_dir() {
    let r = cert_folder_to_vec("tests/examples/nonexistent");
    assert_eq!(Some(Error::NotFound), r.err());
}

#[test]
fn non_existent_file() {
    let r = get_file_as_byte_vec(Path::new("tests/examples/nonexistent.der"));
    assert_eq!(
        Some(Error::StdIoError(std::io::ErrorKind::NotFound)),
        r.err()
    );
}
