//! Derivation rules that turn the raw value of an extension into a [`PolicyValue`]
//!
//! Every function in this module has the [`ExtractReferenceValue`](crate::ExtractReferenceValue)
//! signature. `Ok(None)` indicates the extension is absent, `Ok(Some(_))` carries the derived value
//! and [`Error::MalformedExtension`] indicates the extension is present but could not be decoded.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use const_oid::db::rfc5912::{ID_AD_CA_ISSUERS, ID_PE_AUTHORITY_INFO_ACCESS};
use der::Decode;
use x509_cert::ext::pkix::name::DistributionPointName;
use x509_cert::ext::pkix::{
    AuthorityInfoAccessSyntax, AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies,
    CrlDistributionPoints, ExtendedKeyUsage, KeyUsage, SubjectAltName, SubjectKeyIdentifier,
};

use crate::field::extension_field::FieldOptions;
use crate::field::extension_kind::ExtensionKind;
use crate::field::policy_value::PolicyValue;
use crate::source::extension_source::ExtensionSource;
use crate::util::error::{Error, Result};
use crate::util::logging::{log_message, PolicyLogLevels};
use crate::util::policy_utilities::{buffer_to_hex, general_name_to_string, uri_from_general_name};

/// decode_extension decodes an extension value, mapping any decoding failure to a
/// MalformedExtension error for the given kind.
fn decode_extension<'a, T: Decode<'a>>(kind: ExtensionKind, enc: &'a [u8]) -> Result<T> {
    T::from_der(enc).map_err(|e| {
        log_message(
            &PolicyLogLevels::PolicyError,
            &format!("Failed to decode {} extension: {}", kind, e),
        );
        Error::MalformedExtension(kind)
    })
}

/// ca_issuers_uris returns the caIssuers URIs from the authority information access extension, or
/// None if the extension is absent.
fn ca_issuers_uris(cert: &dyn ExtensionSource) -> Result<Option<Vec<String>>> {
    let enc = match cert.extension_value(&ID_PE_AUTHORITY_INFO_ACCESS) {
        Some(enc) => enc,
        None => return Ok(None),
    };
    let aia: AuthorityInfoAccessSyntax =
        decode_extension(ExtensionKind::AuthorityInfoAccess, enc)?;
    Ok(Some(
        aia.0
            .iter()
            .filter(|ad| ad.access_method == ID_AD_CA_ISSUERS)
            .filter_map(|ad| uri_from_general_name(&ad.access_location))
            .collect(),
    ))
}

/// `extract_authority_key_identifier` derives the lower case hex keyIdentifier from the authority
/// key identifier extension. When the extension is absent (or lacks a keyIdentifier) and
/// [`FieldOptions::aia_fallback`] is set, the first caIssuers URI from the authority information
/// access extension is used instead, as it identifies the same issuer.
pub fn extract_authority_key_identifier(
    options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::AuthorityKeyIdentifierKeyId;
    if let Some(enc) = cert.extension_value(&kind.oid()) {
        let akid: AuthorityKeyIdentifier = decode_extension(kind, enc)?;
        if let Some(kid) = akid.key_identifier {
            return Ok(Some(PolicyValue::String(buffer_to_hex(kid.as_bytes()))));
        }
    }

    if options.aia_fallback {
        if let Some(uris) = ca_issuers_uris(cert)? {
            if let Some(uri) = uris.into_iter().next() {
                log_message(
                    &PolicyLogLevels::PolicyDebug,
                    &format!(
                        "Using caIssuers location {} in lieu of authority key identifier for {}",
                        uri,
                        cert.subject_name()
                    ),
                );
                return Ok(Some(PolicyValue::String(uri)));
            }
        }
    }
    Ok(None)
}

/// `extract_subject_key_identifier` derives the lower case hex subject key identifier.
pub fn extract_subject_key_identifier(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::SubjectKeyIdentifier;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let skid: SubjectKeyIdentifier = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::String(buffer_to_hex(skid.0.as_bytes()))))
        }
        None => Ok(None),
    }
}

/// `extract_authority_info_access` derives the list of access location URIs (caIssuers and OCSP).
pub fn extract_authority_info_access(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::AuthorityInfoAccess;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let aia: AuthorityInfoAccessSyntax = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Strings(
                aia.0
                    .iter()
                    .filter_map(|ad| uri_from_general_name(&ad.access_location))
                    .collect(),
            )))
        }
        None => Ok(None),
    }
}

/// `extract_basic_constraints` derives the cA flag.
pub fn extract_basic_constraints(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::BasicConstraints;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let bc: BasicConstraints = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Bool(bc.ca)))
        }
        None => Ok(None),
    }
}

/// `extract_key_usage` derives the key usage bits. Bit 0 is digitalSignature (see
/// [`KU_DIGITAL_SIGNATURE`](crate::KU_DIGITAL_SIGNATURE) and friends).
pub fn extract_key_usage(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::KeyUsage;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let ku: KeyUsage = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Code(u32::from(ku.0.bits()))))
        }
        None => Ok(None),
    }
}

/// `extract_extended_key_usage` derives the list of key purpose OIDs in dotted decimal form.
pub fn extract_extended_key_usage(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::ExtendedKeyUsage;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let eku: ExtendedKeyUsage = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Strings(
                eku.0.iter().map(|oid| oid.to_string()).collect(),
            )))
        }
        None => Ok(None),
    }
}

/// `extract_certificate_policies` derives the list of policy OIDs in dotted decimal form.
pub fn extract_certificate_policies(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::CertificatePolicies;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let cp: CertificatePolicies = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Strings(
                cp.0.iter()
                    .map(|pi| pi.policy_identifier.to_string())
                    .collect(),
            )))
        }
        None => Ok(None),
    }
}

/// `extract_subject_alt_name` derives the list of subject alternative names rendered as
/// `type:value` strings (see [`general_name_to_string`]).
pub fn extract_subject_alt_name(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::SubjectAltName;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let san: SubjectAltName = decode_extension(kind, enc)?;
            Ok(Some(PolicyValue::Strings(
                san.0.iter().map(general_name_to_string).collect(),
            )))
        }
        None => Ok(None),
    }
}

/// `extract_crl_distribution_points` derives the list of URIs from the fullName form of each
/// distribution point. Relative names and non-URI general names are skipped.
pub fn extract_crl_distribution_points(
    _options: &FieldOptions,
    cert: &dyn ExtensionSource,
) -> Result<Option<PolicyValue>> {
    let kind = ExtensionKind::CrlDistributionPoints;
    match cert.extension_value(&kind.oid()) {
        Some(enc) => {
            let crldp: CrlDistributionPoints = decode_extension(kind, enc)?;
            let mut uris = Vec::new();
            for dp in crldp.0.iter() {
                if let Some(DistributionPointName::FullName(gns)) = &dp.distribution_point {
                    uris.extend(gns.iter().filter_map(uri_from_general_name));
                }
            }
            Ok(Some(PolicyValue::Strings(uris)))
        }
        None => Ok(None),
    }
}
