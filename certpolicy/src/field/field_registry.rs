//! The field_registry module maps each [`ExtensionKind`] to the constructor for its field variant

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use crate::field::extension_field::{ExtensionField, FieldOptions};
use crate::field::extension_kind::{ExtensionKind, ALL_EXTENSION_KINDS};
use crate::field::extractors::*;
use crate::policy::policy_node::FieldSpec;
use crate::util::error::{Error, Result};
use crate::util::logging::{log_message, PolicyLogLevels};

/// `FieldConstructor` creates a fresh, uninjected field variant given the required flag and options.
pub type FieldConstructor = fn(bool, FieldOptions) -> ExtensionField;

/// `FieldRegistry` maps extension kinds to field constructors. The default registry is populated
/// with every kind in [`ALL_EXTENSION_KINDS`].
#[derive(Clone)]
pub struct FieldRegistry {
    constructors: BTreeMap<ExtensionKind, FieldConstructor>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        let mut registry = FieldRegistry::empty();
        for kind in ALL_EXTENSION_KINDS {
            registry.register(kind, constructor_for(kind));
        }
        registry
    }
}

impl FieldRegistry {
    /// Creates a registry with no constructors. Fields for unregistered kinds cannot be created,
    /// which lets a deployment restrict the kinds its policies may use.
    pub fn empty() -> Self {
        FieldRegistry {
            constructors: BTreeMap::new(),
        }
    }

    /// Adds or replaces the constructor for a kind
    pub fn register(&mut self, kind: ExtensionKind, constructor: FieldConstructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Returns the kinds for which constructors are registered
    pub fn kinds(&self) -> Vec<ExtensionKind> {
        self.constructors.keys().copied().collect()
    }

    /// `create_field` returns a fresh field for the given kind or [`Error::Misconfiguration`] if no
    /// constructor is registered for the kind.
    pub fn create_field(
        &self,
        kind: ExtensionKind,
        required: bool,
        options: FieldOptions,
    ) -> Result<ExtensionField> {
        match self.constructors.get(&kind) {
            Some(constructor) => Ok(constructor(required, options)),
            None => {
                log_message(
                    &PolicyLogLevels::PolicyError,
                    &format!("No field constructor is registered for {}", kind),
                );
                Err(Error::Misconfiguration)
            }
        }
    }

    /// `create` returns a fresh field configured per a policy leaf's [`FieldSpec`].
    pub fn create(&self, spec: &FieldSpec) -> Result<ExtensionField> {
        self.create_field(spec.kind, spec.required, spec.options)
    }
}

/// `constructor_for` returns the constructor for the field variant of the given kind.
pub fn constructor_for(kind: ExtensionKind) -> FieldConstructor {
    match kind {
        ExtensionKind::AuthorityKeyIdentifierKeyId => authority_key_identifier_field,
        ExtensionKind::SubjectKeyIdentifier => subject_key_identifier_field,
        ExtensionKind::AuthorityInfoAccess => authority_info_access_field,
        ExtensionKind::BasicConstraints => basic_constraints_field,
        ExtensionKind::KeyUsage => key_usage_field,
        ExtensionKind::ExtendedKeyUsage => extended_key_usage_field,
        ExtensionKind::CertificatePolicies => certificate_policies_field,
        ExtensionKind::SubjectAltName => subject_alt_name_field,
        ExtensionKind::CrlDistributionPoints => crl_distribution_points_field,
    }
}

impl ExtensionField {
    /// `for_kind` creates a fresh field for the given kind with default options.
    pub fn for_kind(kind: ExtensionKind, required: bool) -> ExtensionField {
        constructor_for(kind)(required, FieldOptions::default())
    }
}

/// Creates an authority key identifier (keyIdentifier) field
pub fn authority_key_identifier_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::AuthorityKeyIdentifierKeyId,
        required,
        options,
        extract_authority_key_identifier,
    )
}

/// Creates a subject key identifier field
pub fn subject_key_identifier_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::SubjectKeyIdentifier,
        required,
        options,
        extract_subject_key_identifier,
    )
}

/// Creates an authority information access field
pub fn authority_info_access_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::AuthorityInfoAccess,
        required,
        options,
        extract_authority_info_access,
    )
}

/// Creates a basic constraints field
pub fn basic_constraints_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::BasicConstraints,
        required,
        options,
        extract_basic_constraints,
    )
}

/// Creates a key usage field
pub fn key_usage_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(ExtensionKind::KeyUsage, required, options, extract_key_usage)
}

/// Creates an extended key usage field
pub fn extended_key_usage_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::ExtendedKeyUsage,
        required,
        options,
        extract_extended_key_usage,
    )
}

/// Creates a certificate policies field
pub fn certificate_policies_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::CertificatePolicies,
        required,
        options,
        extract_certificate_policies,
    )
}

/// Creates a subject alternative name field
pub fn subject_alt_name_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::SubjectAltName,
        required,
        options,
        extract_subject_alt_name,
    )
}

/// Creates a CRL distribution points field
pub fn crl_distribution_points_field(required: bool, options: FieldOptions) -> ExtensionField {
    ExtensionField::new(
        ExtensionKind::CrlDistributionPoints,
        required,
        options,
        extract_crl_distribution_points,
    )
}

#[test]
fn registry_test() {
    let registry = FieldRegistry::default();
    assert_eq!(ALL_EXTENSION_KINDS.to_vec(), registry.kinds());
    for kind in ALL_EXTENSION_KINDS {
        let field = registry
            .create_field(kind, true, FieldOptions::default())
            .unwrap();
        assert_eq!(kind, field.kind());
        assert!(field.is_required());
    }

    let mut restricted = FieldRegistry::empty();
    restricted.register(ExtensionKind::KeyUsage, key_usage_field);
    assert!(restricted
        .create_field(ExtensionKind::KeyUsage, false, FieldOptions::default())
        .is_ok());
    assert_eq!(
        Err(Error::Misconfiguration),
        restricted
            .create_field(ExtensionKind::SubjectAltName, false, FieldOptions::default())
            .map(|f| f.kind())
    );
}
