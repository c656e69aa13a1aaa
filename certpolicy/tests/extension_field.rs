use certpolicy::*;
use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_KEY_USAGE, ID_PE_AUTHORITY_INFO_ACCESS,
};

fn demo_ca() -> PolicyCertificate {
    PolicyCertificate::try_from(&include_bytes!("examples/DemoHealthDirectCA.der")[..]).unwrap()
}

fn al_anderson() -> PolicyCertificate {
    PolicyCertificate::try_from(
        &include_bytes!("examples/AlAnderson@hospitalA.direct.example.com.der")[..],
    )
    .unwrap()
}

fn hospital_a_ca() -> PolicyCertificate {
    PolicyCertificate::try_from(&include_bytes!("examples/HospitalADirectIssuingCA.der")[..])
        .unwrap()
}

fn strings(v: &[&str]) -> PolicyValue {
    PolicyValue::Strings(v.iter().map(|s| s.to_string()).collect())
}

#[test]
fn optional_aki_absent_yields_empty_value() {
    // certificate lacks both AIA and AKI
    let cert = demo_ca();
    let mut field = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, false);
    field.inject_reference_value(&cert).unwrap();
    assert_eq!(&PolicyValue::Empty, field.get_policy_value().unwrap());
}

#[test]
fn required_aki_absent_raises_violation() {
    let cert = demo_ca();
    let mut field = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, true);
    assert_eq!(
        Err(Error::PolicyRequiredViolation(
            ExtensionKind::AuthorityKeyIdentifierKeyId
        )),
        field.inject_reference_value(&cert)
    );
    assert_eq!(&FieldState::Violated, field.state());
    assert_eq!(
        Err(Error::InvalidUsage(ExtensionKind::AuthorityKeyIdentifierKeyId)),
        field.get_policy_value()
    );
}

#[test]
fn optional_aki_present_yields_key_identifier() {
    let cert = al_anderson();
    let mut field = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, false);
    field.inject_reference_value(&cert).unwrap();
    assert_eq!(
        &PolicyValue::String("3aa0074b77b2493efb447de5ce6cd055085de3f0".to_string()),
        field.get_policy_value().unwrap()
    );
}

#[test]
fn uninjected_required_field_is_invalid_usage() {
    let field = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, true);
    assert_eq!(
        Err(Error::InvalidUsage(ExtensionKind::AuthorityKeyIdentifierKeyId)),
        field.get_policy_value()
    );
}

#[test]
fn uninjected_fields_are_invalid_usage_for_every_kind() {
    for kind in ALL_EXTENSION_KINDS {
        for required in [true, false] {
            let field = ExtensionField::for_kind(kind, required);
            assert_eq!(&FieldState::Uninjected, field.state());
            assert_eq!(Err(Error::InvalidUsage(kind)), field.get_policy_value());
        }
    }
}

#[test]
fn absent_extensions_for_every_kind() {
    let empty = ExtensionMap::new("CN=No Extensions");
    for kind in ALL_EXTENSION_KINDS {
        let mut optional = ExtensionField::for_kind(kind, false);
        assert_eq!(Extraction::AbsentOptional, optional.inject(&empty));
        assert_eq!(&PolicyValue::Empty, optional.get_policy_value().unwrap());

        let mut required = ExtensionField::for_kind(kind, true);
        assert_eq!(
            Err(Error::PolicyRequiredViolation(kind)),
            required.inject_reference_value(&empty)
        );
        assert_eq!(Err(Error::InvalidUsage(kind)), required.get_policy_value());
    }
}

#[test]
fn reinjection_is_idempotent() {
    let cert = al_anderson();
    for kind in ALL_EXTENSION_KINDS {
        let mut field = ExtensionField::for_kind(kind, false);
        field.inject_reference_value(&cert).unwrap();
        let first = field.get_policy_value().unwrap().clone();
        field.inject_reference_value(&cert).unwrap();
        assert_eq!(&first, field.get_policy_value().unwrap());
    }
}

#[test]
fn reset_and_reinject_from_different_certificate() {
    let mut field = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, true);
    field.inject_reference_value(&al_anderson()).unwrap();
    field.reset();
    assert_eq!(&FieldState::Uninjected, field.state());
    assert!(field.inject_reference_value(&demo_ca()).is_err());
    field.inject_reference_value(&al_anderson()).unwrap();
    assert!(field.get_policy_value().is_ok());
}

#[test]
fn derived_values_for_leaf() {
    let cert = al_anderson();
    let derive = |kind: ExtensionKind| {
        let mut field = ExtensionField::for_kind(kind, true);
        field.inject_reference_value(&cert).unwrap();
        field.get_policy_value().unwrap().clone()
    };

    assert_eq!(
        PolicyValue::String("4139338ab49c28de315f5949e1b41fd9dc493db4".to_string()),
        derive(ExtensionKind::SubjectKeyIdentifier)
    );
    assert_eq!(
        strings(&[
            "http://ca.hospitala.direct.example.com/issuer.der",
            "http://ocsp.hospitala.direct.example.com"
        ]),
        derive(ExtensionKind::AuthorityInfoAccess)
    );
    assert_eq!(
        PolicyValue::Bool(false),
        derive(ExtensionKind::BasicConstraints)
    );
    assert_eq!(
        PolicyValue::Code(KU_DIGITAL_SIGNATURE | KU_KEY_ENCIPHERMENT),
        derive(ExtensionKind::KeyUsage)
    );
    assert_eq!(
        strings(&["1.3.6.1.5.5.7.3.4"]),
        derive(ExtensionKind::ExtendedKeyUsage)
    );
    assert_eq!(
        strings(&["1.3.6.1.4.1.41179.0.1.2", "1.3.6.1.4.1.41179.1.3"]),
        derive(ExtensionKind::CertificatePolicies)
    );
    assert_eq!(
        strings(&["rfc822Name:AlAnderson@hospitalA.direct.example.com"]),
        derive(ExtensionKind::SubjectAltName)
    );
    assert_eq!(
        strings(&["http://crl.hospitala.direct.example.com/issuer.crl"]),
        derive(ExtensionKind::CrlDistributionPoints)
    );
}

#[test]
fn derived_values_for_intermediate() {
    let cert = hospital_a_ca();
    let mut bc = ExtensionField::for_kind(ExtensionKind::BasicConstraints, true);
    bc.inject_reference_value(&cert).unwrap();
    assert_eq!(&PolicyValue::Bool(true), bc.get_policy_value().unwrap());

    let mut ku = ExtensionField::for_kind(ExtensionKind::KeyUsage, true);
    ku.inject_reference_value(&cert).unwrap();
    assert_eq!(
        &PolicyValue::Code(KU_KEY_CERT_SIGN | KU_CRL_SIGN),
        ku.get_policy_value().unwrap()
    );

    let mut aki = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, true);
    aki.inject_reference_value(&cert).unwrap();
    assert_eq!(
        &PolicyValue::String("88397961563741f5ed49bcb3a3ce07b5d8cd7549".to_string()),
        aki.get_policy_value().unwrap()
    );

    let mut san = ExtensionField::for_kind(ExtensionKind::SubjectAltName, false);
    assert_eq!(Extraction::AbsentOptional, san.inject(&cert));
}

#[test]
fn aki_falls_back_to_aia_when_enabled() {
    // copy the leaf's extensions, minus AKI
    let leaf = al_anderson();
    let mut cert = ExtensionMap::new(&leaf.subject_name());
    for oid in leaf.extension_oids() {
        if oid != ID_CE_AUTHORITY_KEY_IDENTIFIER {
            cert.insert(oid, leaf.extension_value(&oid).unwrap().to_vec());
        }
    }

    let mut plain = ExtensionField::for_kind(ExtensionKind::AuthorityKeyIdentifierKeyId, true);
    assert!(plain.inject_reference_value(&cert).is_err());

    let mut fallback = FieldRegistry::default()
        .create_field(
            ExtensionKind::AuthorityKeyIdentifierKeyId,
            true,
            FieldOptions { aia_fallback: true },
        )
        .unwrap();
    fallback.inject_reference_value(&cert).unwrap();
    assert_eq!(
        &PolicyValue::String("http://ca.hospitala.direct.example.com/issuer.der".to_string()),
        fallback.get_policy_value().unwrap()
    );

    // no AIA either, so the fallback has nothing to work with
    cert.remove(&ID_PE_AUTHORITY_INFO_ACCESS);
    assert_eq!(
        Err(Error::PolicyRequiredViolation(
            ExtensionKind::AuthorityKeyIdentifierKeyId
        )),
        fallback.inject_reference_value(&cert)
    );
}

#[test]
fn malformed_extension_leaves_field_violated() {
    let mut cert = ExtensionMap::new("CN=Malformed");
    // BIT STRING tag with a truncated length
    cert.insert(ID_CE_KEY_USAGE, vec![0x03, 0x05, 0x00]);

    let mut field = ExtensionField::for_kind(ExtensionKind::KeyUsage, false);
    assert_eq!(Extraction::Malformed, field.inject(&cert));
    assert_eq!(
        Err(Error::MalformedExtension(ExtensionKind::KeyUsage)),
        field.inject_reference_value(&cert)
    );
    assert_eq!(
        Err(Error::InvalidUsage(ExtensionKind::KeyUsage)),
        field.get_policy_value()
    );
}
