use certpolicy::*;

fn load(buffer: &[u8]) -> PolicyCertificate {
    PolicyCertificate::try_from(buffer).unwrap()
}

fn root() -> PolicyCertificate {
    load(include_bytes!("examples/ExampleDirectTrustRootCA.der"))
}

fn hospital_a_ca() -> PolicyCertificate {
    load(include_bytes!("examples/HospitalADirectIssuingCA.der"))
}

fn al_anderson() -> PolicyCertificate {
    load(include_bytes!(
        "examples/AlAnderson@hospitalA.direct.example.com.der"
    ))
}

fn bob() -> PolicyCertificate {
    load(include_bytes!("examples/bob@unknown.direct.example.net.der"))
}

fn store() -> CertificateStore {
    let mut store = CertificateStore::new();
    assert!(store.add_trust_anchor(root()));
    assert!(store.add_intermediate(hospital_a_ca()));
    store
}

fn is_ca(ca: bool) -> PolicyNode {
    PolicyNode::field(
        FieldSpec::required(ExtensionKind::BasicConstraints).expecting(PolicyValue::Bool(ca)),
    )
}

fn direct_chain_policy() -> ChainPolicy {
    ChainPolicy::default()
        .with_leaf(LevelPolicy::enforced(PolicyNode::all(vec![
            is_ca(false),
            PolicyNode::field(FieldSpec::required(ExtensionKind::SubjectAltName)),
        ])))
        .with_intermediate(LevelPolicy::enforced(PolicyNode::all(vec![
            is_ca(true),
            PolicyNode::field(
                FieldSpec::required(ExtensionKind::KeyUsage)
                    .expecting(PolicyValue::Code(KU_KEY_CERT_SIGN))
                    .with_comparison(Comparison::Contains),
            ),
        ])))
        .with_anchor(LevelPolicy::enforced(is_ca(true)))
}

#[test]
fn complete_chain_passes() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::from_settings(&settings);
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();
    let leaf = al_anderson();

    let verdict = walker.walk(&leaf, &store, &direct_chain_policy()).unwrap();
    assert!(verdict.pass);
    assert!(verdict.complete);
    assert_eq!(None, verdict.incomplete);
    assert_eq!(3, verdict.levels.len());

    let positions: Vec<ChainPosition> = verdict.levels.iter().map(|l| l.position).collect();
    assert_eq!(
        vec![
            ChainPosition::Leaf,
            ChainPosition::Intermediate,
            ChainPosition::Anchor
        ],
        positions
    );
    assert_eq!(leaf.subject_name(), verdict.levels[0].subject);
    assert_eq!(hospital_a_ca().subject_name(), verdict.levels[1].subject);
    assert_eq!(root().subject_name(), verdict.levels[2].subject);
    assert!(verdict.levels.iter().all(|l| l.verdict.is_some()));
}

#[test]
fn enforced_level_failure_fails_chain() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    // intermediates carry no subject alternative name; bare leaf violations are absorbed per level
    let policy = direct_chain_policy().with_intermediate(LevelPolicy::enforced(PolicyNode::field(
        FieldSpec::required(ExtensionKind::SubjectAltName),
    )));
    let verdict = walker.walk(&al_anderson(), &store, &policy).unwrap();
    assert!(!verdict.pass);
    assert!(verdict.complete);
    assert_eq!(3, verdict.levels.len());
    assert_eq!(1, verdict.enforced_failures().len());
    assert_eq!(1, verdict.enforced_failures()[0].depth);
    assert_eq!(
        Extraction::AbsentRequiredViolation,
        verdict.levels[1].verdict.as_ref().unwrap().field_outcomes[ROOT_PATH].extraction
    );
}

#[test]
fn advisory_level_failure_is_reported_but_not_enforced() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    let policy = direct_chain_policy().with_intermediate(LevelPolicy::advisory(
        PolicyNode::field(FieldSpec::required(ExtensionKind::SubjectAltName)),
    ));
    let verdict = walker.walk(&al_anderson(), &store, &policy).unwrap();
    assert!(verdict.pass);
    assert_eq!(1, verdict.advisory_failures().len());
    assert!(verdict.enforced_failures().is_empty());
}

#[test]
fn unresolvable_issuer_reports_incomplete_chain() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();
    let target = bob();

    let verdict = walker.walk(&target, &store, &direct_chain_policy()).unwrap();
    assert!(!verdict.complete);
    // partial chains are acceptable by default
    assert!(verdict.pass);
    assert_eq!(1, verdict.levels.len());
    let incomplete = verdict.incomplete.clone().unwrap();
    assert_eq!(target.subject_name(), incomplete.last_resolved);
    assert_eq!(0, incomplete.depth);
    assert_eq!(IncompleteReason::IssuerNotFound, incomplete.reason);
}

#[test]
fn incomplete_chain_fails_when_complete_chain_required() {
    let mut settings = PolicySettings::default();
    settings.set_require_complete_chain(true);
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    let verdict = walker.walk(&bob(), &store, &direct_chain_policy()).unwrap();
    assert!(!verdict.pass);
    assert!(verdict.enforced_failures().is_empty());

    let verdict = walker
        .walk(&al_anderson(), &store, &direct_chain_policy())
        .unwrap();
    assert!(verdict.pass);
}

#[test]
fn max_chain_length_stops_walk() {
    let mut settings = PolicySettings::default();
    settings.set_max_chain_length(2);
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    let verdict = walker
        .walk(&al_anderson(), &store, &direct_chain_policy())
        .unwrap();
    assert!(!verdict.complete);
    assert_eq!(2, verdict.levels.len());
    let incomplete = verdict.incomplete.clone().unwrap();
    assert_eq!(IncompleteReason::MaxLengthExceeded, incomplete.reason);
    assert_eq!(1, incomplete.depth);
    assert_eq!(hospital_a_ca().subject_name(), incomplete.last_resolved);
}

#[test]
fn trust_anchor_evaluation_can_be_disabled() {
    let mut settings = PolicySettings::default();
    settings.set_evaluate_trust_anchor(false);
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    // an anchor policy the root would fail
    let policy = direct_chain_policy().with_anchor(LevelPolicy::enforced(is_ca(false)));
    let verdict = walker.walk(&al_anderson(), &store, &policy).unwrap();
    assert!(verdict.pass);
    assert_eq!(ChainPosition::Anchor, verdict.levels[2].position);
    assert!(verdict.levels[2].verdict.is_none());

    settings.set_evaluate_trust_anchor(true);
    let walker = ChainWalker::new(&evaluator, &settings);
    assert!(!walker.walk(&al_anderson(), &store, &policy).unwrap().pass);
}

#[test]
fn trust_anchor_as_target() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();
    let anchor = root();

    let verdict = walker
        .walk(&anchor, &store, &ChainPolicy::leaf_only(is_ca(true)))
        .unwrap();
    assert!(verdict.pass);
    assert!(verdict.complete);
    assert_eq!(1, verdict.levels.len());
    assert_eq!(ChainPosition::Leaf, verdict.levels[0].position);
}

#[test]
fn positions_without_policy_are_visited_but_not_evaluated() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let store = store();

    let verdict = walker
        .walk(&al_anderson(), &store, &ChainPolicy::leaf_only(is_ca(false)))
        .unwrap();
    assert!(verdict.pass);
    assert_eq!(3, verdict.levels.len());
    assert!(verdict.levels[0].verdict.is_some());
    assert!(verdict.levels[1].verdict.is_none());
    assert!(verdict.levels[2].verdict.is_none());
}

#[test]
fn walk_caller_assembled_path() {
    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let path = vec![al_anderson(), hospital_a_ca(), root()];

    let verdict = walker
        .walk_path(&path, true, &direct_chain_policy())
        .unwrap();
    assert!(verdict.pass);
    assert!(verdict.complete);
    assert_eq!(3, verdict.levels.len());

    let verdict = walker
        .walk_path(&path, false, &direct_chain_policy())
        .unwrap();
    assert!(!verdict.complete);
    assert_eq!(3, verdict.levels.len());
    assert_eq!(2, verdict.incomplete.as_ref().unwrap().depth);

    let empty: Vec<PolicyCertificate> = vec![];
    assert_eq!(
        Some(Error::NotFound),
        walker
            .walk_path(&empty, true, &direct_chain_policy())
            .err()
    );
}

#[test]
fn issuers_resolved_from_dns_cert_records() {
    let mut dns = MemoryDnsRecordStore::new();
    dns.add(DnsRecord::new(
        "hospitala.direct.example.com",
        DnsRecordType::Cert,
        include_bytes!("examples/HospitalADirectIssuingCA.der").to_vec(),
    ))
    .unwrap();
    // PKIX-typed RFC 4398 RDATA wrapping a certificate that is not well formed
    dns.add(DnsRecord::new(
        "hospitala.direct.example.com",
        DnsRecordType::Cert,
        vec![0, 1, 0, 0, 0, 0x30, 0x03, 0x02, 0x01, 0x00],
    ))
    .unwrap();
    dns.add(DnsRecord::new(
        "hospitala.direct.example.com",
        DnsRecordType::Txt,
        b"v=spf1 -all".to_vec(),
    ))
    .unwrap();

    let mut store = CertificateStore::new();
    store.add_trust_anchor(root());
    assert_eq!(
        1,
        store
            .add_dns_certificates(&dns, "HospitalA.direct.example.com")
            .unwrap()
    );
    assert_eq!(2, store.len());
    // already present
    assert_eq!(
        0,
        store
            .add_dns_certificates(&dns, "hospitala.direct.example.com")
            .unwrap()
    );

    let settings = PolicySettings::default();
    let evaluator = PolicyEvaluator::default();
    let walker = ChainWalker::new(&evaluator, &settings);
    let verdict = walker
        .walk(&al_anderson(), &store, &direct_chain_policy())
        .unwrap();
    assert!(verdict.pass);
    assert!(verdict.complete);
}

#[test]
fn store_lookups() {
    let store = store();
    assert_eq!(2, store.len());
    assert_eq!(
        1,
        store
            .get_certificates_for_skid("3aa0074b77b2493efb447de5ce6cd055085de3f0")
            .len()
    );
    assert_eq!(
        1,
        store
            .get_certificates_for_name(&root().subject_name())
            .len()
    );
    assert!(store.is_trust_anchor(&root()));
    assert!(!store.is_trust_anchor(&hospital_a_ca()));
    assert!(store.resolve_issuer(&root()).is_none());
    assert_eq!(
        Some(hospital_a_ca().fingerprint()),
        store.resolve_issuer(&al_anderson()).map(|c| c.fingerprint())
    );

    let mut store = store;
    assert!(!store.add_intermediate(hospital_a_ca()));
}
