use certpolicy::*;
use const_oid::db::rfc5912::ID_CE_KEY_USAGE;

fn demo_ca() -> PolicyCertificate {
    PolicyCertificate::try_from(&include_bytes!("examples/DemoHealthDirectCA.der")[..]).unwrap()
}

fn al_anderson() -> PolicyCertificate {
    PolicyCertificate::try_from(
        &include_bytes!("examples/AlAnderson@hospitalA.direct.example.com.der")[..],
    )
    .unwrap()
}

/// leaf that passes for the Al Anderson certificate and fails for the demo CA
fn has_aki() -> PolicyNode {
    PolicyNode::field(FieldSpec::optional(
        ExtensionKind::AuthorityKeyIdentifierKeyId,
    ))
}

fn passing() -> PolicyNode {
    PolicyNode::field(
        FieldSpec::required(ExtensionKind::BasicConstraints).expecting(PolicyValue::Bool(false)),
    )
}

fn failing() -> PolicyNode {
    PolicyNode::field(
        FieldSpec::required(ExtensionKind::BasicConstraints).expecting(PolicyValue::Bool(true)),
    )
}

fn violating() -> PolicyNode {
    // present in the Al Anderson certificate, absent from the demo CA
    PolicyNode::field(FieldSpec::required(ExtensionKind::AuthorityKeyIdentifierKeyId))
}

#[test]
fn leaf_expected_value_comparisons() {
    let evaluator = PolicyEvaluator::default();
    let cert = al_anderson();

    let aki = PolicyNode::field(
        FieldSpec::required(ExtensionKind::AuthorityKeyIdentifierKeyId).expecting(
            PolicyValue::String("3A:A0:07:4B:77:B2:49:3E:FB:44:7D:E5:CE:6C:D0:55:08:5D:E3:F0".to_string()),
        ),
    );
    assert!(evaluator.evaluate(&aki, &cert).unwrap().pass);

    let ku = PolicyNode::field(
        FieldSpec::required(ExtensionKind::KeyUsage)
            .expecting(PolicyValue::Code(KU_DIGITAL_SIGNATURE))
            .with_comparison(Comparison::Contains),
    );
    assert!(evaluator.evaluate(&ku, &cert).unwrap().pass);

    let ku_equals = PolicyNode::field(
        FieldSpec::required(ExtensionKind::KeyUsage).expecting(PolicyValue::Code(KU_DIGITAL_SIGNATURE)),
    );
    assert!(!evaluator.evaluate(&ku_equals, &cert).unwrap().pass);

    let san = PolicyNode::field(
        FieldSpec::required(ExtensionKind::SubjectAltName)
            .expecting(PolicyValue::String(
                "rfc822Name:alanderson@hospitala.direct.example.com".to_string(),
            ))
            .with_comparison(Comparison::Contains),
    );
    assert!(evaluator.evaluate(&san, &cert).unwrap().pass);

    let policies = PolicyNode::field(
        FieldSpec::required(ExtensionKind::CertificatePolicies)
            .expecting(PolicyValue::Strings(vec!["1.3.6.1.4.1.41179.1.3".to_string()]))
            .with_comparison(Comparison::Contains),
    );
    assert!(evaluator.evaluate(&policies, &cert).unwrap().pass);
}

#[test]
fn presence_is_the_pass_signal_without_expected_value() {
    let evaluator = PolicyEvaluator::default();
    assert!(evaluator.evaluate(&has_aki(), &al_anderson()).unwrap().pass);

    let verdict = evaluator.evaluate(&has_aki(), &demo_ca()).unwrap();
    assert!(!verdict.pass);
    assert_eq!(
        Extraction::AbsentOptional,
        verdict.field_outcomes[ROOT_PATH].extraction
    );
}

#[test]
fn bare_leaf_reraises_violation() {
    let evaluator = PolicyEvaluator::default();
    assert_eq!(
        Err(Error::PolicyRequiredViolation(
            ExtensionKind::AuthorityKeyIdentifierKeyId
        )),
        evaluator.evaluate(&violating(), &demo_ca())
    );

    // evaluate_tree absorbs even at the root
    let verdict = evaluator.evaluate_tree(&violating(), &demo_ca()).unwrap();
    assert!(!verdict.pass);
    assert_eq!(1, verdict.violations().len());
}

#[test]
fn bare_leaf_reraises_malformed() {
    let mut cert = ExtensionMap::new("CN=Malformed");
    cert.insert(ID_CE_KEY_USAGE, vec![0x04, 0x01]);
    let node = PolicyNode::field(FieldSpec::optional(ExtensionKind::KeyUsage));
    assert_eq!(
        Err(Error::MalformedExtension(ExtensionKind::KeyUsage)),
        PolicyEvaluator::default().evaluate(&node, &cert)
    );

    let composed = PolicyNode::any(vec![node, passing()]);
    let verdict = PolicyEvaluator::default().evaluate(&composed, &cert).unwrap();
    // BasicConstraints is absent here as well, so neither child passes
    assert!(!verdict.pass);
    assert_eq!(Extraction::Malformed, verdict.field_outcomes["$.0"].extraction);
}

#[test]
fn composition_absorbs_violations() {
    let evaluator = PolicyEvaluator::default();
    let cert = demo_ca();

    for node in [
        PolicyNode::all(vec![violating()]),
        PolicyNode::any(vec![violating()]),
    ] {
        let verdict = evaluator.evaluate(&node, &cert).unwrap();
        assert!(!verdict.pass);
        assert_eq!(
            Extraction::AbsentRequiredViolation,
            verdict.field_outcomes["$.0"].extraction
        );
    }

    // a violation inside Not is an ordinary failure, so Not passes
    let verdict = evaluator
        .evaluate(&PolicyNode::not(violating()), &cert)
        .unwrap();
    assert!(verdict.pass);
}

#[test]
fn all_passes_iff_every_child_passes() {
    let evaluator = PolicyEvaluator::default();
    let cert = al_anderson();

    let cases = [
        (vec![passing(), passing(), passing()], true),
        (vec![passing(), failing(), passing()], false),
        (vec![failing(), passing()], false),
        (vec![passing(), passing(), failing()], false),
        (vec![], true),
    ];
    for (children, expected) in cases {
        let verdict = evaluator.evaluate(&PolicyNode::all(children), &cert).unwrap();
        assert_eq!(expected, verdict.pass);
    }
}

#[test]
fn all_short_circuits_on_first_failure() {
    let evaluator = PolicyEvaluator::default();
    let node = PolicyNode::all(vec![passing(), failing(), passing(), passing()]);
    let verdict = evaluator.evaluate(&node, &al_anderson()).unwrap();
    assert!(!verdict.pass);

    // the All node plus the two children visited before stopping
    assert_eq!(3, verdict.diagnostics.len());
    assert_eq!(2, verdict.child_diagnostics(ROOT_PATH).len());
    assert!(verdict.diagnostic_for("$.2").is_none());
    assert!(verdict.field_outcomes.get("$.3").is_none());
}

#[test]
fn any_passes_iff_one_child_passes_and_evaluates_every_child() {
    let evaluator = PolicyEvaluator::default();
    let cert = al_anderson();

    let cases = [
        (vec![failing(), failing(), passing()], true),
        (vec![passing(), failing(), failing()], true),
        (vec![failing(), mismatching_san(), failing()], false),
        (vec![passing(), passing()], true),
        (vec![], false),
    ];
    for (children, expected) in cases {
        let count = children.len();
        let verdict = evaluator.evaluate(&PolicyNode::any(children), &cert).unwrap();
        assert_eq!(expected, verdict.pass);
        assert_eq!(count, verdict.child_diagnostics(ROOT_PATH).len());
        assert_eq!(count + 1, verdict.diagnostics.len());
    }
}

/// SAN check that the Al Anderson certificate fails without a violation
fn mismatching_san() -> PolicyNode {
    PolicyNode::field(FieldSpec::required(ExtensionKind::SubjectAltName).expecting(
        PolicyValue::String("rfc822Name:nobody@example.com".to_string()),
    ))
}

#[test]
fn not_inverts_its_child() {
    let evaluator = PolicyEvaluator::default();
    let (leaf, ca) = (al_anderson(), demo_ca());
    let certs: [&dyn ExtensionSource; 2] = [&leaf, &ca];
    for cert in certs {
        for child in [passing(), failing(), has_aki(), violating()] {
            let direct = evaluator.evaluate_tree(&child, cert).unwrap().pass;
            let inverted = evaluator
                .evaluate(&PolicyNode::not(child.clone()), cert)
                .unwrap()
                .pass;
            assert_eq!(!direct, inverted);
        }
    }
}

#[test]
fn diagnostics_are_recorded_in_pre_order() {
    let evaluator = PolicyEvaluator::default();
    let node = PolicyNode::all(vec![
        PolicyNode::any(vec![failing(), passing()]),
        PolicyNode::not(failing()),
        has_aki(),
    ]);
    let verdict = evaluator.evaluate(&node, &al_anderson()).unwrap();
    assert!(verdict.pass);

    let paths: Vec<&str> = verdict.diagnostics.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(
        vec!["$", "$.0", "$.0.0", "$.0.1", "$.1", "$.1.0", "$.2"],
        paths
    );
    let nodes: Vec<&str> = verdict.diagnostics.iter().map(|d| d.node.as_str()).collect();
    assert_eq!(
        vec![
            "All",
            "Any",
            "Field(BasicConstraints)",
            "Field(BasicConstraints)",
            "Not",
            "Field(BasicConstraints)",
            "Field(AuthorityKeyIdentifierKeyId)"
        ],
        nodes
    );
    assert_eq!(4, verdict.field_outcomes.len());
    assert!(!verdict.diagnostic_for("$.0.0").unwrap().passed);
    assert!(verdict.diagnostic_for("$.0").unwrap().passed);
}

#[test]
fn evaluation_is_deterministic() {
    let evaluator = PolicyEvaluator::default();
    let cert = demo_ca();
    let node = PolicyNode::any(vec![violating(), failing(), has_aki()]);
    let first = evaluator.evaluate(&node, &cert).unwrap();
    let second = evaluator.evaluate(&node, &cert).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unregistered_kind_is_misconfiguration() {
    let mut registry = FieldRegistry::empty();
    registry.register(ExtensionKind::BasicConstraints, basic_constraints_field);
    let evaluator = PolicyEvaluator::with_registry(registry);

    assert!(evaluator.evaluate(&passing(), &al_anderson()).unwrap().pass);
    assert_eq!(
        Err(Error::Misconfiguration),
        evaluator.evaluate(&PolicyNode::any(vec![passing(), has_aki()]), &al_anderson())
    );
}

#[test]
fn shared_tree_evaluated_concurrently() {
    let evaluator = PolicyEvaluator::default();
    let node = PolicyNode::all(vec![
        passing(),
        PolicyNode::any(vec![failing(), has_aki()]),
        PolicyNode::not(mismatching_san()),
    ]);
    let leaf = al_anderson();
    let ca = demo_ca();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (evaluator, node) = (&evaluator, &node);
                let cert = if i % 2 == 0 { &leaf } else { &ca };
                s.spawn(move || evaluator.evaluate(node, cert).unwrap().pass)
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(i % 2 == 0, h.join().unwrap());
        }
    });
}
