//! Processes the polcheck command line options

use std::path::Path;

use log::{debug, error, info};

use certpolicy::*;

use crate::args::PolcheckArgs;
use crate::output::*;

/// Exit status when every evaluated policy passed
pub const EXIT_PASS: i32 = 0;
/// Exit status when at least one policy failed
pub const EXIT_FAIL: i32 = 1;
/// Exit status when the inputs could not be processed
pub const EXIT_ERROR: i32 = 2;

/// Certificates read from the target options
struct Targets {
    certs: Vec<PolicyCertificate>,
    // certificates that accompanied a message target
    intermediates: Vec<PolicyCertificate>,
}

/// `run` acts on the options and returns the process exit status.
pub fn run(args: &PolcheckArgs) -> i32 {
    if args.list_kinds {
        list_kinds();
        return EXIT_PASS;
    }
    match check(args) {
        Ok(true) => EXIT_PASS,
        Ok(false) => EXIT_FAIL,
        Err(e) => {
            error!("Failed to evaluate policies: {}", e);
            EXIT_ERROR
        }
    }
}

fn check(args: &PolcheckArgs) -> Result<bool> {
    if args.policy.is_none() && args.chain_policy.is_none() {
        error!("Either policy or chain-policy must be provided");
        return Err(Error::Misconfiguration);
    }

    let settings = read_settings(&args.settings)?;
    let targets = load_targets(args)?;
    if targets.certs.is_empty() {
        error!("No target certificates were found");
        return Err(Error::NotFound);
    }
    let evaluator = PolicyEvaluator::from_settings(&settings);

    let mut all_passed = true;
    if let Some(policy_file) = &args.policy {
        let policy = read_policy(Path::new(policy_file))?;
        debug!("Read policy with {} leaves from {}", policy.leaf_count(), policy_file);
        for cert in &targets.certs {
            let verdict = evaluator.evaluate_tree(&policy, cert)?;
            all_passed &= verdict.pass;
            print_verdict(&label(cert), &verdict, args.json)?;
        }
    }

    if let Some(chain_policy_file) = &args.chain_policy {
        let chain_policy = read_chain_policy(Path::new(chain_policy_file))?;
        let store = build_store(args, &settings, targets.intermediates)?;
        let walker = ChainWalker::new(&evaluator, &settings);
        for cert in &targets.certs {
            let verdict = walker.walk(cert, &store, &chain_policy)?;
            all_passed &= verdict.pass;
            print_chain_verdict(&label(cert), &verdict, args.json)?;
        }
    }
    Ok(all_passed)
}

fn load_targets(args: &PolcheckArgs) -> Result<Targets> {
    let mut targets = Targets {
        certs: vec![],
        intermediates: vec![],
    };
    if let Some(target) = &args.target {
        targets.certs.push(load_certificate_file(Path::new(target))?);
    }
    if let Some(message) = &args.message {
        let body = get_file_as_byte_vec(Path::new(message))?;
        let mut certs = extract_certificates(&body).into_iter();
        match certs.next() {
            Some(first) => {
                targets.certs.push(first);
                targets.intermediates.extend(certs);
            }
            None => error!("No certificates were found in {}", message),
        }
    }
    Ok(targets)
}

fn build_store(
    args: &PolcheckArgs,
    settings: &PolicySettings,
    intermediates: Vec<PolicyCertificate>,
) -> Result<CertificateStore> {
    let ta_folder = match args
        .ta_folder
        .clone()
        .or_else(|| settings.get_trust_anchor_folder())
    {
        Some(ta_folder) => ta_folder,
        None => {
            error!("A trust anchor folder is required when a chain policy is used");
            return Err(Error::Misconfiguration);
        }
    };
    let ca_folder = args
        .ca_folder
        .clone()
        .or_else(|| settings.get_certification_authority_folder());

    let mut store = populate_certificate_store(&ta_folder, ca_folder.as_deref())?;
    let mut added = 0;
    for cert in intermediates {
        if store.add_intermediate(cert) {
            added += 1;
        }
    }
    if added > 0 {
        info!("Added {} CA certificates from message", added);
    }
    store.log_certificates();
    Ok(store)
}

fn label(cert: &PolicyCertificate) -> String {
    match &cert.locator {
        Some(locator) => locator.clone(),
        None => cert.subject_name(),
    }
}
