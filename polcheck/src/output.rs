//! Prints verdicts as text or JSON

use log::error;

use certpolicy::*;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        error!("Failed to serialize verdict: {}", e);
        Error::ParseError
    })
}

fn pass_or_fail(pass: bool) -> &'static str {
    if pass {
        "PASS"
    } else {
        "FAIL"
    }
}

/// `print_verdict` prints the result of evaluating a policy tree against one certificate, followed
/// by the diagnostic entry for each visited node.
pub fn print_verdict(label: &str, verdict: &Verdict, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(verdict)?);
        return Ok(());
    }
    println!("{}: {}", label, pass_or_fail(verdict.pass));
    for d in &verdict.diagnostics {
        println!("    {}", d);
    }
    for (path, outcome) in verdict.violations() {
        println!("    {} {}: {:?}", path, outcome.kind, outcome.extraction);
    }
    Ok(())
}

/// `print_chain_verdict` prints the result of walking the chain from one certificate.
pub fn print_chain_verdict(label: &str, verdict: &ChainVerdict, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(verdict)?);
        return Ok(());
    }
    println!(
        "{}: chain {} ({})",
        label,
        pass_or_fail(verdict.pass),
        if verdict.complete {
            "complete"
        } else {
            "incomplete"
        }
    );
    for level in &verdict.levels {
        let status = match &level.verdict {
            None => "NOT EVALUATED",
            Some(v) if v.pass => "PASS",
            Some(_) if level.advisory => "ADVISORY FAIL",
            Some(_) => "FAIL",
        };
        println!(
            "    [{}] {} {}: {}",
            level.depth, level.position, level.subject, status
        );
        if let Some(v) = &level.verdict {
            for d in v.diagnostics.iter().filter(|d| !d.passed) {
                println!("        {}", d);
            }
        }
    }
    if let Some(incomplete) = &verdict.incomplete {
        println!("    {}", incomplete);
    }
    Ok(())
}

/// `list_kinds` prints each extension kind a policy leaf may name along with the extension's
/// object identifier.
pub fn list_kinds() {
    for kind in ALL_EXTENSION_KINDS {
        println!("{} ({})", kind, kind.oid());
    }
}
