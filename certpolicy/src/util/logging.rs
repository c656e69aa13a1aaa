//! Logging support

use alloc::format;

#[cfg(feature = "std")]
use log::{debug, error, info, warn};

use crate::chain::chain_verdict::ChainVerdict;
use crate::policy::verdict::Verdict;

/// Enum that describes level associated with a log message
#[derive(Debug, Eq, PartialEq)]
pub enum PolicyLogLevels {
    /// Common error logging level
    PolicyError,
    /// Common info logging level
    PolicyInfo,
    /// Common warn logging level
    PolicyWarn,
    /// Common debug logging level
    PolicyDebug,
}

/// `log_message` provides a logging function that uses the `log` facade.
#[cfg(feature = "std")]
pub fn log_message(level: &PolicyLogLevels, message: &str) {
    if &PolicyLogLevels::PolicyError == level {
        error!("{}", message);
    } else if &PolicyLogLevels::PolicyWarn == level {
        warn!("{}", message);
    } else if &PolicyLogLevels::PolicyInfo == level {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

#[cfg(not(feature = "std"))]
/// `log_message` does nothing when std feature gate is not used
pub fn log_message(_level: &PolicyLogLevels, _message: &str) {}

/// `log_verdict` writes a one line summary of a [`Verdict`] at info level followed by each
/// diagnostic entry, in visit order, at debug level.
pub fn log_verdict(label: &str, verdict: &Verdict) {
    log_message(
        &PolicyLogLevels::PolicyInfo,
        &format!(
            "{}: {} ({} nodes visited)",
            label,
            if verdict.pass { "PASS" } else { "FAIL" },
            verdict.diagnostics.len()
        ),
    );
    for d in &verdict.diagnostics {
        log_message(&PolicyLogLevels::PolicyDebug, &format!("{}: {}", label, d));
    }
}

/// `log_chain_verdict` logs each level of a [`ChainVerdict`] using [`log_verdict`] and then
/// the overall outcome, including any incomplete chain condition.
pub fn log_chain_verdict(verdict: &ChainVerdict) {
    for level in &verdict.levels {
        let label = format!("[{}] {} {}", level.depth, level.position, level.subject);
        match &level.verdict {
            Some(v) => log_verdict(&label, v),
            None => log_message(
                &PolicyLogLevels::PolicyDebug,
                &format!("{}: no policy applied", label),
            ),
        }
    }
    if let Some(incomplete) = &verdict.incomplete {
        log_message(&PolicyLogLevels::PolicyWarn, &format!("{}", incomplete));
    }
    log_message(
        &PolicyLogLevels::PolicyInfo,
        &format!(
            "Chain policy result: {} ({} levels evaluated, chain {})",
            if verdict.pass { "PASS" } else { "FAIL" },
            verdict.levels.len(),
            if verdict.complete {
                "complete"
            } else {
                "incomplete"
            }
        ),
    );
}
