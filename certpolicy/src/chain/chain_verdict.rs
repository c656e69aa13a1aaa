//! Results of walking a certification chain

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Serialize;

use crate::chain::chain_policy::ChainPosition;
use crate::policy::verdict::Verdict;

/// `IncompleteReason` describes why a chain walk stopped before reaching a trust anchor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IncompleteReason {
    /// No issuer could be resolved for the last certificate
    IssuerNotFound,
    /// The walk reached the maximum chain length
    MaxLengthExceeded,
}

/// `ChainIncomplete` identifies where a chain walk stopped when it did not reach a trust anchor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChainIncomplete {
    /// Subject of the last certificate that was resolved and evaluated
    pub last_resolved: String,
    /// Depth of that certificate (the leaf is at depth 0)
    pub depth: usize,
    /// Why the walk stopped
    pub reason: IncompleteReason,
}

impl fmt::Display for ChainIncomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            IncompleteReason::IssuerNotFound => "no issuer found",
            IncompleteReason::MaxLengthExceeded => "maximum chain length reached",
        };
        write!(
            f,
            "Chain incomplete after {} at depth {}: {}",
            self.last_resolved, self.depth, reason
        )
    }
}

/// `LevelVerdict` is the result for one certificate visited by a chain walk.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LevelVerdict {
    /// Depth of the certificate (the leaf is at depth 0)
    pub depth: usize,
    /// Position used to select the level policy
    pub position: ChainPosition,
    /// Subject of the certificate
    pub subject: String,
    /// Whether the level policy was advisory
    pub advisory: bool,
    /// Verdict for the level, or None when no policy applied to the position
    pub verdict: Option<Verdict>,
}

impl LevelVerdict {
    /// `passed` returns true when no policy applied or the policy passed.
    pub fn passed(&self) -> bool {
        self.verdict.as_ref().map_or(true, |v| v.pass)
    }

    /// `enforced_failure` returns true when an enforced (non-advisory) policy failed.
    pub fn enforced_failure(&self) -> bool {
        !self.advisory && !self.passed()
    }
}

/// `ChainVerdict` is the result of walking a chain from a target certificate toward a trust anchor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[readonly::make]
pub struct ChainVerdict {
    /// Overall result: every enforced level passed and, when complete chains are required, the
    /// walk reached a trust anchor
    #[readonly]
    pub pass: bool,
    /// Whether the walk reached a trust anchor
    #[readonly]
    pub complete: bool,
    /// One entry per visited certificate, leaf first
    #[readonly]
    pub levels: Vec<LevelVerdict>,
    /// Present when the walk stopped before reaching a trust anchor
    #[readonly]
    pub incomplete: Option<ChainIncomplete>,
}

impl ChainVerdict {
    /// Creates a verdict from the visited levels. `require_complete` determines whether an
    /// incomplete chain fails overall.
    pub fn new(
        levels: Vec<LevelVerdict>,
        incomplete: Option<ChainIncomplete>,
        require_complete: bool,
    ) -> Self {
        let complete = incomplete.is_none();
        let pass =
            !levels.iter().any(|l| l.enforced_failure()) && (complete || !require_complete);
        ChainVerdict {
            pass,
            complete,
            levels,
            incomplete,
        }
    }

    /// `advisory_failures` returns the levels whose advisory policy failed.
    pub fn advisory_failures(&self) -> Vec<&LevelVerdict> {
        self.levels
            .iter()
            .filter(|l| l.advisory && !l.passed())
            .collect()
    }

    /// `enforced_failures` returns the levels whose enforced policy failed.
    pub fn enforced_failures(&self) -> Vec<&LevelVerdict> {
        self.levels.iter().filter(|l| l.enforced_failure()).collect()
    }
}
