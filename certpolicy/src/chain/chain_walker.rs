//! The chain_walker module applies a [`ChainPolicy`] to each certificate of a chain.
//!
//! The walk starts at a target certificate and resolves issuers one at a time through an
//! [`IssuerResolver`] until a trust anchor is reached. Every visited certificate produces a
//! [`LevelVerdict`]. When no issuer can be resolved, or the maximum chain length is reached, the
//! walk stops and the [`ChainVerdict`] carries a [`ChainIncomplete`] naming the last certificate
//! that was resolved; the levels visited so far are all retained.

use alloc::format;
use alloc::vec::Vec;
use core::ptr;

use crate::chain::chain_policy::{ChainPolicy, ChainPosition};
use crate::chain::chain_verdict::{
    ChainIncomplete, ChainVerdict, IncompleteReason, LevelVerdict,
};
use crate::policy::policy_evaluator::PolicyEvaluator;
use crate::policy::policy_settings::PolicySettings;
use crate::source::extension_source::ExtensionSource;
use crate::util::error::{Error, Result};
use crate::util::logging::{log_chain_verdict, log_message, PolicyLogLevels};

/// `IssuerResolver` is implemented by stores that can locate the issuer of a certificate and
/// recognize trust anchors.
pub trait IssuerResolver<C> {
    /// `is_trust_anchor` returns true if the certificate is a trust anchor, i.e., a walk that reaches
    /// it is complete.
    fn is_trust_anchor(&self, cert: &C) -> bool;

    /// `resolve_issuer` returns the issuer of the certificate, if one can be found. Implementations
    /// must not return the presented certificate.
    fn resolve_issuer(&self, cert: &C) -> Option<&C>;
}

/// `ChainWalker` walks certificate chains and evaluates the applicable level policy at each step.
pub struct ChainWalker<'a> {
    evaluator: &'a PolicyEvaluator,
    settings: &'a PolicySettings,
}

impl<'a> ChainWalker<'a> {
    /// Creates a walker that evaluates level policies with `evaluator` and is governed by `settings`
    pub fn new(evaluator: &'a PolicyEvaluator, settings: &'a PolicySettings) -> Self {
        ChainWalker {
            evaluator,
            settings,
        }
    }

    /// `walk` starts at `target` and resolves issuers through `resolver` until a trust anchor is
    /// reached, evaluating the policy for each position along the way.
    pub fn walk<'c, C, R>(
        &self,
        target: &'c C,
        resolver: &'c R,
        policy: &ChainPolicy,
    ) -> Result<ChainVerdict>
    where
        C: ExtensionSource,
        R: IssuerResolver<C> + ?Sized,
    {
        let max_length = usize::from(self.settings.get_max_chain_length()).max(1);
        let mut levels = Vec::new();
        let mut incomplete = None;
        let mut current = target;
        let mut depth = 0;

        loop {
            let anchor = resolver.is_trust_anchor(current);
            let position = if depth == 0 {
                ChainPosition::Leaf
            } else if anchor {
                ChainPosition::Anchor
            } else {
                ChainPosition::Intermediate
            };
            levels.push(self.evaluate_level(current, position, depth, policy)?);

            if anchor {
                break;
            }
            if depth + 1 >= max_length {
                incomplete = Some(ChainIncomplete {
                    last_resolved: current.subject_name(),
                    depth,
                    reason: IncompleteReason::MaxLengthExceeded,
                });
                break;
            }
            match resolver.resolve_issuer(current) {
                Some(issuer) if !ptr::eq(issuer, current) => {
                    current = issuer;
                    depth += 1;
                }
                _ => {
                    incomplete = Some(ChainIncomplete {
                        last_resolved: current.subject_name(),
                        depth,
                        reason: IncompleteReason::IssuerNotFound,
                    });
                    break;
                }
            }
        }

        if let Some(ic) = &incomplete {
            log_message(&PolicyLogLevels::PolicyWarn, &format!("{}", ic));
        }
        let verdict = ChainVerdict::new(
            levels,
            incomplete,
            self.settings.get_require_complete_chain(),
        );
        if self.settings.get_log_diagnostics() {
            log_chain_verdict(&verdict);
        }
        Ok(verdict)
    }

    /// `walk_path` evaluates a caller-assembled chain ordered from the leaf toward the anchor.
    /// When `anchored` is true the last certificate is treated as the trust anchor; otherwise the
    /// walk reports the chain as incomplete after the last certificate.
    pub fn walk_path<C: ExtensionSource>(
        &self,
        path: &[C],
        anchored: bool,
        policy: &ChainPolicy,
    ) -> Result<ChainVerdict> {
        let target = match path.first() {
            Some(target) => target,
            None => return Err(Error::NotFound),
        };
        let resolver = PathResolver { path, anchored };
        self.walk(target, &resolver, policy)
    }

    fn evaluate_level<C: ExtensionSource>(
        &self,
        cert: &C,
        position: ChainPosition,
        depth: usize,
        policy: &ChainPolicy,
    ) -> Result<LevelVerdict> {
        let subject = cert.subject_name();
        let level_policy = match policy.policy_for(position) {
            Some(lp)
                if position != ChainPosition::Anchor
                    || self.settings.get_evaluate_trust_anchor() =>
            {
                lp
            }
            _ => {
                return Ok(LevelVerdict {
                    depth,
                    position,
                    subject,
                    advisory: false,
                    verdict: None,
                })
            }
        };

        let verdict = self.evaluator.evaluate_tree(&level_policy.policy, cert)?;
        if !verdict.pass {
            log_message(
                &PolicyLogLevels::PolicyInfo,
                &format!(
                    "{} policy {} for {} at depth {}",
                    position,
                    if level_policy.advisory {
                        "advisory failed"
                    } else {
                        "failed"
                    },
                    subject,
                    depth
                ),
            );
        }
        Ok(LevelVerdict {
            depth,
            position,
            subject,
            advisory: level_policy.advisory,
            verdict: Some(verdict),
        })
    }
}

/// PathResolver presents a caller-assembled chain as an [`IssuerResolver`], where the issuer of each
/// element is the next element.
struct PathResolver<'p, C> {
    path: &'p [C],
    anchored: bool,
}

impl<'p, C> PathResolver<'p, C> {
    fn index_of(&self, cert: &C) -> Option<usize> {
        self.path.iter().position(|c| ptr::eq(c, cert))
    }
}

impl<'p, C> IssuerResolver<C> for PathResolver<'p, C> {
    fn is_trust_anchor(&self, cert: &C) -> bool {
        self.anchored && self.path.last().map_or(false, |last| ptr::eq(last, cert))
    }

    fn resolve_issuer(&self, cert: &C) -> Option<&C> {
        self.index_of(cert).and_then(|i| self.path.get(i + 1))
    }
}
