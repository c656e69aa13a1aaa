//! Policies that apply to the positions of a certification chain

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::policy_node::PolicyNode;

/// `ChainPosition` is the position of a certificate within a chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ChainPosition {
    /// The certificate the walk started from
    Leaf,
    /// A CA certificate between the leaf and the trust anchor
    Intermediate,
    /// The trust anchor that ended the walk
    Anchor,
}

impl fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainPosition::Leaf => write!(f, "Leaf"),
            ChainPosition::Intermediate => write!(f, "Intermediate"),
            ChainPosition::Anchor => write!(f, "Anchor"),
        }
    }
}

/// `LevelPolicy` is the policy applied at one chain position.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelPolicy {
    /// Policy tree evaluated against each certificate at the position
    pub policy: PolicyNode,
    /// Advisory levels are evaluated and reported but do not affect the overall result
    #[serde(default)]
    pub advisory: bool,
}

impl LevelPolicy {
    /// Creates an enforced level policy
    pub fn enforced(policy: PolicyNode) -> Self {
        LevelPolicy {
            policy,
            advisory: false,
        }
    }

    /// Creates an advisory level policy
    pub fn advisory(policy: PolicyNode) -> Self {
        LevelPolicy {
            policy,
            advisory: true,
        }
    }
}

/// `ChainPolicy` holds the policy for each chain position. Positions without a policy are
/// visited (so the walk can proceed) but not evaluated.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainPolicy {
    /// Policy for the leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<LevelPolicy>,
    /// Policy for each intermediate CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<LevelPolicy>,
    /// Policy for the trust anchor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<LevelPolicy>,
}

impl ChainPolicy {
    /// Creates a chain policy that applies only to the leaf
    pub fn leaf_only(policy: PolicyNode) -> Self {
        ChainPolicy {
            leaf: Some(LevelPolicy::enforced(policy)),
            ..Default::default()
        }
    }

    /// Sets the leaf policy
    pub fn with_leaf(mut self, level: LevelPolicy) -> Self {
        self.leaf = Some(level);
        self
    }

    /// Sets the intermediate policy
    pub fn with_intermediate(mut self, level: LevelPolicy) -> Self {
        self.intermediate = Some(level);
        self
    }

    /// Sets the anchor policy
    pub fn with_anchor(mut self, level: LevelPolicy) -> Self {
        self.anchor = Some(level);
        self
    }

    /// `is_empty` returns true when no position has a policy, i.e., a walk would evaluate nothing.
    pub fn is_empty(&self) -> bool {
        self.leaf.is_none() && self.intermediate.is_none() && self.anchor.is_none()
    }

    /// `policy_for` returns the policy for a position, if any
    pub fn policy_for(&self, position: ChainPosition) -> Option<&LevelPolicy> {
        match position {
            ChainPosition::Leaf => self.leaf.as_ref(),
            ChainPosition::Intermediate => self.intermediate.as_ref(),
            ChainPosition::Anchor => self.anchor.as_ref(),
        }
    }
}
