//! Results of evaluating a policy tree against a certificate

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Serialize;

use crate::field::extension_field::Extraction;
use crate::field::extension_kind::ExtensionKind;

/// Path of the root node of a policy tree. Child `i` of the node at path `p` has path `p.i`.
pub const ROOT_PATH: &str = "$";

/// `FieldOutcome` records what happened at one field leaf.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldOutcome {
    /// Extension kind checked by the leaf
    pub kind: ExtensionKind,
    /// Outcome of injecting the field
    pub extraction: Extraction,
    /// Whether the leaf passed
    pub passed: bool,
}

/// `Diagnostic` is the entry recorded for one visited node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Path of the node in the tree
    pub path: String,
    /// Node label, i.e., `Any` or `Field(SubjectAltName)`
    pub node: String,
    /// Whether the node passed
    pub passed: bool,
    /// Human readable detail
    pub detail: String,
}

/// `Verdict` is the result of evaluating a policy tree against one certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Verdict {
    /// Overall result
    pub pass: bool,
    /// Outcome of each visited field leaf keyed by node path
    pub field_outcomes: BTreeMap<String, FieldOutcome>,
    /// One entry per visited node in visit (pre-)order
    pub diagnostics: Vec<Diagnostic>,
}

impl Verdict {
    /// `diagnostic_for` returns the diagnostic recorded for the node at `path`, if it was visited.
    pub fn diagnostic_for(&self, path: &str) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.path == path)
    }

    /// `child_diagnostics` returns the diagnostics of the visited direct children of the node at
    /// `path`, in visit order.
    pub fn child_diagnostics(&self, path: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| is_direct_child(path, &d.path))
            .collect()
    }

    /// `violations` returns the paths of field leaves whose injection left the field Violated.
    pub fn violations(&self) -> Vec<(&String, &FieldOutcome)> {
        self.field_outcomes
            .iter()
            .filter(|(_, o)| o.extraction.is_violation())
            .collect()
    }
}

fn is_direct_child(parent: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(parent) {
        Some(rest) => match rest.strip_prefix('.') {
            Some(index) => !index.is_empty() && !index.contains('.'),
            None => false,
        },
        None => false,
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.path,
            self.node,
            if self.passed { "passed" } else { "failed" },
            self.detail
        )
    }
}

#[test]
fn direct_child_test() {
    assert!(is_direct_child("$", "$.0"));
    assert!(is_direct_child("$.0", "$.0.12"));
    assert!(!is_direct_child("$", "$"));
    assert!(!is_direct_child("$", "$.0.1"));
    assert!(!is_direct_child("$.1", "$.10"));
}
