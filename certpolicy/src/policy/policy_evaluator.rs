//! The policy_evaluator module evaluates [`PolicyNode`] trees against certificates.
//!
//! Evaluation is synchronous and holds no state beyond the registry used to create fields, so a
//! single [`PolicyEvaluator`] may be shared by any number of threads. Each leaf visit creates a fresh
//! [`ExtensionField`](crate::ExtensionField).
//!
//! Violations (a required extension that is absent or an extension that cannot be decoded) are
//! absorbed into the boolean result of the enclosing node and recorded in the [`Verdict`]. The only
//! exception is a bare [`PolicyNode::FieldLeaf`] passed to [`PolicyEvaluator::evaluate`], which
//! returns the violation as an error so isolated field checks can assert on it.

use alloc::format;
use alloc::string::String;

use crate::field::extension_field::Extraction;
use crate::field::field_registry::FieldRegistry;
use crate::policy::policy_node::{FieldSpec, PolicyNode};
use crate::policy::policy_settings::PolicySettings;
use crate::policy::verdict::{Diagnostic, FieldOutcome, Verdict, ROOT_PATH};
use crate::source::extension_source::ExtensionSource;
use crate::util::error::{Error, Result};
use crate::util::logging::log_verdict;

/// `PolicyEvaluator` walks policy trees against certificates.
#[derive(Clone, Default)]
pub struct PolicyEvaluator {
    registry: FieldRegistry,
    log_diagnostics: bool,
}

impl PolicyEvaluator {
    /// Creates an evaluator that uses the given registry to create fields
    pub fn with_registry(registry: FieldRegistry) -> Self {
        PolicyEvaluator {
            registry,
            log_diagnostics: false,
        }
    }

    /// Creates an evaluator with the default registry, configured from settings
    pub fn from_settings(settings: &PolicySettings) -> Self {
        PolicyEvaluator {
            registry: FieldRegistry::default(),
            log_diagnostics: settings.get_log_diagnostics(),
        }
    }

    /// Returns the registry used to create fields
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// `evaluate` evaluates `node` against `cert`.
    ///
    /// When `node` is a bare field leaf, an absent required extension is returned as
    /// [`Error::PolicyRequiredViolation`] and an undecodable extension as
    /// [`Error::MalformedExtension`]. Composed trees never return either error. Usage errors always
    /// propagate.
    pub fn evaluate(&self, node: &PolicyNode, cert: &dyn ExtensionSource) -> Result<Verdict> {
        let verdict = self.evaluate_tree(node, cert)?;
        if let PolicyNode::FieldLeaf(spec) = node {
            match verdict.field_outcomes.get(ROOT_PATH).map(|o| &o.extraction) {
                Some(Extraction::AbsentRequiredViolation) => {
                    return Err(Error::PolicyRequiredViolation(spec.kind))
                }
                Some(Extraction::Malformed) => return Err(Error::MalformedExtension(spec.kind)),
                _ => {}
            }
        }
        Ok(verdict)
    }

    /// `evaluate_tree` evaluates `node` against `cert`, absorbing violations into the verdict
    /// regardless of the shape of the tree.
    pub fn evaluate_tree(&self, node: &PolicyNode, cert: &dyn ExtensionSource) -> Result<Verdict> {
        let mut verdict = Verdict::default();
        verdict.pass = self.evaluate_node(node, cert, ROOT_PATH, &mut verdict)?;
        if self.log_diagnostics {
            log_verdict(&cert.subject_name(), &verdict);
        }
        Ok(verdict)
    }

    fn evaluate_node(
        &self,
        node: &PolicyNode,
        cert: &dyn ExtensionSource,
        path: &str,
        verdict: &mut Verdict,
    ) -> Result<bool> {
        match node {
            PolicyNode::FieldLeaf(spec) => self.evaluate_leaf(spec, cert, path, verdict),
            PolicyNode::All(children) => {
                // diagnostics are recorded in pre-order, so the slot for this node is reserved
                // before visiting children and completed afterwards
                let slot = reserve(verdict, path, node);
                let mut passed = true;
                let mut visited = 0;
                for (i, child) in children.iter().enumerate() {
                    visited += 1;
                    if !self.evaluate_node(child, cert, &child_path(path, i), verdict)? {
                        passed = false;
                        break;
                    }
                }
                let detail = if visited < children.len() {
                    format!(
                        "child {} failed, {} remaining children not evaluated",
                        visited - 1,
                        children.len() - visited
                    )
                } else {
                    format!("{} of {} children evaluated", visited, children.len())
                };
                complete(verdict, slot, passed, detail);
                Ok(passed)
            }
            PolicyNode::Any(children) => {
                let slot = reserve(verdict, path, node);
                let mut pass_count = 0;
                for (i, child) in children.iter().enumerate() {
                    if self.evaluate_node(child, cert, &child_path(path, i), verdict)? {
                        pass_count += 1;
                    }
                }
                let passed = pass_count > 0;
                complete(
                    verdict,
                    slot,
                    passed,
                    format!("{} of {} children passed", pass_count, children.len()),
                );
                Ok(passed)
            }
            PolicyNode::Not(child) => {
                let slot = reserve(verdict, path, node);
                let child_passed = self.evaluate_node(child, cert, &child_path(path, 0), verdict)?;
                let passed = !child_passed;
                complete(
                    verdict,
                    slot,
                    passed,
                    format!("child {}", if child_passed { "passed" } else { "failed" }),
                );
                Ok(passed)
            }
        }
    }

    fn evaluate_leaf(
        &self,
        spec: &FieldSpec,
        cert: &dyn ExtensionSource,
        path: &str,
        verdict: &mut Verdict,
    ) -> Result<bool> {
        let mut field = self.registry.create(spec)?;
        let extraction = field.inject(cert);
        let (passed, detail) = match &extraction {
            Extraction::Present(_) | Extraction::AbsentOptional => {
                let value = field.get_policy_value()?;
                match &spec.expected {
                    Some(expected) => {
                        let passed = spec.kind.matches(value, expected, spec.comparison);
                        (
                            passed,
                            format!("derived {} {} expected {}", value, spec.comparison, expected),
                        )
                    }
                    None => (
                        !value.is_empty(),
                        if value.is_empty() {
                            String::from("extension absent")
                        } else {
                            format!("extension present with value {}", value)
                        },
                    ),
                }
            }
            Extraction::AbsentRequiredViolation => {
                (false, String::from("required extension absent"))
            }
            Extraction::Malformed => (false, String::from("extension could not be decoded")),
        };

        verdict.diagnostics.push(Diagnostic {
            path: String::from(path),
            node: format!("Field({})", spec.kind),
            passed,
            detail,
        });
        verdict.field_outcomes.insert(
            String::from(path),
            FieldOutcome {
                kind: spec.kind,
                extraction,
                passed,
            },
        );
        Ok(passed)
    }
}

fn child_path(path: &str, index: usize) -> String {
    format!("{}.{}", path, index)
}

fn reserve(verdict: &mut Verdict, path: &str, node: &PolicyNode) -> usize {
    verdict.diagnostics.push(Diagnostic {
        path: String::from(path),
        node: node.node_name(),
        passed: false,
        detail: String::new(),
    });
    verdict.diagnostics.len() - 1
}

fn complete(verdict: &mut Verdict, slot: usize, passed: bool, detail: String) {
    if let Some(d) = verdict.diagnostics.get_mut(slot) {
        d.passed = passed;
        d.detail = detail;
    }
}
