//! Immutable policy expression trees

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::field::extension_field::FieldOptions;
use crate::field::extension_kind::ExtensionKind;
use crate::field::policy_value::{Comparison, PolicyValue};

/// `FieldSpec` describes the field check performed by a [`PolicyNode::FieldLeaf`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Extension kind to check
    pub kind: ExtensionKind,
    /// Whether absence of the extension is a policy violation
    #[serde(default)]
    pub required: bool,
    /// Value the derived value is compared against. When absent, presence of the extension is the
    /// pass signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<PolicyValue>,
    /// Operator used to compare against `expected`
    #[serde(default)]
    pub comparison: Comparison,
    /// Variant-specific options
    #[serde(default)]
    pub options: FieldOptions,
}

impl FieldSpec {
    /// Creates a spec for a required field with no expected value
    pub fn required(kind: ExtensionKind) -> Self {
        FieldSpec {
            kind,
            required: true,
            expected: None,
            comparison: Comparison::default(),
            options: FieldOptions::default(),
        }
    }

    /// Creates a spec for an optional field with no expected value
    pub fn optional(kind: ExtensionKind) -> Self {
        FieldSpec {
            required: false,
            ..FieldSpec::required(kind)
        }
    }

    /// Sets the expected value
    pub fn expecting(mut self, value: PolicyValue) -> Self {
        self.expected = Some(value);
        self
    }

    /// Sets the comparison operator
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Sets the variant options
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

/// `PolicyNode` is a node in a policy expression tree. Trees are built once, never mutated by
/// evaluation and may be shared across threads.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PolicyNode {
    /// Check of a single extension field
    FieldLeaf(FieldSpec),
    /// Passes iff every child passes; evaluation stops at the first failing child. An empty `All`
    /// passes.
    All(Vec<PolicyNode>),
    /// Passes iff at least one child passes; every child is evaluated. An empty `Any` fails.
    Any(Vec<PolicyNode>),
    /// Inverts its child
    Not(Box<PolicyNode>),
}

impl PolicyNode {
    /// Creates a leaf node
    pub fn field(spec: FieldSpec) -> Self {
        PolicyNode::FieldLeaf(spec)
    }

    /// Creates an `All` node
    pub fn all(children: Vec<PolicyNode>) -> Self {
        PolicyNode::All(children)
    }

    /// Creates an `Any` node
    pub fn any(children: Vec<PolicyNode>) -> Self {
        PolicyNode::Any(children)
    }

    /// Creates a `Not` node
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: PolicyNode) -> Self {
        PolicyNode::Not(Box::new(child))
    }

    /// Returns true for [`PolicyNode::FieldLeaf`]
    pub fn is_leaf(&self) -> bool {
        matches!(self, PolicyNode::FieldLeaf(_))
    }

    /// `node_name` returns a short label for the node used in diagnostics, i.e., `All` or
    /// `Field(KeyUsage)`.
    pub fn node_name(&self) -> String {
        match self {
            PolicyNode::FieldLeaf(spec) => format!("Field({})", spec.kind),
            PolicyNode::All(_) => "All".to_string(),
            PolicyNode::Any(_) => "Any".to_string(),
            PolicyNode::Not(_) => "Not".to_string(),
        }
    }

    /// `leaf_count` returns the number of field leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            PolicyNode::FieldLeaf(_) => 1,
            PolicyNode::All(children) | PolicyNode::Any(children) => {
                children.iter().map(|c| c.leaf_count()).sum()
            }
            PolicyNode::Not(child) => child.leaf_count(),
        }
    }
}

#[test]
fn policy_node_serde_test() {
    use alloc::vec;

    let node = PolicyNode::all(vec![
        PolicyNode::field(FieldSpec::required(ExtensionKind::AuthorityKeyIdentifierKeyId)),
        PolicyNode::not(PolicyNode::field(
            FieldSpec::optional(ExtensionKind::BasicConstraints)
                .expecting(PolicyValue::Bool(true)),
        )),
    ]);
    assert_eq!(2, node.leaf_count());
    assert_eq!("All", node.node_name());

    let json = serde_json::to_string(&node).unwrap();
    let parsed: PolicyNode = serde_json::from_str(&json).unwrap();
    assert_eq!(node, parsed);

    // omitted members take their defaults
    let parsed: PolicyNode =
        serde_json::from_str(r#"{"FieldLeaf": {"kind": "KeyUsage", "expected": {"Code": 1}}}"#)
            .unwrap();
    assert_eq!(
        PolicyNode::field(
            FieldSpec::optional(ExtensionKind::KeyUsage).expecting(PolicyValue::Code(1))
        ),
        parsed
    );
}
