//! Typed values derived from certificate extensions and the operators used to compare them

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::util::policy_utilities::buffer_to_hex;

/// Key usage bit for digitalSignature, as rendered in [`PolicyValue::Code`] by the key usage field
pub const KU_DIGITAL_SIGNATURE: u32 = 1;
/// Key usage bit for nonRepudiation (contentCommitment)
pub const KU_NON_REPUDIATION: u32 = 1 << 1;
/// Key usage bit for keyEncipherment
pub const KU_KEY_ENCIPHERMENT: u32 = 1 << 2;
/// Key usage bit for dataEncipherment
pub const KU_DATA_ENCIPHERMENT: u32 = 1 << 3;
/// Key usage bit for keyAgreement
pub const KU_KEY_AGREEMENT: u32 = 1 << 4;
/// Key usage bit for keyCertSign
pub const KU_KEY_CERT_SIGN: u32 = 1 << 5;
/// Key usage bit for cRLSign
pub const KU_CRL_SIGN: u32 = 1 << 6;

/// `PolicyValue` is the datum derived from a certificate for one policy field. The evaluator treats
/// values as opaque; derivation and normalization belong to the [`ExtensionKind`](crate::ExtensionKind).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PolicyValue {
    /// No value, i.e., an optional extension was absent
    Empty,
    /// Single textual value, i.e., a key identifier rendered as hex
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Enumerated code or bit set, i.e., key usage
    Code(u32),
    /// Boolean flag, i.e., basicConstraints cA
    Bool(bool),
    /// Values from a multi-valued extension
    Strings(Vec<String>),
}

/// `Comparison` is the operator used to compare a derived value against the expected value
/// configured on a policy leaf.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Comparison {
    /// Values are equal. Multi-valued values are compared as sets.
    #[default]
    Equals,
    /// Derived value includes the expected value: a superset for multi-valued values, a substring
    /// for strings and bytes and a superset of bits for codes.
    Contains,
}

impl PolicyValue {
    /// `is_empty` returns true for [`PolicyValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, PolicyValue::Empty)
    }

    /// `satisfies` returns true if this (derived) value satisfies `expected` under `comparison`.
    pub fn satisfies(&self, expected: &PolicyValue, comparison: Comparison) -> bool {
        match comparison {
            Comparison::Equals => match (self, expected) {
                (PolicyValue::Strings(derived), PolicyValue::Strings(expected)) => {
                    derived.iter().collect::<BTreeSet<_>>()
                        == expected.iter().collect::<BTreeSet<_>>()
                }
                (PolicyValue::Strings(derived), PolicyValue::String(expected)) => {
                    derived.len() == 1 && derived.contains(expected)
                }
                _ => self == expected,
            },
            Comparison::Contains => match (self, expected) {
                (_, PolicyValue::Empty) => true,
                (PolicyValue::Strings(derived), PolicyValue::Strings(expected)) => {
                    expected.iter().all(|e| derived.contains(e))
                }
                (PolicyValue::Strings(derived), PolicyValue::String(expected)) => {
                    derived.contains(expected)
                }
                (PolicyValue::String(derived), PolicyValue::String(expected)) => {
                    derived.contains(expected.as_str())
                }
                (PolicyValue::Bytes(derived), PolicyValue::Bytes(expected)) => {
                    expected.is_empty() || derived.windows(expected.len()).any(|w| w == expected)
                }
                (PolicyValue::Code(derived), PolicyValue::Code(expected)) => {
                    derived & expected == *expected
                }
                _ => self == expected,
            },
        }
    }
}

impl fmt::Display for PolicyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyValue::Empty => write!(f, "<empty>"),
            PolicyValue::String(s) => write!(f, "{}", s),
            PolicyValue::Bytes(b) => write!(f, "{}", buffer_to_hex(b)),
            PolicyValue::Code(c) => write!(f, "{:#06x}", c),
            PolicyValue::Bool(b) => write!(f, "{}", b),
            PolicyValue::Strings(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equals => write!(f, "equals"),
            Comparison::Contains => write!(f, "contains"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn strings(v: &[&str]) -> PolicyValue {
        PolicyValue::Strings(v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn equals_test() {
        assert!(strings(&["b", "a"]).satisfies(&strings(&["a", "b"]), Comparison::Equals));
        assert!(!strings(&["a", "b", "c"]).satisfies(&strings(&["a", "b"]), Comparison::Equals));
        assert!(strings(&["a"]).satisfies(&PolicyValue::String("a".to_string()), Comparison::Equals));
        assert!(PolicyValue::Bool(true).satisfies(&PolicyValue::Bool(true), Comparison::Equals));
        assert!(!PolicyValue::Empty.satisfies(&PolicyValue::Bool(false), Comparison::Equals));
        assert!(PolicyValue::Empty.satisfies(&PolicyValue::Empty, Comparison::Equals));
    }

    #[test]
    fn contains_test() {
        let policies = strings(&["1.3.6.1.4.1.41179.0.1.2", "1.3.6.1.4.1.41179.1.3"]);
        assert!(policies.satisfies(&strings(&["1.3.6.1.4.1.41179.1.3"]), Comparison::Contains));
        assert!(policies.satisfies(
            &PolicyValue::String("1.3.6.1.4.1.41179.0.1.2".to_string()),
            Comparison::Contains
        ));
        assert!(!policies.satisfies(&strings(&["2.16.840.1.101.3.2.1.3.13"]), Comparison::Contains));

        let ku = PolicyValue::Code(KU_DIGITAL_SIGNATURE | KU_KEY_ENCIPHERMENT);
        assert!(ku.satisfies(&PolicyValue::Code(KU_DIGITAL_SIGNATURE), Comparison::Contains));
        assert!(!ku.satisfies(&PolicyValue::Code(KU_KEY_CERT_SIGN), Comparison::Contains));
        assert!(!ku.satisfies(&PolicyValue::Code(KU_DIGITAL_SIGNATURE), Comparison::Equals));

        assert!(PolicyValue::Bytes(vec![1, 2, 3, 4])
            .satisfies(&PolicyValue::Bytes(vec![2, 3]), Comparison::Contains));
        assert!(PolicyValue::String("http://ca.example/issuer.der".to_string())
            .satisfies(&PolicyValue::String("ca.example".to_string()), Comparison::Contains));
        assert!(PolicyValue::Empty.satisfies(&PolicyValue::Empty, Comparison::Contains));
    }

    #[test]
    fn display_test() {
        use alloc::format;
        assert_eq!("0x0005", format!("{}", PolicyValue::Code(5)));
        assert_eq!("[a, b]", format!("{}", strings(&["a", "b"])));
        assert_eq!("<empty>", format!("{}", PolicyValue::Empty));
    }
}
