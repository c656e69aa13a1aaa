//! The extension_field module provides [`ExtensionField`], the stateful unit that injects a value
//! from a certificate and answers questions about it.
//!
//! A field moves through a small state machine:
//!
//! ```text
//! Uninjected --inject, extension present---------> Injected(value)
//! Uninjected --inject, extension absent, optional-> Injected(Empty)
//! Uninjected --inject, extension absent, required-> Violated
//! Uninjected --inject, extension malformed--------> Violated
//! ```
//!
//! Reading the value is only legal in the Injected state. Injecting again recomputes the state from
//! the presented certificate and [`ExtensionField::reset`] returns the field to Uninjected.

use alloc::format;

use serde::{Deserialize, Serialize};

use crate::field::extension_kind::ExtensionKind;
use crate::field::policy_value::PolicyValue;
use crate::source::extension_source::ExtensionSource;
use crate::util::error::{Error, Result};
use crate::util::logging::{log_message, PolicyLogLevels};

/// `ExtractReferenceValue` is the signature of the derivation rule attached to each field variant.
/// It returns `Ok(None)` when the extension is absent.
pub type ExtractReferenceValue =
    fn(&FieldOptions, &dyn ExtensionSource) -> Result<Option<PolicyValue>>;

/// `FieldOptions` carries variant-specific behavior switches.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOptions {
    /// When set, an authority key identifier field whose extension is absent derives its value
    /// from the caIssuers location in the authority information access extension.
    #[serde(default)]
    pub aia_fallback: bool,
}

/// `FieldState` is the state of an [`ExtensionField`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FieldState {
    /// No injection has been performed (or the field was reset)
    #[default]
    Uninjected,
    /// A value was derived (Empty when an optional extension was absent)
    Injected(PolicyValue),
    /// A required extension was absent or the extension could not be decoded
    Violated,
}

/// `Extraction` is the outcome of an injection, threaded through evaluation as data.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Extraction {
    /// The extension was present and the derived value is attached
    Present(PolicyValue),
    /// The extension was absent and the field is optional
    AbsentOptional,
    /// The extension was absent and the field is required
    AbsentRequiredViolation,
    /// The extension was present but could not be decoded
    Malformed,
}

impl Extraction {
    /// `is_violation` returns true for outcomes that leave a field in the Violated state.
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            Extraction::AbsentRequiredViolation | Extraction::Malformed
        )
    }
}

/// `ExtensionField` derives a [`PolicyValue`] for one [`ExtensionKind`] from a certificate.
///
/// Instances are normally created by a [`FieldRegistry`](crate::FieldRegistry), which attaches the
/// derivation rule for the kind.
#[derive(Clone, Debug)]
pub struct ExtensionField {
    kind: ExtensionKind,
    required: bool,
    options: FieldOptions,
    extract: ExtractReferenceValue,
    state: FieldState,
}

impl ExtensionField {
    /// Creates a new, uninjected field
    pub fn new(
        kind: ExtensionKind,
        required: bool,
        options: FieldOptions,
        extract: ExtractReferenceValue,
    ) -> Self {
        ExtensionField {
            kind,
            required,
            options,
            extract,
            state: FieldState::Uninjected,
        }
    }

    /// Returns the extension kind
    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    /// Returns true if absence of the extension is a policy violation
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the variant options
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Returns the current state
    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// `inject` derives the value for this field from `cert`, updates the state and reports the
    /// outcome as an [`Extraction`]. It never fails; violations are returned as data.
    pub fn inject(&mut self, cert: &dyn ExtensionSource) -> Extraction {
        match (self.extract)(&self.options, cert) {
            Ok(Some(value)) => {
                self.state = FieldState::Injected(value.clone());
                Extraction::Present(value)
            }
            Ok(None) if !self.required => {
                self.state = FieldState::Injected(PolicyValue::Empty);
                Extraction::AbsentOptional
            }
            Ok(None) => {
                log_message(
                    &PolicyLogLevels::PolicyInfo,
                    &format!(
                        "Required {} extension is absent from {}",
                        self.kind,
                        cert.subject_name()
                    ),
                );
                self.state = FieldState::Violated;
                Extraction::AbsentRequiredViolation
            }
            Err(_e) => {
                self.state = FieldState::Violated;
                Extraction::Malformed
            }
        }
    }

    /// `inject_reference_value` derives the value for this field from `cert`. An absent required
    /// extension is reported as [`Error::PolicyRequiredViolation`] and an undecodable extension as
    /// [`Error::MalformedExtension`]; in both cases the field is left Violated.
    pub fn inject_reference_value(&mut self, cert: &dyn ExtensionSource) -> Result<()> {
        match self.inject(cert) {
            Extraction::Present(_) | Extraction::AbsentOptional => Ok(()),
            Extraction::AbsentRequiredViolation => Err(Error::PolicyRequiredViolation(self.kind)),
            Extraction::Malformed => Err(Error::MalformedExtension(self.kind)),
        }
    }

    /// `get_policy_value` returns the injected value. Calling it on a field that is Uninjected or
    /// Violated is a usage error and returns [`Error::InvalidUsage`].
    pub fn get_policy_value(&self) -> Result<&PolicyValue> {
        match &self.state {
            FieldState::Injected(value) => Ok(value),
            FieldState::Uninjected | FieldState::Violated => Err(Error::InvalidUsage(self.kind)),
        }
    }

    /// `reset` returns the field to the Uninjected state.
    pub fn reset(&mut self) {
        self.state = FieldState::Uninjected;
    }
}
