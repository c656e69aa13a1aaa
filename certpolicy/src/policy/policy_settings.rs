//! Structures and functions related to configuring policy evaluation and chain walking

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use policyprocmacros::*;

#[cfg(feature = "std")]
use std::path::Path;

#[cfg(feature = "std")]
use serde_json::Result as SerdeResult;

#[cfg(feature = "std")]
use crate::source::file_utils::get_file_as_byte_vec;
#[cfg(feature = "std")]
use crate::util::error::{Error, Result};

/// `PolicySettings` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySettings(pub BTreeMap<String, PolicyProcessingTypes>);

impl PolicySettings {
    /// Creates a new empty [`PolicySettings`]
    pub fn new() -> Self {
        Self::default()
    }
}

/// `PolicyProcessingTypes` is used to define a variant map with types associated with policy
/// evaluation and chain walking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyProcessingTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u8 values
    U8(u8),
    /// Represents String values
    String(String),
    /// Represents vectors of Strings
    Strings(Vec<String>),
}

//-----------------------------------------------------------------------------------------------
// Chain walking settings
//-----------------------------------------------------------------------------------------------
/// `PS_MAX_CHAIN_LENGTH` is used to retrieve the maximum number of certificates, target and trust
/// anchor included, that a chain walk will visit. Walks that reach the limit without finding a
/// trust anchor are reported as incomplete.
pub static PS_MAX_CHAIN_LENGTH: &str = "psMaxChainLength";

/// Default value for [`PS_MAX_CHAIN_LENGTH`]
pub const PS_MAX_CHAIN_LENGTH_DEFAULT: u8 = 10;

/// `PS_REQUIRE_COMPLETE_CHAIN` is used to retrieve a boolean indicating whether a chain walk that
/// does not reach a trust anchor fails overall, regardless of the per-level results.
pub static PS_REQUIRE_COMPLETE_CHAIN: &str = "psRequireCompleteChain";

/// `PS_EVALUATE_TRUST_ANCHOR` is used to retrieve a boolean indicating whether the anchor policy
/// of a chain policy is evaluated against the trust anchor reached by a chain walk.
pub static PS_EVALUATE_TRUST_ANCHOR: &str = "psEvaluateTrustAnchor";

//-----------------------------------------------------------------------------------------------
// Diagnostics settings
//-----------------------------------------------------------------------------------------------
/// `PS_LOG_DIAGNOSTICS` is used to retrieve a boolean indicating whether each verdict is written
/// to the log as it is produced.
pub static PS_LOG_DIAGNOSTICS: &str = "psLogDiagnostics";

//-----------------------------------------------------------------------------------------------
// File-based settings
//-----------------------------------------------------------------------------------------------
/// `PS_TRUST_ANCHOR_FOLDER` is used to retrieve the full path of a folder containing trust anchor
/// certificates.
pub static PS_TRUST_ANCHOR_FOLDER: &str = "psTrustAnchorFolder";

/// `PS_CERTIFICATION_AUTHORITY_FOLDER` is used to retrieve the full path of a folder containing
/// intermediate CA certificates.
pub static PS_CERTIFICATION_AUTHORITY_FOLDER: &str = "psCertificationAuthorityFolder";

ps_gets_and_sets_with_default!(PS_MAX_CHAIN_LENGTH, u8, PS_MAX_CHAIN_LENGTH_DEFAULT);
ps_gets_and_sets_with_default!(PS_REQUIRE_COMPLETE_CHAIN, bool, false);
ps_gets_and_sets_with_default!(PS_EVALUATE_TRUST_ANCHOR, bool, true);
ps_gets_and_sets_with_default!(PS_LOG_DIAGNOSTICS, bool, false);
ps_gets_and_sets!(PS_TRUST_ANCHOR_FOLDER, String);
ps_gets_and_sets!(PS_CERTIFICATION_AUTHORITY_FOLDER, String);

/// `read_settings` accepts a string containing the name of a file that notionally contains JSON data that
/// represents PolicySettings.
///
/// A missing file name or a file that does not exist yields default settings. A file that exists
/// but does not parse yields [`Error::ParseError`].
///
/// ```json
/// {"psMaxChainLength":{"U8":4},"psRequireCompleteChain":{"Bool":true}}
/// ```
#[cfg(feature = "std")]
pub fn read_settings(fname: &Option<String>) -> Result<PolicySettings> {
    if let Some(fname) = fname {
        let p = Path::new(fname.as_str());
        if Path::exists(p) {
            let json = get_file_as_byte_vec(p)?;
            let r: SerdeResult<PolicySettings> = serde_json::from_slice(&json);
            return match r {
                Ok(ps) => Ok(ps),
                Err(_e) => Err(Error::ParseError),
            };
        }
    }
    Ok(PolicySettings::new())
}

#[test]
fn test_default_gets_ps() {
    let ps = PolicySettings::default();
    assert_eq!(PS_MAX_CHAIN_LENGTH_DEFAULT, ps.get_max_chain_length());
    assert!(!ps.get_require_complete_chain());
    assert!(ps.get_evaluate_trust_anchor());
    assert!(!ps.get_log_diagnostics());
    assert_eq!(None, ps.get_trust_anchor_folder());
    assert_eq!(None, ps.get_certification_authority_folder());
}

#[test]
fn test_default_sets_ps() {
    let mut ps = PolicySettings::default();
    ps.set_max_chain_length(3);
    ps.set_require_complete_chain(true);
    ps.set_evaluate_trust_anchor(false);
    ps.set_log_diagnostics(true);
    ps.set_trust_anchor_folder("/tmp/tas".to_string());
    ps.set_certification_authority_folder("/tmp/cas".to_string());

    assert_eq!(3, ps.get_max_chain_length());
    assert!(ps.get_require_complete_chain());
    assert!(!ps.get_evaluate_trust_anchor());
    assert!(ps.get_log_diagnostics());
    assert_eq!(Some("/tmp/tas".to_string()), ps.get_trust_anchor_folder());
    assert_eq!(
        Some("/tmp/cas".to_string()),
        ps.get_certification_authority_folder()
    );

    // a value of the wrong type reads as the default
    ps.0.insert(
        PS_MAX_CHAIN_LENGTH.to_string(),
        PolicyProcessingTypes::Bool(true),
    );
    assert_eq!(PS_MAX_CHAIN_LENGTH_DEFAULT, ps.get_max_chain_length());
}
