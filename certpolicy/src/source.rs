//! Sources of certificates, issuer candidates and DNS-published certificate material

pub mod cert_store;
pub mod dns_record_store;
pub mod extension_source;
pub mod message_extractor;
pub mod policy_certificate;

#[cfg(feature = "std")]
pub mod file_utils;

pub use crate::{
    source::cert_store::*, source::dns_record_store::*, source::extension_source::*,
    source::message_extractor::*, source::policy_certificate::*,
};

#[cfg(feature = "std")]
pub use crate::source::file_utils::*;
