//! Policy fields: typed values derived from individual certificate extensions

pub mod extension_field;
pub mod extension_kind;
pub mod extractors;
pub mod field_registry;
pub mod policy_value;

pub use crate::{
    field::extension_field::*, field::extension_kind::*, field::extractors::*,
    field::field_registry::*, field::policy_value::*,
};
