//! Basic utility functionality supporting policy evaluation

pub mod error;
pub mod logging;
pub mod policy_utilities;

pub use crate::{util::error::*, util::logging::*, util::policy_utilities::*};
