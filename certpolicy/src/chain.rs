//! Evaluation of per-position policies across a certification chain

pub mod chain_policy;
pub mod chain_verdict;
pub mod chain_walker;

pub use crate::{chain::chain_policy::*, chain::chain_verdict::*, chain::chain_walker::*};
