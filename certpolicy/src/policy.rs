//! Policy expression trees, their evaluation and the settings that govern evaluation

pub mod policy_evaluator;
pub mod policy_node;
pub mod policy_settings;
pub mod verdict;

pub use crate::{
    policy::policy_evaluator::*, policy::policy_node::*, policy::policy_settings::*,
    policy::verdict::*,
};
