// src/association/mod.rs
//! Role ↔ skill association model built from the posting corpus

pub mod associator;
pub mod rules;
pub mod table;

pub use associator::RoleSkillAssociator;
pub use rules::{RoleRule, RoleRules, UNKNOWN_ROLE};
pub use table::{AssociationRow, AssociationTable};
