//! Top-level agent: passes over the account and bonus routines

pub mod bonuses;
mod coordinator;

pub use bonuses::{BonusCollector, BonusReport};
pub use coordinator::{Coordinator, PassReport};
