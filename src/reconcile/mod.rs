//! Line reconciliation
//!
//! - `LineState`: ordered steps of one reconciliation
//! - `policy`: when to audit and when to push prices
//! - `LineReconciler`: the staleness gate and the steps themselves

pub mod policy;
mod reconciler;
mod state;

pub use policy::{needs_audit, needs_price_push, AUDIT_RELIABILITY_THRESHOLD};
pub use reconciler::{LineReconciler, ReconcileSummary, SyncOutcome, SyncReport};
pub use state::LineState;
