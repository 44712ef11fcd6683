//! Decisions taken from the marketing data of a line

use crate::model::Line;

/// Reliability levels above this trigger an audit
pub const AUDIT_RELIABILITY_THRESHOLD: u32 = 50;

pub fn needs_audit(line: &Line) -> bool {
    line.reliability_level
        .map_or(false, |level| level > AUDIT_RELIABILITY_THRESHOLD)
}

/// Prices are pushed when the game allows it and any bucket differs
pub fn needs_price_push(line: &Line) -> bool {
    if !line.can_update_prices {
        return false;
    }
    match (&line.ideal_cost, &line.current_cost) {
        (Some(ideal), Some(current)) => ideal != current,
        _ => false,
    }
}
