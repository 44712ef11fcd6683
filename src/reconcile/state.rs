//! Reconciliation progress of one line within a pass
use std::fmt;

/// Step reached by a line during reconciliation
///
/// ```text
/// Unknown -> BasicRefreshed -> MarketingRefreshed -> (AuditRefreshed)
///         -> (PricesPushed -> MarketingRefreshed) -> Persisted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineState {
    /// Loaded or created, nothing fetched yet in this pass
    Unknown,

    /// Detail page read: route, airports, distance, taxes
    BasicRefreshed,

    /// Pricing page read: demand, costs, turnover, audit data
    MarketingRefreshed,

    /// Audit requested because the reliability level was too high
    AuditRefreshed,

    /// Ideal prices submitted; marketing data must be re-read
    PricesPushed,

    /// Stamped and written to the line store
    Persisted,
}

impl LineState {
    /// Returns true if the reconciler may move from `self` to `next`
    pub fn can_transition_to(&self, next: LineState) -> bool {
        use LineState::*;
        matches!(
            (self, next),
            (Unknown, BasicRefreshed)
                | (BasicRefreshed, MarketingRefreshed)
                | (MarketingRefreshed, AuditRefreshed)
                | (MarketingRefreshed, PricesPushed)
                | (MarketingRefreshed, Persisted)
                | (AuditRefreshed, PricesPushed)
                | (AuditRefreshed, Persisted)
                | (PricesPushed, MarketingRefreshed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::BasicRefreshed => "basic_refreshed",
            Self::MarketingRefreshed => "marketing_refreshed",
            Self::AuditRefreshed => "audit_refreshed",
            Self::PricesPushed => "prices_pushed",
            Self::Persisted => "persisted",
        }
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
