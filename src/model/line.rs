use crate::model::{Airport, CategorizedValue};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A route between two airports as last observed in the game
///
/// Everything except `id` is filled in by reconciliation. A line whose
/// `last_updated_at` is set has every required field populated; see
/// [`Line::missing_fields`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub origin: Option<Airport>,
    #[serde(default)]
    pub destination: Option<Airport>,
    #[serde(default)]
    pub distance_km: Option<u64>,
    #[serde(default)]
    pub taxes: Option<u64>,
    #[serde(default)]
    pub total_demand: Option<CategorizedValue>,
    #[serde(default)]
    pub ideal_cost: Option<CategorizedValue>,
    #[serde(default)]
    pub turnover: Option<CategorizedValue>,
    #[serde(default)]
    pub current_cost: Option<CategorizedValue>,
    #[serde(default)]
    pub internal_audit_cost: Option<u64>,
    #[serde(default)]
    pub last_audit_date: Option<NaiveDate>,
    /// Game-supplied trust score for the audit data; higher is less trustworthy
    #[serde(default)]
    pub reliability_level: Option<u32>,
    #[serde(default)]
    pub can_update_prices: bool,
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Line {
    /// Creates an empty, never-fetched line
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: None,
            display_name: None,
            origin: None,
            destination: None,
            distance_km: None,
            taxes: None,
            total_demand: None,
            ideal_cost: None,
            turnover: None,
            current_cost: None,
            internal_audit_cost: None,
            last_audit_date: None,
            reliability_level: None,
            can_update_prices: false,
            last_updated_at: None,
        }
    }

    /// Names of the fields a full refresh must populate but are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("origin", self.origin.is_some()),
            ("destination", self.destination.is_some()),
            ("total_demand", self.total_demand.is_some()),
            ("ideal_cost", self.ideal_cost.is_some()),
            ("turnover", self.turnover.is_some()),
            ("current_cost", self.current_cost.is_some()),
        ];

        checks
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// True when every field a full refresh populates is present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Checks whether the line is due for a refresh
    ///
    /// A never-updated line is always stale; otherwise it is stale once
    /// `now - last_updated_at >= interval`.
    pub fn is_stale(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.last_updated_at {
            None => true,
            Some(updated) => now - updated >= interval,
        }
    }

    /// Human label used in logs: the name once known, the ID otherwise
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} (ID: {})", name, self.id),
            None => format!("ID {}", self.id),
        }
    }
}
