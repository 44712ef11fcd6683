use crate::config::Config;
use crate::model::Line;
use crate::reconcile::policy::{needs_audit, needs_price_push};
use crate::reconcile::state::LineState;
use crate::scrape::endpoints;
use crate::scrape::layout::pricing;
use crate::scrape::pages::{parse_line_details, parse_pricing_page};
use crate::session::{AuthSession, PortalRequest};
use crate::storage::{AirportStore, LineStore};
use crate::{AutopilotError, Result};
use chrono::{Duration, Utc};
use reqwest::StatusCode;

/// What a reconciliation did beyond the two refreshes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub audited: bool,
    pub prices_pushed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Updated within the freshness interval; nothing was sent
    Fresh,
    Reconciled(ReconcileSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub line_id: u64,
    pub outcome: SyncOutcome,
}

/// Brings local line records in line with the game
///
/// A reconciliation always re-reads the detail and pricing pages, requests
/// an audit when the reliability level is above the threshold, and pushes
/// the ideal prices when they differ from the current ones. The record is
/// stamped and saved only once every step succeeded.
pub struct LineReconciler {
    lines: LineStore,
    airports: AirportStore,
    freshness: Duration,
}

impl LineReconciler {
    pub fn new(lines: LineStore, airports: AirportStore, freshness: Duration) -> Self {
        Self {
            lines,
            airports,
            freshness,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LineStore::new(&config.storage.lines_dir),
            AirportStore::new(&config.storage.airports_dir),
            Duration::days(i64::from(config.schedule.line_update_interval_days)),
        )
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    pub fn airports(&self) -> &AirportStore {
        &self.airports
    }

    /// Loads line `id` and reconciles it if it is stale
    ///
    /// A line with no record is created empty, hence stale. A corrupt record
    /// fails with `AutopilotError::CorruptState` before anything is sent.
    pub async fn sync_line(&self, session: &mut AuthSession, id: u64) -> Result<SyncReport> {
        let mut line = self.lines.load(id)?.unwrap_or_else(|| Line::new(id));

        if !line.is_stale(Utc::now(), self.freshness) {
            tracing::debug!("Line {} is fresh, skipping", line.label());
            return Ok(SyncReport {
                line_id: id,
                outcome: SyncOutcome::Fresh,
            });
        }

        let summary = self.reconcile(session, &mut line).await?;
        Ok(SyncReport {
            line_id: id,
            outcome: SyncOutcome::Reconciled(summary),
        })
    }

    /// Runs every reconciliation step on `line` and persists it
    ///
    /// On error the record on disk is untouched; `line` may hold partially
    /// refreshed data but is never stamped.
    pub async fn reconcile(&self, session: &mut AuthSession, line: &mut Line) -> Result<ReconcileSummary> {
        let mut progress = Progress::new(line.id);
        let mut summary = ReconcileSummary::default();

        self.refresh_basic(session, line).await?;
        progress.advance(LineState::BasicRefreshed)?;

        let mut price_token = self.refresh_marketing(session, line).await?;
        progress.advance(LineState::MarketingRefreshed)?;

        if needs_audit(line) {
            tracing::info!(
                "Line {}: reliability level {:?} is too high, requesting an audit",
                line.label(),
                line.reliability_level
            );
            self.request_audit(session, line.id).await?;
            progress.advance(LineState::AuditRefreshed)?;
            summary.audited = true;
        }

        if needs_price_push(line) {
            let token = price_token.take().ok_or_else(|| {
                AutopilotError::Protocol(format!(
                    "pricing form of line {} has no CSRF token",
                    line.id
                ))
            })?;
            self.push_prices(session, line, &token).await?;
            progress.advance(LineState::PricesPushed)?;

            self.refresh_marketing(session, line).await?;
            progress.advance(LineState::MarketingRefreshed)?;
            summary.prices_pushed = true;
        }

        let previous = line.last_updated_at;
        line.last_updated_at = Some(Utc::now());
        if let Err(e) = self.lines.save(line) {
            line.last_updated_at = previous;
            return Err(e.into());
        }
        progress.advance(LineState::Persisted)?;

        tracing::info!("Line {} updated", line.label());
        Ok(summary)
    }

    async fn refresh_basic(&self, session: &mut AuthSession, line: &mut Line) -> Result<()> {
        let response = session
            .request(PortalRequest::get(endpoints::line_detail(line.id)))
            .await?;
        let details = session.parse(&response, parse_line_details)?;

        self.airports.save(&details.origin)?;
        self.airports.save(&details.destination)?;

        details.apply_to(line);
        Ok(())
    }

    /// Returns the price-form token, when the page has one
    async fn refresh_marketing(&self, session: &mut AuthSession, line: &mut Line) -> Result<Option<String>> {
        let response = session
            .request(PortalRequest::get(endpoints::line_pricing(line.id)))
            .await?;
        let snapshot = session.parse(&response, parse_pricing_page)?;
        Ok(snapshot.apply_to(line))
    }

    async fn request_audit(&self, session: &mut AuthSession, id: u64) -> Result<()> {
        let request = PortalRequest::get(endpoints::line_audit(id))
            .referer(endpoints::line_pricing(id))
            .no_redirects();
        let response = session.request(request).await?;
        session.expect_status(&response, StatusCode::FOUND, "lines_audit_response_not_302")
    }

    async fn push_prices(&self, session: &mut AuthSession, line: &Line, token: &str) -> Result<()> {
        let (Some(ideal), Some(current)) = (line.ideal_cost, line.current_cost) else {
            return Err(AutopilotError::Protocol(format!(
                "line {} has no prices to compare",
                line.id
            )));
        };
        tracing::info!(
            "Line {}: pushing prices {} (currently {})",
            line.label(),
            ideal,
            current
        );

        let path = endpoints::line_pricing(line.id);
        let request = PortalRequest::post(path.clone()).referer(path).form([
            (pricing::ECONOMIC_FIELD, ideal.economic.to_string()),
            (pricing::EXECUTIVE_FIELD, ideal.executive.to_string()),
            (pricing::FIRST_CLASS_FIELD, ideal.first_class.to_string()),
            (pricing::CARGO_FIELD, ideal.cargo.to_string()),
            (pricing::TOKEN_FIELD, token.to_string()),
        ]);
        let response = session.request(request).await?;
        tracing::debug!("Price form answered {}", response.status.as_u16());
        Ok(())
    }
}

/// Guards the order of the reconciliation steps
struct Progress {
    line_id: u64,
    state: LineState,
}

impl Progress {
    fn new(line_id: u64) -> Self {
        Self {
            line_id,
            state: LineState::Unknown,
        }
    }

    fn advance(&mut self, next: LineState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(AutopilotError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Line {}: {} -> {}", self.line_id, self.state, next);
        self.state = next;
        Ok(())
    }
}
