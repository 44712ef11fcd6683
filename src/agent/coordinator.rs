//! Pass orchestration and the supervisor loop

use crate::agent::bonuses::BonusCollector;
use crate::config::Config;
use crate::reconcile::{LineReconciler, SyncOutcome};
use crate::scrape::listings::{fetch_airplanes_index, fetch_lines_index};
use crate::session::{AuthSession, RandomInterval};
use crate::storage::export_csv;
use crate::{ErrorDisposition, Result};
use std::collections::HashSet;
use std::time::Duration;

/// Counters of one completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub airplanes: usize,
    pub lines_listed: usize,
    pub lines_synced: usize,
    pub lines_skipped: usize,
    pub audits: usize,
    pub price_pushes: usize,
    pub bonuses_claimed: usize,
}

/// Owns the session and runs passes over the whole account
///
/// A pass is all-or-nothing: the first failing line aborts it, and the
/// supervisor decides from the error's disposition whether to rerun it.
pub struct Coordinator {
    config: Config,
    session: AuthSession,
    reconciler: LineReconciler,
    bonuses: Option<BonusCollector>,
}

impl Coordinator {
    /// Creates a coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run; nothing has been sent yet
    /// * `Err(AutopilotError)` - The HTTP client or cookie blob could not be set up
    pub fn new(config: Config) -> Result<Self> {
        let session = AuthSession::new(&config)?;
        let reconciler = LineReconciler::from_config(&config);
        let bonuses = config
            .bonuses
            .enabled
            .then(|| BonusCollector::from_config(&config));

        Ok(Self {
            config,
            session,
            reconciler,
            bonuses,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn reconciler(&self) -> &LineReconciler {
        &self.reconciler
    }

    /// Runs one pass over the account
    ///
    /// 1. Acquire the session
    /// 2. List airplanes and export them
    /// 3. List lines and export them
    /// 4. Sync every listed line
    /// 5. Collect bonuses, when enabled
    pub async fn run_pass(&mut self) -> Result<PassReport> {
        let mut report = PassReport::default();
        let max_pages = self.config.schedule.max_pages;

        let status = self.session.acquire().await?;
        tracing::info!("Starting pass (session {:?})", status);

        let airplanes = fetch_airplanes_index(&mut self.session, max_pages).await?;
        export_csv(&airplanes, &self.config.storage.airplanes_summary_path)?;
        report.airplanes = airplanes.len();
        tracing::info!("Total airplanes found: {}", report.airplanes);

        let lines = fetch_lines_index(&mut self.session, max_pages).await?;
        export_csv(&lines, &self.config.storage.lines_summary_path)?;
        report.lines_listed = lines.len();
        tracing::info!("Total lines found: {}", report.lines_listed);

        let mut seen = HashSet::new();
        for summary in &lines {
            if !seen.insert(summary.id) {
                continue;
            }
            let sync = self.reconciler.sync_line(&mut self.session, summary.id).await?;
            match sync.outcome {
                SyncOutcome::Fresh => report.lines_skipped += 1,
                SyncOutcome::Reconciled(summary) => {
                    report.lines_synced += 1;
                    report.audits += usize::from(summary.audited);
                    report.price_pushes += usize::from(summary.prices_pushed);
                }
            }
        }

        if let Some(bonuses) = &self.bonuses {
            report.bonuses_claimed = bonuses.run_all(&mut self.session).await?.claimed();
        }

        tracing::info!(
            "Pass complete: {} lines synced, {} fresh, {} audits, {} price pushes, {} bonuses",
            report.lines_synced,
            report.lines_skipped,
            report.audits,
            report.price_pushes,
            report.bonuses_claimed
        );
        Ok(report)
    }

    /// Runs one pass with a re-probed session, without retrying
    pub async fn run_once(&mut self) -> Result<PassReport> {
        self.session.invalidate();
        self.run_pass().await
    }

    /// Runs passes until one completes or fails fatally
    ///
    /// Retryable failures are logged, then the pass is rerun after
    /// `retry-delay` seconds with a re-probed session.
    pub async fn supervise_pass(&mut self) -> Result<PassReport> {
        loop {
            match self.run_once().await {
                Ok(report) => return Ok(report),
                Err(e) => match e.disposition() {
                    ErrorDisposition::Retry => {
                        tracing::error!(
                            "Pass failed, retrying in {}s: {}",
                            self.config.schedule.retry_delay,
                            e
                        );
                        tokio::time::sleep(Duration::from_secs(self.config.schedule.retry_delay)).await;
                    }
                    ErrorDisposition::Fatal => {
                        tracing::error!("Pass failed fatally: {}", e);
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Runs supervised passes forever, sleeping a random interval between them
    ///
    /// Only returns on a fatal error.
    pub async fn run_forever(&mut self) -> Result<()> {
        let between_passes = RandomInterval::new(
            self.config.schedule.pass_interval_min,
            self.config.schedule.pass_interval_max,
        );

        loop {
            self.supervise_pass().await?;
            let delay = between_passes.pick();
            tracing::info!("Next pass in {} minutes", delay.as_secs() / 60);
            tokio::time::sleep(delay).await;
        }
    }
}
