//! Dismissal engine: scan a page and trigger dismissals for matching cards
//!
//! One scan walks the page's card snapshot, evaluates every card against the
//! compiled company and title patterns, and invokes the host dismiss
//! affordance for new matches. The reported count is the number of trigger
//! *attempts*; host-side confirmation is observed by bounded watchers but
//! never feeds back into the count.

use crate::error::{JobsweepError, Result};
use crate::page::{JobCard, JobPage};
use crate::pattern::{compile_patterns, TextMatcher};
use crate::store::{Category, FilterStore, StoreMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod confirm;

pub use confirm::{spawn_watcher, watch_confirmation, ConfirmOutcome};

/// Tuning knobs for the dismissal engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a confirmation watcher waits for the dismissed marker
    pub confirm_timeout: Duration,
    /// How often a watcher re-checks the marker
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Result of one scan over a page snapshot
#[derive(Debug)]
pub struct ScanReport {
    /// Cards present in the snapshot
    pub scanned: usize,
    /// Cards whose company or title matched a filter
    pub matched: usize,
    /// Dismiss triggers attempted (the reported dismissed count)
    pub triggered: usize,
    /// Matching cards skipped because they already carried the marker
    pub already_dismissed: usize,
    /// Matching cards skipped because no dismiss affordance was found
    pub missing_affordance: usize,
    /// Cards skipped because company or title text was absent
    pub skipped_malformed: usize,
    watchers: Vec<JoinHandle<ConfirmOutcome>>,
}

impl ScanReport {
    fn empty() -> Self {
        Self {
            scanned: 0,
            matched: 0,
            triggered: 0,
            already_dismissed: 0,
            missing_affordance: 0,
            skipped_malformed: 0,
            watchers: Vec::new(),
        }
    }

    /// The dismissed count this scan reports downstream
    pub fn dismissed(&self) -> usize {
        self.triggered
    }

    /// Await every confirmation watcher and return how many confirmed.
    ///
    /// Dropping the report instead detaches the watchers; each still stops on
    /// its own at its deadline.
    pub async fn settle(self) -> usize {
        let outcomes = futures::future::join_all(self.watchers).await;
        let mut confirmed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(ConfirmOutcome::Confirmed) => confirmed += 1,
                Ok(ConfirmOutcome::TimedOut) => {}
                Err(e) => warn!(error = %e, "confirmation watcher panicked"),
            }
        }
        confirmed
    }
}

/// Extract the trimmed company and title text from a card.
///
/// A card whose expected structure is absent yields
/// [`JobsweepError::MissingElement`]; the scan logs it and moves on.
fn card_text(card: &Arc<dyn JobCard>) -> Result<(String, String)> {
    let company = card.company().ok_or_else(|| JobsweepError::MissingElement {
        what: "company name".to_string(),
    })?;
    let title = card.title().ok_or_else(|| JobsweepError::MissingElement {
        what: "job title".to_string(),
    })?;
    Ok((company, title))
}

/// Scans job pages and triggers the host dismiss affordance for matches
#[derive(Debug)]
pub struct DismissalEngine {
    config: EngineConfig,
    report_tx: Option<mpsc::Sender<StoreMessage>>,
}

impl DismissalEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            report_tx: None,
        }
    }

    /// Attach the store message channel scan results are reported on
    pub fn with_report_channel(mut self, tx: mpsc::Sender<StoreMessage>) -> Self {
        self.report_tx = Some(tx);
        self
    }

    /// Scan a page against raw company and title pattern lists.
    ///
    /// Off-target pages produce an empty report (count 0) with a warning;
    /// surfacing that condition to the user is the caller's job. Per-card
    /// problems are logged and never abort the remainder of the scan.
    pub fn scan(
        &self,
        page: &dyn JobPage,
        company_patterns: &[String],
        title_patterns: &[String],
    ) -> ScanReport {
        if !page.is_target() {
            warn!("scan requested on a page outside the target site");
            return ScanReport::empty();
        }

        let company_matchers = compile_patterns(company_patterns);
        let title_matchers = compile_patterns(title_patterns);

        let mut report = ScanReport::empty();
        for card in page.cards() {
            report.scanned += 1;

            let (company, title) = match card_text(&card) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "skipping malformed card");
                    report.skipped_malformed += 1;
                    continue;
                }
            };

            let matches = company_matchers.text_match(&company)
                || title_matchers.text_match(&title);
            if !matches {
                continue;
            }
            report.matched += 1;

            if card.is_dismissed() {
                debug!(%company, %title, "already dismissed, skipping");
                report.already_dismissed += 1;
                continue;
            }

            if !card.trigger_dismiss() {
                warn!(%company, %title, "dismiss affordance not found, skipping");
                report.missing_affordance += 1;
                continue;
            }

            debug!(%company, %title, "dismiss triggered");
            report.triggered += 1;
            report.watchers.push(spawn_watcher(
                Arc::clone(&card),
                self.config.confirm_timeout,
                self.config.poll_interval,
            ));
        }

        info!(
            scanned = report.scanned,
            matched = report.matched,
            dismissed = report.triggered,
            already_dismissed = report.already_dismissed,
            missing_affordance = report.missing_affordance,
            "scan complete"
        );
        report
    }

    /// Read both filter lists from the store, scan, and report the count
    /// across the message boundary.
    ///
    /// Returns [`JobsweepError::NotOnTargetSite`] for an off-target page so a
    /// front end can alert the user.
    pub async fn sweep(&self, store: &FilterStore, page: &dyn JobPage) -> Result<ScanReport> {
        if !page.is_target() {
            return Err(JobsweepError::NotOnTargetSite);
        }
        let companies = store.patterns(Category::Companies).await?;
        let titles = store.patterns(Category::Titles).await?;
        let report = self.scan(page, &companies, &titles);

        if report.triggered > 0 {
            if let Some(tx) = &self.report_tx {
                let message = StoreMessage::UpdateDismissedCount {
                    count: report.triggered as u64,
                };
                if let Err(e) = tx.send(message).await {
                    warn!(error = %e, "store message channel closed, count not recorded");
                }
            }
        }
        Ok(report)
    }
}

impl Default for DismissalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
