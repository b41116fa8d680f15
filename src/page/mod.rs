//! Job page abstraction
//!
//! The dismissal engine never talks to a live DOM. It sees a page through the
//! [`JobPage`] and [`JobCard`] traits: a finite snapshot of job cards, each
//! exposing its company text, title text, dismissed-state marker, and the host
//! page's own dismiss affordance. [`SnapshotPage`] is the serde-backed
//! implementation used by the CLI and the test suite.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;

/// Host this system considers the target job site
pub const DEFAULT_TARGET: &str = "linkedin.com";

/// A snapshot view over one rendered job-listing page.
///
/// Cards enumerated by [`cards`](JobPage::cards) form a finite, non-lazy
/// snapshot: entries the host adds later (infinite scroll) are only seen by
/// the next scan.
pub trait JobPage: Send + Sync {
    /// Whether this page belongs to the target job site
    fn is_target(&self) -> bool;

    /// Snapshot of every job card currently present
    fn cards(&self) -> Vec<Arc<dyn JobCard>>;
}

/// One rendered job card.
///
/// Text accessors return `None` when the expected element is absent from the
/// page structure; the scan logs and skips such cards.
pub trait JobCard: Send + Sync {
    /// Trimmed company-name text, if present
    fn company(&self) -> Option<String>;

    /// Trimmed job-title text, if present
    fn title(&self) -> Option<String>;

    /// Whether the card currently carries the dismissed-state marker
    fn is_dismissed(&self) -> bool;

    /// Invoke the host page's dismiss affordance for this card.
    ///
    /// Returns `false` when the affordance is absent. A `true` return means
    /// the trigger was attempted; the dismissed-state marker appears
    /// asynchronously under host control, if at all.
    fn trigger_dismiss(&self) -> bool;
}

fn default_true() -> bool {
    true
}

/// Serialized form of one job card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Company-name text; `None` models a card missing that element
    pub company: Option<String>,
    /// Job-title text; `None` models a card missing that element
    pub title: Option<String>,
    /// Whether the dismissed-state marker is already present
    #[serde(default)]
    pub dismissed: bool,
    /// Whether the card exposes a dismiss affordance
    #[serde(default = "default_true")]
    pub affordance: bool,
    /// Whether a trigger eventually produces the dismissed marker
    #[serde(default = "default_true")]
    pub confirms: bool,
    /// Delay before the marker appears after a trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_delay_ms: Option<u64>,
}

/// Serialized form of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Site identifier (host or URL) the page was captured from
    pub site: String,
    /// Cards present on the page, in document order
    pub cards: Vec<CardSnapshot>,
}

impl PageSnapshot {
    /// Load a snapshot from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write the snapshot to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

/// In-memory [`JobCard`] backed by a [`CardSnapshot`].
///
/// The dismissed marker is an atomic flag so confirmation tasks spawned by a
/// trigger can flip it while the scan's watchers poll it.
#[derive(Debug)]
pub struct SnapshotCard {
    company: Option<String>,
    title: Option<String>,
    /// Shared with delayed-confirmation tasks spawned by a trigger
    dismissed: Arc<AtomicBool>,
    affordance: bool,
    confirms: bool,
    confirm_delay: Duration,
}

impl SnapshotCard {
    fn new(snapshot: &CardSnapshot) -> Self {
        Self {
            company: snapshot.company.clone(),
            title: snapshot.title.clone(),
            dismissed: Arc::new(AtomicBool::new(snapshot.dismissed)),
            affordance: snapshot.affordance,
            confirms: snapshot.confirms,
            confirm_delay: Duration::from_millis(snapshot.confirm_delay_ms.unwrap_or(0)),
        }
    }

    fn to_snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            company: self.company.clone(),
            title: self.title.clone(),
            dismissed: self.is_dismissed(),
            affordance: self.affordance,
            confirms: self.confirms,
            confirm_delay_ms: if self.confirm_delay.is_zero() {
                None
            } else {
                Some(self.confirm_delay.as_millis() as u64)
            },
        }
    }
}

impl JobCard for SnapshotCard {
    fn company(&self) -> Option<String> {
        self.company.as_deref().map(|s| s.trim().to_string())
    }

    fn title(&self) -> Option<String> {
        self.title.as_deref().map(|s| s.trim().to_string())
    }

    fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }

    fn trigger_dismiss(&self) -> bool {
        if !self.affordance {
            return false;
        }
        if !self.confirms {
            // Trigger accepted, marker never appears
            return true;
        }
        if self.confirm_delay.is_zero() {
            self.dismissed.store(true, Ordering::SeqCst);
        } else {
            let delay = self.confirm_delay;
            let flag = self.dismissed.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                flag.store(true, Ordering::SeqCst);
                debug!("dismissed marker appeared");
            });
        }
        true
    }
}

/// In-memory [`JobPage`] backed by a [`PageSnapshot`]
#[derive(Debug)]
pub struct SnapshotPage {
    site: String,
    target: String,
    cards: Vec<Arc<SnapshotCard>>,
}

impl SnapshotPage {
    /// Build a page from a snapshot, targeting [`DEFAULT_TARGET`]
    pub fn new(snapshot: &PageSnapshot) -> Self {
        Self::with_target(snapshot, DEFAULT_TARGET)
    }

    /// Build a page from a snapshot with an explicit target host
    pub fn with_target(snapshot: &PageSnapshot, target: impl Into<String>) -> Self {
        Self {
            site: snapshot.site.clone(),
            target: target.into(),
            cards: snapshot.cards.iter().map(|c| Arc::new(SnapshotCard::new(c))).collect(),
        }
    }

    /// Capture the page's current state back into a snapshot
    pub fn to_snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            site: self.site.clone(),
            cards: self.cards.iter().map(|c| c.to_snapshot()).collect(),
        }
    }
}

impl JobPage for SnapshotPage {
    fn is_target(&self) -> bool {
        self.site.contains(&self.target)
    }

    fn cards(&self) -> Vec<Arc<dyn JobCard>> {
        self.cards
            .iter()
            .map(|c| c.clone() as Arc<dyn JobCard>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(company: &str, title: &str) -> CardSnapshot {
        CardSnapshot {
            company: Some(company.to_string()),
            title: Some(title.to_string()),
            dismissed: false,
            affordance: true,
            confirms: true,
            confirm_delay_ms: None,
        }
    }

    #[test]
    fn test_target_detection() {
        let snapshot = PageSnapshot {
            site: "https://www.linkedin.com/jobs/search".to_string(),
            cards: vec![],
        };
        assert!(SnapshotPage::new(&snapshot).is_target());

        let elsewhere = PageSnapshot {
            site: "https://example.com/careers".to_string(),
            cards: vec![],
        };
        assert!(!SnapshotPage::new(&elsewhere).is_target());
    }

    #[tokio::test]
    async fn test_trigger_sets_marker_immediately_without_delay() {
        let snapshot = PageSnapshot {
            site: "linkedin.com/jobs".to_string(),
            cards: vec![card("Acme Corp", "Engineer")],
        };
        let page = SnapshotPage::new(&snapshot);
        let cards = page.cards();
        assert!(!cards[0].is_dismissed());
        assert!(cards[0].trigger_dismiss());
        assert!(cards[0].is_dismissed());
    }

    #[test]
    fn test_card_text_is_trimmed() {
        let mut c = card("  Acme Corp  ", "\tEngineer\n");
        c.dismissed = true;
        let card = SnapshotCard::new(&c);
        assert_eq!(card.company().as_deref(), Some("Acme Corp"));
        assert_eq!(card.title().as_deref(), Some("Engineer"));
        assert!(card.is_dismissed());
    }

    #[test]
    fn test_missing_affordance_refuses_trigger() {
        let mut c = card("Acme", "Engineer");
        c.affordance = false;
        let card = SnapshotCard::new(&c);
        assert!(!card.trigger_dismiss());
        assert!(!card.is_dismissed());
    }

    #[test]
    fn test_snapshot_roundtrip_captures_dismissed_state() {
        let snapshot = PageSnapshot {
            site: "linkedin.com/jobs".to_string(),
            cards: vec![card("Acme", "Engineer")],
        };
        let page = SnapshotPage::new(&snapshot);
        page.cards()[0].trigger_dismiss();
        let captured = page.to_snapshot();
        assert!(captured.cards[0].dismissed);
    }
}
