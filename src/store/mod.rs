//! Filter store: persisted pattern lists and dismissal bookkeeping
//!
//! The store owns everything that survives a session: the two filter lists,
//! the cumulative dismissed-job counter, and the install-date marker. All
//! state lives in a flat key namespace behind a [`KeyValueBackend`], and every
//! read-modify-write sequence is serialized through one internal lock so no
//! caller ever observes a partially written list and concurrent counter
//! increments cannot lose updates.

use crate::error::{JobsweepError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod backend;
pub mod message;

pub use backend::{JsonFileBackend, KeyValueBackend, MemoryBackend};
pub use message::{spawn_message_loop, StoreMessage};

/// Storage key for the company filter list
pub const KEY_COMPANIES: &str = "companies";
/// Storage key for the title filter list
pub const KEY_TITLES: &str = "titles";
/// Storage key for the cumulative dismissed counter
pub const KEY_DISMISSED: &str = "dismissed";
/// Storage key for the first-run marker
pub const KEY_INSTALL_DATE: &str = "installDate";

/// Capacity of the store's change-notification channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The two filter list categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Company-name filters
    Companies,
    /// Job-title filters
    Titles,
}

impl Category {
    /// The flat storage key this category's list is persisted under
    pub fn storage_key(self) -> &'static str {
        match self {
            Category::Companies => KEY_COMPANIES,
            Category::Titles => KEY_TITLES,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for Category {
    type Err = JobsweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "companies" => Ok(Category::Companies),
            "titles" => Ok(Category::Titles),
            other => Err(JobsweepError::InvalidArgument(format!(
                "unknown category '{}', expected 'companies' or 'titles'",
                other
            ))),
        }
    }
}

/// Change notification broadcast after every successful store mutation
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A filter list changed; carries the full updated list
    FiltersUpdated {
        /// Which list changed
        category: Category,
        /// The list as persisted
        patterns: Vec<String>,
    },
    /// Both filter lists were reset to empty
    FiltersCleared,
    /// The dismissed counter changed
    DismissedCount {
        /// New cumulative total
        total: u64,
    },
}

/// Persistent store for filter lists and dismissal bookkeeping
pub struct FilterStore {
    backend: Arc<dyn KeyValueBackend>,
    /// Serializes read-modify-write sequences across callers
    write_lock: Mutex<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore").finish_non_exhaustive()
    }
}

impl FilterStore {
    /// Create a store over the given backend
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            write_lock: Mutex::new(()),
            events,
        }
    }

    /// Create a store over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is the normal case when no observer UI is open
        let _ = self.events.send(event);
    }

    async fn read_patterns(&self, category: Category) -> Result<Vec<String>> {
        match self.backend.get(category.storage_key()).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_patterns(&self, category: Category, patterns: &[String]) -> Result<()> {
        self.backend
            .set(category.storage_key(), json!(patterns))
            .await?;
        self.notify(StoreEvent::FiltersUpdated {
            category,
            patterns: patterns.to_vec(),
        });
        Ok(())
    }

    /// Current patterns for a category; an absent key yields an empty list
    pub async fn patterns(&self, category: Category) -> Result<Vec<String>> {
        self.read_patterns(category).await
    }

    /// Replace a category's list wholesale
    pub async fn set_patterns(&self, category: Category, patterns: Vec<String>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_patterns(category, &patterns).await
    }

    /// Parse raw user input and union the resulting patterns into a list.
    ///
    /// Input is split on commas and semicolons; segments are trimmed, empty
    /// segments dropped, and duplicates (against the stored list and within
    /// the input) discarded while preserving first-occurrence order. Returns
    /// the updated list.
    pub async fn add_patterns(&self, category: Category, raw_input: &str) -> Result<Vec<String>> {
        let incoming = split_raw_input(raw_input);
        let _guard = self.write_lock.lock().await;
        let mut patterns = self.read_patterns(category).await?;
        let before = patterns.len();
        for pattern in incoming {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
        if patterns.len() != before {
            self.write_patterns(category, &patterns).await?;
            debug!(%category, added = patterns.len() - before, "filter patterns added");
        }
        Ok(patterns)
    }

    /// Remove one exact-string match from a list.
    ///
    /// Silent no-op when the pattern is absent. Returns the updated list.
    pub async fn remove_pattern(&self, category: Category, pattern: &str) -> Result<Vec<String>> {
        let _guard = self.write_lock.lock().await;
        let mut patterns = self.read_patterns(category).await?;
        if let Some(pos) = patterns.iter().position(|p| p == pattern) {
            patterns.remove(pos);
            self.write_patterns(category, &patterns).await?;
            debug!(%category, %pattern, "filter pattern removed");
        }
        Ok(patterns)
    }

    /// Reset both filter lists to empty.
    ///
    /// The dismissed counter and install date are deliberately left alone.
    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend.set(KEY_COMPANIES, json!([])).await?;
        self.backend.set(KEY_TITLES, json!([])).await?;
        self.notify(StoreEvent::FiltersCleared);
        info!("all filter lists cleared");
        Ok(())
    }

    /// Current cumulative dismissed count, defaulting to 0 when unset
    pub async fn dismissed_count(&self) -> Result<u64> {
        match self.backend.get(KEY_DISMISSED).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(0),
        }
    }

    /// Add `n` newly dismissed jobs to the counter and return the new total.
    ///
    /// A non-positive `n` is rejected as an invalid argument: logged, no-op,
    /// and the current total is returned unchanged.
    pub async fn increment_dismissed(&self, n: i64) -> Result<u64> {
        if n <= 0 {
            warn!(n, "ignoring non-positive dismissed-count increment");
            return self.dismissed_count().await;
        }
        let _guard = self.write_lock.lock().await;
        let total = self.dismissed_count().await? + n as u64;
        self.backend.set(KEY_DISMISSED, json!(total)).await?;
        self.notify(StoreEvent::DismissedCount { total });
        debug!(added = n, total, "dismissed counter updated");
        Ok(total)
    }

    /// The install-date marker, generated and persisted once on first call
    pub async fn install_date(&self) -> Result<DateTime<Utc>> {
        let _guard = self.write_lock.lock().await;
        if let Some(value) = self.backend.get(KEY_INSTALL_DATE).await? {
            let raw: String = serde_json::from_value(value)?;
            return DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| JobsweepError::Storage(format!("bad install date '{}': {}", raw, e)));
        }
        let now = Utc::now();
        self.backend
            .set(KEY_INSTALL_DATE, json!(now.to_rfc3339()))
            .await?;
        info!(%now, "install date recorded");
        Ok(now)
    }
}

/// Split raw user input into candidate pattern strings.
///
/// Splits on `,` and `;`, trims each segment, and drops empties. Duplicate
/// handling happens at insert time, not here.
pub fn split_raw_input(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
