//! Filter-matching and dismissal-tracking engine for job-listing pages
//!
//! A user keeps two lists of filter patterns — company names and job titles,
//! each either a case-insensitive literal or a `/regex/flags` string. The
//! engine scans a snapshot of rendered job cards, triggers the host page's
//! own dismiss affordance for every new match, and tracks a cumulative
//! dismissed counter in a key-value store.
//!
//! # Example
//!
//! ```no_run
//! use jobsweep::{Category, JobsweepBuilder};
//! use jobsweep::page::{PageSnapshot, SnapshotPage};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let sweep = JobsweepBuilder::new().build().await?;
//! sweep.store().add_patterns(Category::Companies, "Acme, Globex").await?;
//!
//! let snapshot = PageSnapshot::load("page.json").await?;
//! let page = SnapshotPage::new(&snapshot);
//!
//! let report = sweep.sweep(&page).await?;
//! tracing::info!("dismissed {} jobs", report.dismissed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

// Re-export commonly used items
pub use engine::{ConfirmOutcome, DismissalEngine, EngineConfig, ScanReport};
pub use error::{JobsweepError, Result};
pub use pattern::{compile_pattern, compile_patterns, Matchers, TextMatcher};
pub use store::{Category, FilterStore, StoreEvent, StoreMessage};

/// Error types
pub mod error;

/// Filter pattern parsing and matching
pub mod pattern;

/// Persistent filter lists and dismissal bookkeeping
pub mod store;

/// Job page abstraction and snapshot implementation
pub mod page;

/// The dismissal scan engine
pub mod engine;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::{spawn_message_loop, JsonFileBackend, KeyValueBackend, MemoryBackend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber with default settings
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Builder wiring the store, message loop, and engine together
#[derive(Debug, Clone)]
pub struct JobsweepBuilder {
    /// JSON store file; `None` keeps state in memory
    pub store_path: Option<PathBuf>,
    /// Deadline for each dismissal confirmation watcher
    pub confirm_timeout: Duration,
    /// Poll interval for confirmation watchers
    pub poll_interval: Duration,
    /// Capacity of the engine-to-store message channel
    pub channel_capacity: usize,
}

impl Default for JobsweepBuilder {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            store_path: None,
            confirm_timeout: config.confirm_timeout,
            poll_interval: config.poll_interval,
            channel_capacity: 16,
        }
    }
}

impl JobsweepBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist state to a JSON file at `path`
    pub fn store_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Set the confirmation watcher deadline
    pub fn confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Set the confirmation watcher poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the message channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Build the wired [`Jobsweep`] handle
    pub async fn build(self) -> Result<Jobsweep> {
        let backend: Arc<dyn KeyValueBackend> = match &self.store_path {
            Some(path) => Arc::new(JsonFileBackend::open(path).await?),
            None => Arc::new(MemoryBackend::new()),
        };
        let store = Arc::new(FilterStore::new(backend));
        // First-run marker, recorded once
        store.install_date().await?;

        let (report_tx, _loop_handle) = spawn_message_loop(store.clone(), self.channel_capacity);
        let engine = DismissalEngine::new(EngineConfig {
            confirm_timeout: self.confirm_timeout,
            poll_interval: self.poll_interval,
        })
        .with_report_channel(report_tx);

        Ok(Jobsweep { store, engine })
    }
}

/// Wired store + engine pair, the crate's top-level handle
#[derive(Debug)]
pub struct Jobsweep {
    store: Arc<FilterStore>,
    engine: DismissalEngine,
}

impl Jobsweep {
    /// The filter store
    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    /// The dismissal engine
    pub fn engine(&self) -> &DismissalEngine {
        &self.engine
    }

    /// Run one sweep: read both filter lists, scan the page, and report the
    /// dismissed count across the message boundary.
    pub async fn sweep(&self, page: &dyn page::JobPage) -> Result<ScanReport> {
        self.engine.sweep(&self.store, page).await
    }
}
