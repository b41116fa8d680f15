//! One-shot dismissal confirmation watchers
//!
//! Triggering a card's dismiss affordance does not set the dismissed marker;
//! the host does, asynchronously, if at all. Each triggered card gets one
//! watcher that polls for the marker and stops at the first sighting or when
//! its deadline expires, so watchers can never accumulate past the cards
//! triggered by a single scan.

use crate::page::JobCard;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome of one confirmation watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The dismissed marker appeared before the deadline
    Confirmed,
    /// The deadline expired without the marker appearing
    TimedOut,
}

/// Watch one card for its dismissed marker.
///
/// Polls at `poll_interval` until the marker appears or `deadline` elapses.
pub async fn watch_confirmation(
    card: Arc<dyn JobCard>,
    deadline: Duration,
    poll_interval: Duration,
) -> ConfirmOutcome {
    let watch = async {
        loop {
            if card.is_dismissed() {
                return;
            }
            tokio::time::sleep(poll_interval).await;
        }
    };
    match tokio::time::timeout(deadline, watch).await {
        Ok(()) => {
            debug!("dismissal confirmed");
            ConfirmOutcome::Confirmed
        }
        Err(_) => {
            warn!(?deadline, "dismissal not confirmed before deadline");
            ConfirmOutcome::TimedOut
        }
    }
}

/// Spawn a confirmation watcher for a triggered card
pub fn spawn_watcher(
    card: Arc<dyn JobCard>,
    deadline: Duration,
    poll_interval: Duration,
) -> JoinHandle<ConfirmOutcome> {
    tokio::spawn(watch_confirmation(card, deadline, poll_interval))
}
