//! Cross-boundary messages from the dismissal engine to the store
//!
//! The engine does not mutate the store directly. It reports scan results as
//! messages over a channel, mirroring the message-passing boundary between an
//! injected page script and the popup that owns the storage keys.

use crate::error::Result;
use crate::store::FilterStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Message sent across the engine/store boundary.
///
/// Wire form: `{"action": "updateDismissedCount", "count": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum StoreMessage {
    /// A scan attempted `count` new dismissals
    #[serde(rename_all = "camelCase")]
    UpdateDismissedCount {
        /// Number of dismiss triggers attempted by the scan
        count: u64,
    },
}

impl FilterStore {
    /// Apply one engine message to the store
    pub async fn handle_message(&self, message: StoreMessage) -> Result<()> {
        match message {
            StoreMessage::UpdateDismissedCount { count } => {
                if count > 0 {
                    self.increment_dismissed(count as i64).await?;
                } else {
                    debug!("scan reported no new dismissals");
                }
                Ok(())
            }
        }
    }
}

/// Spawn the store's message loop.
///
/// Returns the sender handed to engine call sites and the loop's join handle.
/// Handler errors are logged and the loop keeps running; it ends when every
/// sender is dropped.
pub fn spawn_message_loop(
    store: Arc<FilterStore>,
    capacity: usize,
) -> (mpsc::Sender<StoreMessage>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<StoreMessage>(capacity);
    let handle = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            debug!(?message, "store message received");
            if let Err(e) = store.handle_message(message).await {
                error!(error = %e, "failed to apply store message");
            }
        }
        debug!("store message loop stopped");
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_wire_format() {
        let message = StoreMessage::UpdateDismissedCount { count: 3 };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "updateDismissedCount", "count": 3})
        );

        let parsed: StoreMessage =
            serde_json::from_value(serde_json::json!({"action": "updateDismissedCount", "count": 7}))
                .unwrap();
        assert_eq!(parsed, StoreMessage::UpdateDismissedCount { count: 7 });
    }

    #[tokio::test]
    async fn test_handle_message_updates_counter() {
        let store = FilterStore::in_memory();
        store
            .handle_message(StoreMessage::UpdateDismissedCount { count: 2 })
            .await
            .unwrap();
        store
            .handle_message(StoreMessage::UpdateDismissedCount { count: 0 })
            .await
            .unwrap();
        assert_eq!(store.dismissed_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_message_loop_applies_messages() {
        let store = Arc::new(FilterStore::in_memory());
        let (tx, handle) = spawn_message_loop(store.clone(), 8);

        tx.send(StoreMessage::UpdateDismissedCount { count: 4 })
            .await
            .unwrap();
        tx.send(StoreMessage::UpdateDismissedCount { count: 1 })
            .await
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(store.dismissed_count().await.unwrap(), 5);
    }
}
