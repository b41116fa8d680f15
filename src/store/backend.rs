//! Key-value persistence backends
//!
//! The filter store is written against a small async key-value trait so the
//! same store logic runs over an in-memory map in tests and a JSON document
//! on disk in the binary. Keys live in a flat namespace.

use crate::error::{JobsweepError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Async key-value persistence used by the filter store
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Fetch the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Volatile in-memory backend, the default for tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store holding the whole namespace as one JSON object.
///
/// Every mutation rewrites the document, which is fine at the scale of a few
/// short filter lists and two scalars. A missing file reads as an empty store.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: RwLock<HashMap<String, Value>>,
}

impl JsonFileBackend {
    /// Open (or create) a JSON-backed store at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<HashMap<String, Value>>(&bytes)
                .map_err(|e| JobsweepError::Storage(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file absent, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn flush(&self) -> Result<()> {
        let bytes = {
            let entries = self.entries.read();
            serde_json::to_vec_pretty(&*entries)?
        };
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        self.flush().await
    }
}
