use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::KeyValueStore;
use super::types::StorageError;

/// Writes single-value preferences (such as the theme) through a
/// [`KeyValueStore`].
///
/// Callers take a revision with [`PreferenceWriter::next_revision`] when the
/// value changes, then save asynchronously. A write carrying an older revision
/// than the last one stored for the same key is skipped.
#[derive(Clone)]
pub struct PreferenceWriter {
    store: Arc<dyn KeyValueStore>,
    next: Arc<AtomicU64>,
    last_written: Arc<Mutex<HashMap<&'static str, u64>>>,
}

impl PreferenceWriter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            next: Arc::new(AtomicU64::new(0)),
            last_written: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reserve the revision for a value that was just chosen.
    pub fn next_revision(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Persist `value` under `key` unless a newer revision is already stored.
    ///
    /// Returns `Ok(false)` when the write was skipped as stale.
    pub async fn save(
        &self,
        key: &'static str,
        revision: u64,
        value: &str,
    ) -> Result<bool, StorageError> {
        let mut last = self.last_written.lock().await;
        let previous = last.get(key).copied().unwrap_or(0);
        if revision <= previous {
            tracing::debug!(key, revision, last_written = previous, "Skipping stale preference write");
            return Ok(false);
        }

        self.store.set(key, value).await?;
        last.insert(key, revision);
        tracing::debug!(key, revision, "Preference persisted");
        Ok(true)
    }
}
