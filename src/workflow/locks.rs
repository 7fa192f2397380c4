/*!
 * Per-document locking.
 *
 * Resolving ids and committing them must not interleave for one document,
 * otherwise two marks could hand out the same watermark. Different documents
 * do not share a lock.
 */

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Hands out one async mutex per document name
#[derive(Clone, Default)]
pub struct DocumentLocks {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl DocumentLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a document
    pub async fn lock(&self, document: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody holds or waits on
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks
                .entry(document.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Number of documents with a live lock
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no document is locked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
