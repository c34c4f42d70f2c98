use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::models::JobId;

/// Owns the id counter and the digests of completed jobs.
///
/// Only completed jobs have an entry. A missing id may be unknown, still
/// pending, or aborted; callers cannot tell these apart.
pub struct JobRegistry {
    next_id: AtomicU64,
    digests: RwLock<HashMap<JobId, String>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Start the counter at `offset`; the first allocated id is `offset + 1`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            next_id: AtomicU64::new(offset),
            digests: RwLock::new(HashMap::new()),
        }
    }

    /// Hand out a fresh id, or None once the id space is exhausted.
    pub fn allocate(&self) -> Option<JobId> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }

    /// Store the digest for `id`. Returns false, leaving the first value in
    /// place, if the id already completed.
    pub async fn complete(&self, id: JobId, digest: String) -> bool {
        let mut digests = self.digests.write().await;
        if digests.contains_key(&id) {
            tracing::warn!("Job {} already has a digest, ignoring second write", id);
            return false;
        }
        digests.insert(id, digest);
        true
    }

    pub async fn lookup(&self, id: JobId) -> Option<String> {
        self.digests.read().await.get(&id).cloned()
    }

    /// Number of completed jobs.
    pub async fn completed_count(&self) -> usize {
        self.digests.read().await.len()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
