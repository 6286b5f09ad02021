//! Completed-result cache keyed by exact URL string.
//!
//! Short-circuits duplicate submissions: a hit completes the new job
//! immediately without scheduling any pipeline work. Entries are written
//! only after the corresponding history record has landed.

use std::time::Duration;

use moka::future::Cache;

use crate::domains::analysis::models::HistoryRecord;

pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

pub struct ResultCache {
    entries: Cache<String, HistoryRecord>,
}

impl ResultCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    pub async fn get(&self, url: &str) -> Option<HistoryRecord> {
        self.entries.get(url).await
    }

    pub async fn insert(&self, url: String, record: HistoryRecord) {
        self.entries.insert(url, record).await;
    }
}
