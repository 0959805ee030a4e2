use moka::future::Cache;
use std::time::Duration;

/// In-memory hot layer in front of the slot file, keyed by `DD/MM/YYYY`.
///
/// Holds the display lines for a day so repeated reads skip the filesystem.
pub struct MemoryCache {
    inner: Cache<String, Vec<String>>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, date_key: &str) -> Option<Vec<String>> {
        self.inner.get(date_key).await
    }

    pub async fn insert(&self, date_key: String, lines: Vec<String>) {
        self.inner.insert(date_key, lines).await;
    }
}
