use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tarifa_models::config::{CacheConfig, PricesConfig};
use tarifa_models::snapshot::{format_date, DailySnapshot};
use tarifa_prices::PriceSource;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CacheError;
use crate::memory::MemoryCache;
use crate::slot::SlotFile;

/// Result of checking the cache for a given day without fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Display lines: header first, then the ranked entries.
    Hit(Vec<String>),
    Miss(MissReason),
}

/// Why a lookup could not be served from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    Absent,
    Unreadable(String),
    Corrupt(String),
    /// The slot holds another day.
    Stale { stored: String },
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::Absent => write!(f, "slot file absent"),
            MissReason::Unreadable(e) => write!(f, "slot file unreadable: {e}"),
            MissReason::Corrupt(e) => write!(f, "slot file corrupt: {e}"),
            MissReason::Stale { stored } => write!(f, "slot holds {stored}"),
        }
    }
}

/// Today's cheapest prices: moka (hot) → slot file → upstream fetch.
///
/// A stored day is valid only when its `DD/MM/YYYY` key equals the requested
/// day exactly. Anything else, including an unreadable slot, triggers one
/// refresh. Fetch errors are not absorbed and nothing is written on failure.
///
/// Refreshes are serialized within the process; callers that waited on a
/// refresh re-check the slot before fetching again.
pub struct DailyPriceCache {
    slot: SlotFile,
    memory: MemoryCache,
    source: Arc<dyn PriceSource>,
    zone: String,
    count: usize,
    refresh_lock: Mutex<()>,
}

impl DailyPriceCache {
    pub fn new(
        slot: SlotFile,
        source: Arc<dyn PriceSource>,
        zone: impl Into<String>,
        count: usize,
        memory_max_capacity: u64,
        memory_ttl: Duration,
    ) -> Self {
        Self {
            slot,
            memory: MemoryCache::new(memory_max_capacity, memory_ttl),
            source,
            zone: zone.into(),
            count,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_config(
        cache: &CacheConfig,
        prices: &PricesConfig,
        source: Arc<dyn PriceSource>,
    ) -> Self {
        Self::new(
            SlotFile::new(&cache.path),
            source,
            prices.zone.clone(),
            prices.count,
            cache.memory_max_capacity,
            Duration::from_secs(cache.memory_ttl_seconds),
        )
    }

    pub fn slot(&self) -> &SlotFile {
        &self.slot
    }

    /// Check the hot layer, then the slot file. Slot hits are promoted to the hot layer.
    pub async fn lookup(&self, today: NaiveDate) -> CacheLookup {
        let key = format_date(today);

        if let Some(lines) = self.memory.get(&key).await {
            debug!(date = %key, "Daily price cache hit (memory)");
            return CacheLookup::Hit(lines);
        }

        match self.slot.read().await {
            Ok(record) if record.date == key => {
                debug!(date = %key, "Daily price cache hit (slot)");
                let lines = record.display_lines();
                self.memory.insert(key, lines.clone()).await;
                CacheLookup::Hit(lines)
            }
            Ok(record) => CacheLookup::Miss(MissReason::Stale {
                stored: record.date,
            }),
            Err(reason) => CacheLookup::Miss(reason),
        }
    }

    /// Display lines for `today`, refreshing from upstream on a miss.
    pub async fn get(&self, today: NaiveDate) -> Result<Vec<String>, CacheError> {
        if let CacheLookup::Hit(lines) = self.lookup(today).await {
            return Ok(lines);
        }

        let _guard = self.refresh_lock.lock().await;
        match self.lookup(today).await {
            CacheLookup::Hit(lines) => Ok(lines),
            CacheLookup::Miss(reason) => {
                info!(date = %format_date(today), %reason, "Daily price cache miss, refreshing");
                self.refresh(today).await
            }
        }
    }

    /// Fetch from upstream and overwrite the slot, regardless of what it holds.
    pub async fn refresh(&self, today: NaiveDate) -> Result<Vec<String>, CacheError> {
        let entries = self
            .source
            .fetch_cheapest(today, &self.zone, self.count)
            .await?;
        self.store(&DailySnapshot::new(today, entries)).await
    }

    /// Persist `snapshot` as the single slot and return its display lines.
    pub async fn store(&self, snapshot: &DailySnapshot) -> Result<Vec<String>, CacheError> {
        let record = snapshot.to_record();
        self.slot.write(&record).await?;

        let lines = record.display_lines();
        self.memory.insert(record.date.clone(), lines.clone()).await;
        info!(
            date = %record.date,
            entries = record.lines.len(),
            source = self.source.name(),
            "Stored daily prices"
        );
        Ok(lines)
    }
}
