//! Test doubles for [`PriceSource`], shared by this crate's tests and by callers.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tarifa_models::price::PriceEntry;
use tarifa_prices::{PriceError, PriceSource};

/// Returns a fixed list of entries and counts how often it was asked.
pub struct CountingSource {
    entries: Vec<PriceEntry>,
    fail: bool,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(entries: Vec<PriceEntry>) -> Self {
        Self {
            entries,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with a network error.
    pub fn failing() -> Self {
        Self {
            entries: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Five ascending entries whose raw prices start at `base` €/MWh.
    pub fn five_cheapest(base: f64) -> Self {
        let entries = (0..5)
            .map(|i| {
                PriceEntry::from_raw(
                    format!("{:02}-{:02}", i + 2, i + 3),
                    Some(base + i as f64),
                )
            })
            .collect();
        Self::new(entries)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch_cheapest(
        &self,
        _date: NaiveDate,
        _zone: &str,
        count: usize,
    ) -> Result<Vec<PriceEntry>, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PriceError::Network("connection refused".to_string()));
        }
        Ok(self.entries.iter().take(count).cloned().collect())
    }
}
