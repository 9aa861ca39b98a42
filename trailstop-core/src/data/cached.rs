//! Time-to-live response cache in front of any provider.
//!
//! Dashboards refresh the same (symbol, interval) pairs over and over; within
//! the TTL a repeat request is answered from memory. Faults are never cached.

use super::provider::{CandleProvider, DataError};
use crate::domain::{CandleSeries, Interval};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default freshness window for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

type CacheKey = (String, Interval, usize);

pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, CandleSeries)>>,
}

impl<P: CandleProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held (fresh or stale).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, (Instant, CandleSeries)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lookup(&self, key: &CacheKey) -> Option<CandleSeries> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((stored_at, series)) if stored_at.elapsed() < self.ttl => Some(series.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl<P: CandleProvider> CandleProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        let key = (symbol.to_string(), interval, limit);
        if let Some(series) = self.lookup(&key) {
            tracing::trace!(%symbol, %interval, "cache hit");
            return Ok(series);
        }

        // The lock is not held across the fetch; two racing misses both fetch
        // and the later insert wins.
        let series = self.inner.fetch(symbol, interval, limit)?;
        self.lock().insert(key, (Instant::now(), series.clone()));
        Ok(series)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
