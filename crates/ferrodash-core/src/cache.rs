//! In-memory TTL cache in front of the series source.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{DateWindow, Series, Symbol};

/// How a fetch interacts with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve a fresh entry when present, otherwise fetch and store. (Default)
    #[default]
    Use,
    /// Always fetch, then overwrite the entry.
    Refresh,
    /// Always fetch; never read or write the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

type CacheKey = (Symbol, DateWindow);

#[derive(Debug)]
struct CachedSeries {
    series: Series,
    expires_at: Instant,
}

#[derive(Debug)]
struct Entries {
    map: HashMap<CacheKey, CachedSeries>,
    ttl: Duration,
}

/// Shared series cache keyed by `(symbol, window)`.
///
/// A zero TTL disables the cache: puts are dropped and gets always miss.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    inner: Arc<tokio::sync::RwLock<Entries>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(Entries {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, symbol: &Symbol, window: DateWindow) -> Option<Series> {
        let entries = self.inner.read().await;
        entries
            .map
            .get(&(symbol.clone(), window))
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.series.clone())
    }

    /// Store `series` for `window`, dropping every entry that has already
    /// expired so the map never outgrows the set of live windows.
    pub async fn put(&self, window: DateWindow, series: Series) {
        let mut entries = self.inner.write().await;
        if entries.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        entries.map.retain(|_, entry| entry.expires_at > now);
        let expires_at = now + entries.ttl;
        entries.map.insert(
            (series.symbol().clone(), window),
            CachedSeries { series, expires_at },
        );
    }

    /// Entry count, expired entries included until the next put.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }
}
