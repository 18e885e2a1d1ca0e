//! Data fetch collaborator: fills a [`SeriesStore`] from a [`SeriesSource`].

use std::time::Instant;

use crate::cache::{CacheMode, SeriesCache};
use crate::config::FetchConfig;
use crate::data_source::{SeriesRequest, SeriesSource, SourceError};
use crate::retry::RetryConfig;
use crate::throttling::RequestPacer;
use crate::{Catalog, DateWindow, Series, SeriesStore, Symbol};

/// Knobs for one fetch pass.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub retry: RetryConfig,
    pub pacer: Option<RequestPacer>,
    pub cache: SeriesCache,
    pub cache_mode: CacheMode,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            pacer: None,
            cache: SeriesCache::disabled(),
            cache_mode: CacheMode::Use,
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            retry: RetryConfig::exponential(config.max_retries),
            // offline data is not paced
            pacer: (!config.synthetic).then(|| RequestPacer::per_minute(config.requests_per_minute)),
            cache: SeriesCache::new(config.cache_ttl()),
            cache_mode: CacheMode::Use,
        }
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }
}

/// Fetch one series per catalog ticker over `window`.
///
/// Never fails: a ticker whose fetch still errors after retries becomes an
/// empty series, which every view treats as a gap.
pub async fn fetch_series(
    source: &dyn SeriesSource,
    catalog: &Catalog,
    window: DateWindow,
    options: &FetchOptions,
) -> SeriesStore {
    let started = Instant::now();
    let mut fetched = Vec::with_capacity(catalog.len());
    let mut gaps = 0_usize;

    for entry in catalog.entries() {
        let series = match fetch_one(source, &entry.symbol, window, options).await {
            Ok(series) => series,
            Err(error) => {
                tracing::warn!(
                    source = source.id(),
                    symbol = %entry.symbol,
                    code = error.code(),
                    %error,
                    "fetch failed; using empty series"
                );
                Series::empty(entry.symbol.clone())
            }
        };
        if series.is_empty() {
            gaps += 1;
        }
        fetched.push(series);
    }

    let store = SeriesStore::new(fetched).with_fetched_window(window);
    tracing::info!(
        source = source.id(),
        %window,
        tickers = store.len(),
        bars = store.bar_count(),
        gaps,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "series store ready"
    );
    store
}

async fn fetch_one(
    source: &dyn SeriesSource,
    symbol: &Symbol,
    window: DateWindow,
    options: &FetchOptions,
) -> Result<Series, SourceError> {
    if options.cache_mode.reads() {
        if let Some(hit) = options.cache.get(symbol, window).await {
            tracing::debug!(%symbol, "series cache hit");
            return Ok(hit);
        }
    }

    let request = SeriesRequest::new(symbol.clone(), window)?;
    let series = options
        .retry
        .run(symbol.as_str(), |_| {
            let request = request.clone();
            async move {
                if let Some(pacer) = &options.pacer {
                    pacer.acquire().await;
                }
                source.daily_series(request).await
            }
        })
        .await?;

    if options.cache_mode.writes() {
        options.cache.put(window, series.clone()).await;
    }
    Ok(series)
}
