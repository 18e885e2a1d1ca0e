//! Immutable in-memory store of per-ticker daily series.

use std::collections::HashMap;

use crate::{DateWindow, Series, Symbol};

/// Read-only mapping from ticker to its fetched series.
///
/// Built once (by [`crate::fetch::fetch_series`] or directly in tests) and then
/// shared behind an `Arc`; it is never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: HashMap<Symbol, Series>,
    fetched_window: Option<DateWindow>,
}

impl SeriesStore {
    pub fn new(series: impl IntoIterator<Item = Series>) -> Self {
        let series = series
            .into_iter()
            .map(|series| (series.symbol().clone(), series))
            .collect();
        Self {
            series,
            fetched_window: None,
        }
    }

    pub fn with_fetched_window(mut self, window: DateWindow) -> Self {
        self.fetched_window = Some(window);
        self
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Series> {
        self.series.get(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.series.keys()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Window the store was fetched for, if known.
    pub fn fetched_window(&self) -> Option<DateWindow> {
        self.fetched_window
    }

    /// Total number of bars across all tickers.
    pub fn bar_count(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }
}
