//! Reactive controller.
//!
//! Input signals are wired to bindings through a static dependency table:
//!
//! ```text
//! ticker_click ──▶ ticker_selection ──▶ selected_ticker ─┐
//!                                        start_date ─────┼──▶ view_recompute ──▶ DashboardView
//!                                        end_date ───────┘
//! ```
//!
//! [`Dashboard::dispatch`] applies one [`InputEvent`], propagates changed
//! signals through the table, and runs `view_recompute` at most once after the
//! graph settles, so a renderer only ever sees a complete [`DashboardView`].

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::filter::filter_window;
use crate::views::{
    build_correlation_heatmap, build_price_chart, build_summary_metrics, build_volume_chart,
    ChartSpec, Heatmap, SummaryMetrics,
};
use crate::{iso_date, Catalog, ConfigError, DateWindow, Series, SeriesStore, Symbol, ViewError};

/// Per-session selection. Passed by value into every recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub ticker: Option<Symbol>,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl SelectionState {
    pub fn new(ticker: Option<Symbol>, window: DateWindow) -> Self {
        Self {
            ticker,
            start: window.start,
            end: window.end,
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start, self.end)
    }
}

/// Discrete event delivered by the input signal source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// A ticker selector fired. `symbol` is `None` when the source could not
    /// tell which selector it was.
    TickerSelected {
        #[serde(default)]
        symbol: Option<Symbol>,
    },
    StartDateChanged {
        #[serde(with = "iso_date")]
        date: Date,
    },
    EndDateChanged {
        #[serde(with = "iso_date")]
        date: Date,
    },
}

impl InputEvent {
    pub fn ticker(symbol: Symbol) -> Self {
        Self::TickerSelected {
            symbol: Some(symbol),
        }
    }

    pub const fn signal(&self) -> Signal {
        match self {
            Self::TickerSelected { .. } => Signal::TickerClick,
            Self::StartDateChanged { .. } => Signal::StartDate,
            Self::EndDateChanged { .. } => Signal::EndDate,
        }
    }
}

/// Reactive input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    TickerClick,
    SelectedTicker,
    StartDate,
    EndDate,
}

/// Output-producing recomputation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingId {
    TickerSelection,
    ViewRecompute,
}

const DEPENDENCIES: [(Signal, &[BindingId]); 4] = [
    (Signal::TickerClick, &[BindingId::TickerSelection]),
    (Signal::SelectedTicker, &[BindingId::ViewRecompute]),
    (Signal::StartDate, &[BindingId::ViewRecompute]),
    (Signal::EndDate, &[BindingId::ViewRecompute]),
];

/// Bindings that must rerun when `signal` changes.
pub fn affected_bindings(signal: Signal) -> &'static [BindingId] {
    DEPENDENCIES
        .iter()
        .find(|(candidate, _)| *candidate == signal)
        .map(|(_, bindings)| *bindings)
        .unwrap_or(&[])
}

/// Condition recovered while building a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ViewWarning {
    /// Window holds no bars for the selected ticker; tiles show placeholders.
    InsufficientData,
    /// Requested ticker is unknown; the fallback ticker was rendered instead.
    UnknownTicker { requested: String, fallback: String },
    /// Some ticker pairs share too few dates for a correlation.
    InsufficientOverlap { pairs: usize },
}

/// The four artifacts of one recomputation, emitted as a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub ticker: Symbol,
    pub name: String,
    pub window: DateWindow,
    pub price_chart: ChartSpec,
    pub volume_chart: ChartSpec,
    pub heatmap: Heatmap,
    pub metrics: SummaryMetrics,
    pub warnings: Vec<ViewWarning>,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatch {
    pub state: SelectionState,
    /// Present when `view_recompute` ran.
    pub view: Option<DashboardView>,
    pub bindings: Vec<BindingId>,
}

/// Orchestrates the bindings over an immutable catalog and series store.
#[derive(Debug, Clone)]
pub struct Dashboard {
    catalog: Arc<Catalog>,
    store: Arc<SeriesStore>,
    fallback: Symbol,
}

impl Dashboard {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<SeriesStore>,
        fallback: Symbol,
    ) -> Result<Self, ConfigError> {
        if !catalog.contains(&fallback) {
            return Err(ConfigError::FallbackNotInCatalog {
                symbol: fallback.to_string(),
            });
        }
        Ok(Self {
            catalog,
            store,
            fallback,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn fallback(&self) -> &Symbol {
        &self.fallback
    }

    /// Binding A: resolve the selected ticker after a selector trigger.
    ///
    /// A recognised trigger wins; a missing or unrecognised trigger keeps the
    /// prior selection, and with no prior selection the fallback is used.
    pub fn select_ticker(&self, prior: Option<&Symbol>, trigger: Option<&Symbol>) -> Symbol {
        match trigger {
            Some(symbol) if self.catalog.contains(symbol) => symbol.clone(),
            Some(symbol) => {
                tracing::debug!(%symbol, "ignoring trigger for symbol outside the catalog");
                self.retain(prior)
            }
            None => self.retain(prior),
        }
    }

    fn retain(&self, prior: Option<&Symbol>) -> Symbol {
        prior.cloned().unwrap_or_else(|| self.fallback.clone())
    }

    /// Binding B: derive every artifact for `selection`.
    ///
    /// Never fails. Unknown tickers fall back to the default ticker and an
    /// empty window yields placeholder tiles; both are reported in `warnings`.
    pub fn recompute(&self, selection: &SelectionState) -> DashboardView {
        let window = selection.window();
        let mut warnings = Vec::new();

        let ticker = match &selection.ticker {
            None => self.fallback.clone(),
            Some(symbol) if self.catalog.contains(symbol) && self.store.contains(symbol) => {
                symbol.clone()
            }
            Some(symbol) => {
                tracing::warn!(
                    requested = %symbol,
                    fallback = %self.fallback,
                    "unknown ticker requested; rendering fallback"
                );
                warnings.push(ViewWarning::UnknownTicker {
                    requested: symbol.to_string(),
                    fallback: self.fallback.to_string(),
                });
                self.fallback.clone()
            }
        };

        let filtered = self
            .store
            .get(&ticker)
            .map(|series| filter_window(series, window))
            .unwrap_or_else(|| Series::empty(ticker.clone()));
        let name = self
            .catalog
            .name_for(&ticker)
            .unwrap_or(ticker.as_str())
            .to_owned();

        let price_chart = build_price_chart(&filtered, &name);
        let volume_chart = build_volume_chart(&filtered, &name);
        let heatmap = build_correlation_heatmap(&self.store, &self.catalog, window);
        let metrics = match build_summary_metrics(&filtered) {
            Ok(metrics) => metrics,
            Err(ViewError::InsufficientData) => {
                warnings.push(ViewWarning::InsufficientData);
                SummaryMetrics::placeholder()
            }
        };

        if heatmap.matrix.has_insufficient_overlap() {
            warnings.push(ViewWarning::InsufficientOverlap {
                pairs: heatmap.matrix.insufficient_pairs.len(),
            });
        }

        tracing::debug!(
            %ticker,
            %window,
            bars = filtered.len(),
            warnings = warnings.len(),
            "recomputed dashboard view"
        );

        DashboardView {
            ticker,
            name,
            window,
            price_chart,
            volume_chart,
            heatmap,
            metrics,
            warnings,
        }
    }

    /// Page-load render: resolve the ticker through binding A, then recompute.
    pub fn initial_view(&self, state: &SelectionState) -> Dispatch {
        let mut state = state.clone();
        state.ticker = Some(self.select_ticker(state.ticker.as_ref(), None));
        let view = self.recompute(&state);
        Dispatch {
            state,
            view: Some(view),
            bindings: vec![BindingId::TickerSelection, BindingId::ViewRecompute],
        }
    }

    /// Apply one event and run every binding it affects.
    pub fn dispatch(&self, state: &SelectionState, event: &InputEvent) -> Dispatch {
        let mut next = state.clone();
        let mut pending = VecDeque::new();
        let mut bindings = Vec::new();
        let mut recompute = false;

        let trigger = match event {
            InputEvent::TickerSelected { symbol } => symbol.as_ref(),
            InputEvent::StartDateChanged { date } => {
                next.start = *date;
                None
            }
            InputEvent::EndDateChanged { date } => {
                next.end = *date;
                None
            }
        };
        pending.push_back(event.signal());

        while let Some(signal) = pending.pop_front() {
            for &binding in affected_bindings(signal) {
                bindings.push(binding);
                match binding {
                    BindingId::TickerSelection => {
                        let selected = self.select_ticker(next.ticker.as_ref(), trigger);
                        if next.ticker.as_ref() != Some(&selected) {
                            next.ticker = Some(selected);
                            pending.push_back(Signal::SelectedTicker);
                        }
                    }
                    BindingId::ViewRecompute => recompute = true,
                }
            }
        }

        let view = recompute.then(|| self.recompute(&next));
        bindings.dedup();
        Dispatch {
            state: next,
            view,
            bindings,
        }
    }
}
