//! # Ferrodash Core
//!
//! Data and view pipeline behind the ferrodash commodity dashboard.
//!
//! ## Overview
//!
//! - **Catalog** of display names and futures tickers
//! - **Series store** of daily OHLCV bars, fetched once and shared read-only
//! - **Window filter** and **derived views** (candlestick, volume, correlation
//!   heatmap, summary tiles)
//! - **Reactive controller** turning input events into complete dashboard views
//! - **Fetch collaborator** with a Yahoo chart adapter, retry, circuit breaker,
//!   rate pacing and a TTL cache
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart adapter (live and synthetic) |
//! | [`cache`] | Series TTL cache |
//! | [`catalog`] | Name ↔ ticker catalog |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`config`] | Layered dashboard configuration |
//! | [`controller`] | Signals, bindings and the dispatcher |
//! | [`data_source`] | Source trait, requests and source errors |
//! | [`domain`] | Symbol, Bar, Series, DateWindow |
//! | [`error`] | Core error types |
//! | [`fetch`] | Store population from a source |
//! | [`filter`] | Inclusive date-window filter |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`retry`] | Backoff and retry loop |
//! | [`store`] | Immutable series store |
//! | [`throttling`] | Request pacing |
//! | [`views`] | Chart, heatmap and summary builders |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   fetch_series   ┌──────────────┐
//! │ SeriesSource │─────────────────▶│ SeriesStore  │
//! │ (Yahoo)      │                  │ (Arc, r/o)   │
//! └──────────────┘                  └──────┬───────┘
//!                                          │
//!  InputEvent ┌────────────┐ filter_window │
//! ───────────▶│ Dashboard  │◀──────────────┘
//!             │ dispatch   │────▶ DashboardView
//!             └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ferrodash_core::{fetch_series, Catalog, Dashboard, FetchOptions, SelectionState, YahooAdapter};
//!
//! let catalog = Catalog::commodities();
//! let window = ferrodash_core::DateWindow::parse("2022-01-01", "2023-12-29")?;
//! let store = fetch_series(&YahooAdapter::synthetic(), &catalog, window, &FetchOptions::default()).await;
//! let fallback = catalog.symbols().next().cloned().expect("non-empty");
//! let dashboard = Dashboard::new(Arc::new(catalog), Arc::new(store), fallback)?;
//! let view = dashboard.initial_view(&SelectionState::new(None, window)).view;
//! ```

pub mod adapters;
pub mod cache;
pub mod catalog;
pub mod circuit_breaker;
pub mod config;
pub mod controller;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod http_client;
pub mod retry;
pub mod store;
pub mod throttling;
pub mod views;

pub use adapters::{source_from_config, YahooAdapter};

pub use cache::{CacheMode, SeriesCache};

pub use catalog::{Catalog, CatalogEntry};

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

pub use config::{DashboardConfig, FetchConfig};

pub use controller::{
    affected_bindings, BindingId, Dashboard, DashboardView, Dispatch, InputEvent, SelectionState,
    Signal, ViewWarning,
};

pub use data_source::{
    HealthState, HealthStatus, SeriesRequest, SeriesSource, SourceError, SourceErrorKind,
};

pub use domain::{
    format_date, iso_date, parse_date, today_utc, Bar, DateWindow, Series, Symbol,
};

pub use error::{CatalogError, ConfigError, ValidationError, ViewError};

pub use fetch::{fetch_series, FetchOptions};

pub use filter::filter_window;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

pub use retry::{Backoff, RetryConfig};

pub use store::SeriesStore;

pub use throttling::RequestPacer;

pub use views::{
    build_correlation_heatmap, build_price_chart, build_summary_metrics, build_volume_chart,
    ChartSpec, CorrelationMatrix, Heatmap, SummaryMetrics,
};
