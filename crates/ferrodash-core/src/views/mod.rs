//! Derived-view builders.
//!
//! Pure functions turning a filtered [`crate::Series`] (or the whole store, for
//! the heatmap) into the artifacts the dashboard renders.
//!
//! | Builder | Output |
//! |---------|--------|
//! | [`build_price_chart`] | Candlestick [`ChartSpec`] |
//! | [`build_volume_chart`] | Volume bar [`ChartSpec`] |
//! | [`build_correlation_heatmap`] | [`CorrelationMatrix`] + heatmap [`ChartSpec`] |
//! | [`build_summary_metrics`] | [`SummaryMetrics`] tiles |

pub mod chart;
mod charts;
mod correlation;
mod summary;

pub use chart::{Axis, ChartSpec, Layout, Trace};
pub use charts::{build_price_chart, build_volume_chart};
pub use correlation::{build_correlation_heatmap, CorrelationMatrix, Heatmap};
pub use summary::{build_summary_metrics, trailing_volume, SummaryMetrics, MONTH_BARS, WEEK_BARS};
