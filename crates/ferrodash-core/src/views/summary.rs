use serde::Serialize;

use crate::{Series, ViewError};

/// Bars preceding the last bar that make up the "last week" volume.
pub const WEEK_BARS: usize = 4;
/// Bars preceding the last bar that make up the "last month" volume.
pub const MONTH_BARS: usize = 19;

const PLACEHOLDER: &str = "n/a";

/// The four summary tiles, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub current_price: String,
    pub today_volume: String,
    pub week_volume: String,
    pub month_volume: String,
}

impl SummaryMetrics {
    /// Tiles shown when the window holds no bars.
    pub fn placeholder() -> Self {
        Self {
            current_price: String::from(PLACEHOLDER),
            today_volume: String::from(PLACEHOLDER),
            week_volume: String::from(PLACEHOLDER),
            month_volume: String::from(PLACEHOLDER),
        }
    }
}

/// Summarize the filtered series.
///
/// Week and month volumes are trailing sums over a fixed number of bars
/// before the last one (4 and 19), not calendar spans. Short series sum
/// whatever bars exist.
pub fn build_summary_metrics(series: &Series) -> Result<SummaryMetrics, ViewError> {
    let bars = series.bars();
    let last = bars.last().ok_or(ViewError::InsufficientData)?;

    Ok(SummaryMetrics {
        current_price: format!("{:.4}", last.close),
        today_volume: format!("{:.2}", last.volume as f64),
        week_volume: format!("{:.2}", trailing_volume(series, WEEK_BARS) as f64),
        month_volume: format!("{:.2}", trailing_volume(series, MONTH_BARS) as f64),
    })
}

/// Sum of volume over up to `count` bars immediately before the last bar.
pub fn trailing_volume(series: &Series, count: usize) -> u64 {
    let bars = series.bars();
    let Some(last_index) = bars.len().checked_sub(1) else {
        return 0;
    };
    let start = last_index.saturating_sub(count);
    bars[start..last_index]
        .iter()
        .fold(0_u64, |acc, bar| acc.saturating_add(bar.volume))
}
