use crate::{DateWindow, Series};

/// Select the contiguous run of bars whose date lies in `window` (both bounds inclusive).
///
/// Relies on the series being sorted ascending by date. An inverted window or a
/// window outside the series yields an empty series.
pub fn filter_window(series: &Series, window: DateWindow) -> Series {
    let bars = series.bars();
    let lo = bars.partition_point(|bar| bar.date < window.start);
    let hi = bars.partition_point(|bar| bar.date <= window.end);
    let selected = if lo < hi { bars[lo..hi].to_vec() } else { Vec::new() };
    Series::from_sorted(series.symbol().clone(), selected)
}
