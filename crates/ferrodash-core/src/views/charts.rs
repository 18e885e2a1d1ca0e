use crate::views::chart::{Axis, ChartSpec, Layout, Marker, Trace};
use crate::{format_date, Series};

const VOLUME_COLOR: &str = "rgba(0, 0, 255, 1)";

/// Candlestick chart of the filtered series, one candle per bar in date order.
pub fn build_price_chart(series: &Series, name: &str) -> ChartSpec {
    let bars = series.bars();
    let trace = Trace::Candlestick {
        name: String::from("Candlestick"),
        x: bars.iter().map(|bar| format_date(bar.date)).collect(),
        open: bars.iter().map(|bar| bar.open).collect(),
        high: bars.iter().map(|bar| bar.high).collect(),
        low: bars.iter().map(|bar| bar.low).collect(),
        close: bars.iter().map(|bar| bar.close).collect(),
    };

    ChartSpec {
        data: vec![trace],
        layout: Layout::centered(
            format!("Price: {name}"),
            Axis::date("Date"),
            Axis::plain("Price"),
        ),
    }
}

/// Daily volume bars of the filtered series.
pub fn build_volume_chart(series: &Series, name: &str) -> ChartSpec {
    let bars = series.bars();
    let trace = Trace::Bar {
        name: String::from("Volume"),
        x: bars.iter().map(|bar| format_date(bar.date)).collect(),
        y: bars.iter().map(|bar| bar.volume).collect(),
        marker: Marker {
            color: String::from(VOLUME_COLOR),
        },
    };

    ChartSpec {
        data: vec![trace],
        layout: Layout::centered(
            format!("Volume: {name}"),
            Axis::date("Date"),
            Axis::plain("Volume"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bar, Symbol};
    use time::{Date, Month};

    fn sample() -> Series {
        let bars = (1..=3)
            .map(|d| {
                let date = Date::from_calendar_date(2023, Month::May, d).expect("date");
                let base = f64::from(d);
                Bar::new(date, base, base + 1.0, base - 0.5, base + 0.5, u64::from(d) * 10)
                    .expect("bar")
            })
            .collect();
        Series::new(Symbol::parse("SI=F").expect("symbol"), bars).expect("series")
    }

    #[test]
    fn price_chart_keeps_chronological_ohlc() {
        let chart = build_price_chart(&sample(), "Silver");
        assert_eq!(chart.title(), "Price: Silver");

        match &chart.data[0] {
            Trace::Candlestick { x, open, close, .. } => {
                assert_eq!(x, &["2023-05-01", "2023-05-02", "2023-05-03"]);
                assert_eq!(open, &[1.0, 2.0, 3.0]);
                assert_eq!(close, &[1.5, 2.5, 3.5]);
            }
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn volume_chart_plots_one_bar_per_day() {
        let chart = build_volume_chart(&sample(), "Silver");
        assert_eq!(chart.title(), "Volume: Silver");
        assert_eq!(chart.layout.yaxis.title.text, "Volume");

        match &chart.data[0] {
            Trace::Bar { y, .. } => assert_eq!(y, &[10, 20, 30]),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn empty_series_yields_empty_traces() {
        let empty = Series::empty(Symbol::parse("SI=F").expect("symbol"));
        assert!(build_price_chart(&empty, "Silver").data[0].is_empty());
        assert!(build_volume_chart(&empty, "Silver").data[0].is_empty());
    }
}
