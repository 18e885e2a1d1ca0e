use serde::{Deserialize, Serialize};
use time::Date;

use super::date::{format_date, iso_date};
use crate::{Symbol, ValidationError};

/// One trading day's OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Chronological daily bars for one ticker. Dates are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: Symbol,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, sorting by date and rejecting duplicate dates.
    pub fn new(symbol: Symbol, mut bars: Vec<Bar>) -> Result<Self, ValidationError> {
        bars.sort_by_key(|bar| bar.date);
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValidationError::DuplicateDate {
                symbol: symbol.to_string(),
                date: format_date(pair[1].date),
            });
        }
        Ok(Self { symbol, bars })
    }

    /// Series with no bars, used for tickers without data in the fetched window.
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    /// Wrap bars already known to be sorted with unique dates.
    pub(crate) fn from_sorted(symbol: Symbol, bars: Vec<Bar>) -> Self {
        debug_assert!(bars.windows(2).all(|pair| pair[0].date < pair[1].date));
        Self { symbol, bars }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.bars.iter().map(|bar| bar.date)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn day(d: u8) -> Date {
        Date::from_calendar_date(2024, Month::January, d).expect("valid date")
    }

    fn bar(d: u8) -> Bar {
        Bar::new(day(d), 10.0, 11.0, 9.0, 10.5, 100).expect("valid bar")
    }

    #[test]
    fn rejects_inverted_bar_range() {
        let err = Bar::new(day(2), 10.0, 9.0, 12.0, 10.0, 10).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarRange));
    }

    #[test]
    fn rejects_non_finite_prices() {
        let err = Bar::new(day(2), f64::NAN, 11.0, 9.0, 10.0, 10).expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NonFiniteValue { field: "open" }
        ));
    }

    #[test]
    fn series_sorts_bars_by_date() {
        let symbol = Symbol::parse("GC=F").expect("symbol");
        let series = Series::new(symbol, vec![bar(4), bar(2), bar(3)]).expect("series");
        let days = series.dates().map(|date| date.day()).collect::<Vec<_>>();
        assert_eq!(days, vec![2, 3, 4]);
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let symbol = Symbol::parse("GC=F").expect("symbol");
        let err = Series::new(symbol, vec![bar(2), bar(2)]).expect_err("must fail");
        assert!(matches!(err, ValidationError::DuplicateDate { .. }));
    }
}
