use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Iso8601;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// A trailing time component (`2022-01-01T00:00:00`) is tolerated and ignored,
/// since date pickers commonly emit one on first render.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    Date::parse(date_part, &Iso8601::DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(CALENDAR_DATE).expect("calendar date components are always formattable")
}

/// Current UTC calendar date.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Serde adapter for `time::Date` as a `YYYY-MM-DD` string.
pub mod iso_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }
}

/// Inclusive `[start, end]` calendar window.
///
/// The window is not validated: an inverted window is
/// representable and simply selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl DateWindow {
    pub const fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Clamp both bounds into `[floor, ceiling]`.
    pub fn clamp_to(&self, floor: Date, ceiling: Date) -> Self {
        Self::new(
            self.start.max(floor).min(ceiling),
            self.end.max(floor).min(ceiling),
        )
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", format_date(self.start), format_date(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn date(y: i32, m: Month, d: u8) -> Date {
        Date::from_calendar_date(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_plain_and_timestamped_dates() {
        assert_eq!(
            parse_date("2022-01-01").expect("plain"),
            date(2022, Month::January, 1)
        );
        assert_eq!(
            parse_date("2023-06-30T00:00:00").expect("with time"),
            date(2023, Month::June, 30)
        );
        assert!(matches!(
            parse_date("30/06/2023"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_date(date(2022, Month::March, 7)), "2022-03-07");
        assert_eq!(format_date(date(999, Month::December, 31)), "0999-12-31");
    }

    #[test]
    fn formatted_dates_parse_back() {
        let day = date(2024, Month::February, 29);
        assert_eq!(parse_date(&format_date(day)).expect("round trip"), day);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow::new(date(2022, Month::January, 3), date(2022, Month::January, 5));
        assert!(window.contains(date(2022, Month::January, 3)));
        assert!(window.contains(date(2022, Month::January, 5)));
        assert!(!window.contains(date(2022, Month::January, 6)));
        assert!(!window.is_inverted());
    }

    #[test]
    fn window_serializes_as_iso_strings() {
        let window = DateWindow::new(date(2022, Month::January, 1), date(2022, Month::February, 1));
        let json = serde_json::to_string(&window).expect("serialize");
        assert_eq!(json, r#"{"start":"2022-01-01","end":"2022-02-01"}"#);
        let back: DateWindow = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, window);
    }

    #[test]
    fn clamps_into_bounds() {
        let floor = date(2022, Month::January, 1);
        let ceiling = date(2022, Month::December, 31);
        let window = DateWindow::new(date(2021, Month::May, 1), date(2024, Month::May, 1));
        let clamped = window.clamp_to(floor, ceiling);
        assert_eq!(clamped, DateWindow::new(floor, ceiling));
    }
}
