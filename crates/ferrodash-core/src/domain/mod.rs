//! # Domain Models
//!
//! Canonical domain types for the commodity dashboard.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bar`] | One trading day's OHLCV record |
//! | [`Series`] | Chronological bars for one ticker |
//! | [`Symbol`] | Validated ticker symbol (`NG=F`, `GC=F`, ...) |
//! | [`DateWindow`] | Inclusive calendar date range |
//!
//! ## Validation
//!
//! Bars and series enforce their invariants at construction time:
//!
//! ```rust,ignore
//! use ferrodash_core::{Bar, Series, Symbol, ValidationError};
//!
//! let bar = Bar::new(date, 100.0, 105.0, 95.0, 102.0, 1_000)?;
//!
//! // high < low is rejected
//! let invalid = Bar::new(date, 100.0, 95.0, 105.0, 102.0, 1_000);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod date;
mod models;
mod symbol;

pub use date::{format_date, iso_date, parse_date, today_utc, DateWindow};
pub use models::{Bar, Series};
pub use symbol::Symbol;
