use thiserror::Error;

/// Validation and contract errors exposed by `ferrodash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be an ISO-8601 calendar date (YYYY-MM-DD): '{value}'")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,

    #[error("series for {symbol} contains duplicate date {date}")]
    DuplicateDate { symbol: String, date: String },
}

/// Errors raised while building a [`crate::Catalog`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must contain at least one ticker")]
    Empty,
    #[error("catalog display name cannot be empty")]
    EmptyName,
    #[error("symbol '{symbol}' appears more than once in the catalog")]
    DuplicateSymbol { symbol: String },
    #[error("display name '{name}' appears more than once in the catalog")]
    DuplicateName { name: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Recoverable failures of the derived-view builders.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    #[error("filtered series has no bars")]
    InsufficientData,
}

/// Startup configuration failures. These are the only fatal errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {message}")]
    InvalidOverride { key: &'static str, message: String },
    #[error("invalid config field '{field}': {message}")]
    Invalid { field: &'static str, message: String },
    #[error("fallback ticker '{symbol}' is not part of the catalog")]
    FallbackNotInCatalog { symbol: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
