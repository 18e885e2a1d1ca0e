//! Series source contract and request/error types.
//!
//! | Item | Role |
//! |------|------|
//! | [`SeriesSource`] | Adapter contract the fetch collaborator drives |
//! | [`SeriesRequest`] | One ticker over one inclusive date window |
//! | [`SourceError`] | Structured, retry-aware adapter failure |
//! | [`HealthStatus`] | Runtime health snapshot reported by `/healthz` |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateWindow, Series, Symbol};

/// Health state reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    Internal,
}

/// Structured source error. `retryable` drives the fetch retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Daily history request for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    pub window: DateWindow,
}

impl SeriesRequest {
    pub fn new(symbol: Symbol, window: DateWindow) -> Result<Self, SourceError> {
        if window.is_inverted() {
            return Err(SourceError::invalid_request(format!(
                "history window {window} ends before it starts"
            )));
        }
        Ok(Self { symbol, window })
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the fetch collaborator and the web
/// refresh handler share one adapter across tasks.
pub trait SeriesSource: Send + Sync {
    /// Stable identifier used in logs and health output.
    fn id(&self) -> &'static str;

    /// Fetch every daily bar for `req.symbol` inside `req.window`.
    ///
    /// An upstream "no data" answer is an empty series, not an error.
    fn daily_series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>>;

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_date;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::unavailable("x").code(), "source.unavailable");
        assert_eq!(SourceError::rate_limited("x").code(), "source.rate_limited");
        assert_eq!(SourceError::malformed("x").code(), "source.malformed");
        assert!(SourceError::rate_limited("x").retryable());
        assert!(!SourceError::invalid_request("x").retryable());
    }

    #[test]
    fn inverted_window_is_an_invalid_request() {
        let window = DateWindow::new(
            parse_date("2023-02-01").expect("date"),
            parse_date("2023-01-01").expect("date"),
        );
        let error = SeriesRequest::new(Symbol::parse("CL=F").expect("symbol"), window)
            .expect_err("inverted window");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    }
}
