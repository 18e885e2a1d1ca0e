use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, OffsetDateTime, Weekday};

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{HealthStatus, SeriesRequest, SeriesSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{Bar, DateWindow, Series, Symbol};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const REFERER: &str = "https://finance.yahoo.com/";

/// Yahoo Finance daily chart adapter.
///
/// Real mode calls the v8 chart endpoint. Synthetic mode (the default, and
/// whenever the transport is a mock) generates deterministic weekday bars
/// seeded by symbol, so offline runs always produce the same store.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn synthetic() -> Self {
        Self::default()
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn is_synthetic(&self) -> bool {
        !self.use_real_api
    }

    async fn fetch_chart(&self, req: &SeriesRequest) -> Result<Series, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "yahoo circuit breaker is open; skipping upstream call",
            ));
        }

        let request = HttpRequest::get(chart_url(&req.symbol, req.window))
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            self.circuit_breaker.record_failure();
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        match response.status {
            200..=299 => self.circuit_breaker.record_success(),
            404 => {
                self.circuit_breaker.record_success();
                tracing::debug!(symbol = %req.symbol, "yahoo has no chart for symbol");
                return Ok(Series::empty(req.symbol.clone()));
            }
            429 => {
                self.circuit_breaker.record_failure();
                return Err(SourceError::rate_limited("yahoo returned status 429"));
            }
            status @ 500..=599 => {
                self.circuit_breaker.record_failure();
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {status}"
                )));
            }
            status => {
                return Err(SourceError::invalid_request(format!(
                    "yahoo returned status {status}"
                )));
            }
        }

        parse_chart(&req.symbol, req.window, &response.body)
    }
}

impl SeriesSource for YahooAdapter {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn daily_series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_chart(&req).await
            } else {
                Ok(synthetic_series(&req.symbol, req.window))
            }
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { self.circuit_breaker.health() })
    }
}

/// Chart URL covering `window`; `period2` is exclusive so it is the day after `end`.
fn chart_url(symbol: &Symbol, window: DateWindow) -> String {
    let period1 = unix_midnight(window.start);
    let period2 = unix_midnight(window.end.next_day().unwrap_or(window.end));
    format!(
        "{CHART_ENDPOINT}/{}?period1={period1}&period2={period2}&interval=1d&includePrePost=false",
        urlencoding::encode(symbol.as_str()),
    )
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn parse_chart(symbol: &Symbol, window: DateWindow, body: &str) -> Result<Series, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Ok(Series::empty(symbol.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Series::empty(symbol.clone()));
    };
    let (Some(timestamps), Some(quote)) = (result.timestamp, result.indicators.quote.first())
    else {
        return Ok(Series::empty(symbol.clone()));
    };
    let gmtoffset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);

    let mut by_date = BTreeMap::new();
    let mut dropped = 0_usize;
    for (index, ts) in timestamps.into_iter().enumerate() {
        let date = OffsetDateTime::from_unix_timestamp(ts.saturating_add(gmtoffset))
            .map_err(|e| SourceError::malformed(format!("invalid chart timestamp {ts}: {e}")))?
            .date();
        if !window.contains(date) {
            continue;
        }

        let ohlc = (
            value_at(&quote.open, index),
            value_at(&quote.high, index),
            value_at(&quote.low, index),
            value_at(&quote.close, index),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = ohlc else {
            dropped += 1;
            continue;
        };
        let volume = value_at(&quote.volume, index)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v.round() as u64);

        match Bar::new(date, open, high, low, close, volume) {
            // later rows for the same calendar date replace earlier ones
            Ok(bar) => {
                by_date.insert(date, bar);
            }
            Err(error) => {
                dropped += 1;
                tracing::debug!(%symbol, %error, "skipping invalid chart row");
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(%symbol, dropped, "dropped incomplete chart rows");
    }

    Series::new(symbol.clone(), by_date.into_values().collect())
        .map_err(|e| SourceError::internal(e.to_string()))
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

/// Deterministic weekday bars for `window`.
///
/// Each bar depends only on the symbol and its own date, so overlapping
/// windows agree on the bars they share.
fn synthetic_series(symbol: &Symbol, window: DateWindow) -> Series {
    let seed = symbol_seed(symbol);
    let base = 20.0 + (seed % 80) as f64;
    let period = 20.0 + (seed % 15) as f64;
    let phase = (seed % 360) as f64 * std::f64::consts::PI / 180.0;

    let mut bars = Vec::new();
    let mut date = window.start;
    while date <= window.end {
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let day = f64::from(date.to_julian_day());
            let close = base * (1.0 + 0.15 * (day / period).sin() + 0.05 * (day / 7.3 + phase).sin());
            let open = close * (1.0 - 0.004 * (day * 1.7 + phase).sin());
            let high = open.max(close) * 1.01;
            let low = open.min(close) * 0.99;
            let volume = 10_000 + seed.wrapping_add(date.to_julian_day() as u64 * 7_919) % 90_000;

            if let Ok(bar) = Bar::new(date, open, high, low, close, volume) {
                bars.push(bar);
            }
        }
        match date.next_day() {
            Some(next) => date = next,
            None => break,
        }
    }

    Series::from_sorted(symbol.clone(), bars)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitBreakerConfig;
    use crate::data_source::{HealthState, SourceErrorKind};
    use crate::http_client::{HttpError, HttpResponse};
    use crate::parse_date;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn returning(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "NG=F", "gmtoffset": -18000},
                "timestamp": [1672756200, 1672801200, 1672929000, 1673015400],
                "indicators": {"quote": [{
                    "open":   [3.0, 3.1, 3.2, 3.4],
                    "high":   [3.2, 3.3, 3.4, 3.6],
                    "low":    [2.9, 3.0, 3.1, 3.3],
                    "close":  [3.1, 3.2, null, 3.5],
                    "volume": [100, 150, 120, null]
                }]}
            }],
            "error": null
        }
    }"#;

    fn january() -> DateWindow {
        DateWindow::new(
            parse_date("2023-01-01").expect("date"),
            parse_date("2023-01-31").expect("date"),
        )
    }

    fn request(symbol: &str, window: DateWindow) -> SeriesRequest {
        SeriesRequest::new(Symbol::parse(symbol).expect("symbol"), window).expect("request")
    }

    #[tokio::test]
    async fn chart_rows_are_normalized_into_daily_bars() {
        let client = RecordingHttpClient::returning(Ok(HttpResponse::ok_json(CHART_BODY)));
        let adapter = YahooAdapter::with_http_client(client.clone());
        assert!(!adapter.is_synthetic());

        let series = adapter
            .daily_series(request("NG=F", january()))
            .await
            .expect("chart parses");

        let dates = series.dates().map(crate::format_date).collect::<Vec<_>>();
        assert_eq!(dates, ["2023-01-03", "2023-01-06"]);
        // duplicate local date: last row wins
        assert_eq!(series.bars()[0].close, 3.2);
        assert_eq!(series.bars()[0].volume, 150);
        // missing volume maps to zero
        assert_eq!(series.bars()[1].volume, 0);

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://query1.finance.yahoo.com/v8/finance/chart/NG%3DF?period1=1672531200&period2=1675209600&interval=1d&includePrePost=false"
        );
        assert_eq!(
            requests[0].headers.get("referer").map(String::as_str),
            Some(REFERER)
        );
    }

    #[tokio::test]
    async fn not_found_is_an_empty_series() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = RecordingHttpClient::returning(Ok(HttpResponse::with_status(404, body)));
        let adapter = YahooAdapter::with_http_client(client);

        let series = adapter
            .daily_series(request("XX=F", january()))
            .await
            .expect("no data is not an error");
        assert!(series.is_empty());

        assert!(parse_chart(&Symbol::parse("XX=F").expect("symbol"), january(), body)
            .expect("not found")
            .is_empty());
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let client = RecordingHttpClient::returning(Ok(HttpResponse::ok_json("<html>")));
        let adapter = YahooAdapter::with_http_client(client);
        let error = adapter
            .daily_series(request("GC=F", january()))
            .await
            .expect_err("not json");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
        assert!(!error.retryable());
    }

    #[tokio::test]
    async fn circuit_opens_after_repeated_server_errors() {
        let client =
            RecordingHttpClient::returning(Ok(HttpResponse::with_status(503, "unavailable")));
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            open_timeout: Duration::from_secs(60),
        }));
        let adapter =
            YahooAdapter::with_http_client(client.clone()).with_circuit_breaker(breaker);

        for _ in 0..2 {
            let error = adapter
                .daily_series(request("CL=F", january()))
                .await
                .expect_err("upstream down");
            assert_eq!(error.kind(), SourceErrorKind::Unavailable);
            assert!(error.retryable());
        }

        let health = adapter.health().await;
        assert_eq!(health.state, HealthState::Unhealthy);

        let error = adapter
            .daily_series(request("CL=F", january()))
            .await
            .expect_err("breaker blocks");
        assert!(error.message().contains("circuit breaker is open"));
        assert_eq!(client.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn synthetic_bars_are_deterministic_weekdays() {
        let adapter = YahooAdapter::synthetic();
        assert!(adapter.is_synthetic());

        let first = adapter
            .daily_series(request("GC=F", january()))
            .await
            .expect("synthetic");
        let second = adapter
            .daily_series(request("GC=F", january()))
            .await
            .expect("synthetic");

        assert_eq!(first, second);
        // January 2023 has 22 weekdays
        assert_eq!(first.len(), 22);
        assert!(first
            .dates()
            .all(|date| !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)));
        assert!(first.dates().all(|date| january().contains(date)));
    }

    #[tokio::test]
    async fn synthetic_bars_agree_across_overlapping_windows() {
        let adapter = YahooAdapter::synthetic();
        let wide = adapter
            .daily_series(request("SI=F", january()))
            .await
            .expect("synthetic");
        let narrow_window = DateWindow::new(
            parse_date("2023-01-09").expect("date"),
            parse_date("2023-01-13").expect("date"),
        );
        let narrow = adapter
            .daily_series(request("SI=F", narrow_window))
            .await
            .expect("synthetic");

        let from_wide = crate::filter_window(&wide, narrow_window);
        assert_eq!(from_wide, narrow);
        assert_eq!(narrow.len(), 5);
    }
}
