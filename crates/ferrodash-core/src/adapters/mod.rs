mod yahoo;

use std::sync::Arc;

pub use yahoo::YahooAdapter;

use crate::config::FetchConfig;
use crate::data_source::SeriesSource;
use crate::http_client::ReqwestHttpClient;

/// Build the configured series source: synthetic offline data or live Yahoo.
pub fn source_from_config(config: &FetchConfig) -> Arc<dyn SeriesSource> {
    if config.synthetic {
        tracing::info!("using synthetic yahoo series");
        Arc::new(YahooAdapter::synthetic())
    } else {
        tracing::info!(timeout_ms = config.timeout_ms, "using live yahoo chart api");
        Arc::new(
            YahooAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()))
                .with_timeout_ms(config.timeout_ms),
        )
    }
}
