use std::sync::Arc;

use time::Date;

use ferrodash_core::{
    fetch_series, parse_date, source_from_config, today_utc, CacheMode, Catalog, Dashboard,
    DashboardConfig, DateWindow, FetchOptions, SelectionState, SeriesSource, Symbol,
    ValidationError,
};

use crate::cli::Cli;
use crate::error::WebError;

/// Validated configuration plus the collaborators needed to (re)build a
/// [`Dashboard`].
#[derive(Clone)]
pub struct Bootstrap {
    config: DashboardConfig,
    catalog: Arc<Catalog>,
    source: Arc<dyn SeriesSource>,
    options: FetchOptions,
}

impl Bootstrap {
    pub fn from_cli(cli: &Cli) -> Result<Self, WebError> {
        let mut config = DashboardConfig::load(cli.config.as_deref())?;
        if let Some(synthetic) = cli.synthetic_override() {
            config.fetch.synthetic = synthetic;
        }
        Self::from_config(config)
    }

    pub fn from_config(config: DashboardConfig) -> Result<Self, WebError> {
        let source = source_from_config(&config.fetch);
        Self::with_source(config, source)
    }

    pub fn with_source(
        config: DashboardConfig,
        source: Arc<dyn SeriesSource>,
    ) -> Result<Self, WebError> {
        let catalog = config.validate(today_utc())?;
        let options = FetchOptions::from_config(&config.fetch);
        tracing::info!(
            tickers = catalog.len(),
            history_start = %config.history_start,
            fallback = %config.fallback_ticker,
            synthetic = config.fetch.synthetic,
            "configuration loaded"
        );
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            source,
            options,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn SeriesSource {
        self.source.as_ref()
    }

    pub fn history_start(&self) -> Date {
        self.config.history_start
    }

    /// Clamp a requested window into `[history_start, today]`.
    pub fn clamp(&self, window: DateWindow) -> DateWindow {
        window.clamp_to(self.config.history_start, today_utc())
    }

    pub fn clamp_date(&self, date: Date) -> Date {
        date.max(self.config.history_start).min(today_utc())
    }

    /// Build a selection from optional raw inputs. Missing bounds default to
    /// the full history and supplied ones are clamped into it.
    pub fn selection(
        &self,
        ticker: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<SelectionState, ValidationError> {
        let ticker = match ticker.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Symbol::parse(raw)?),
        };
        let full = self.full_window();
        let start = start.map(parse_date).transpose()?.unwrap_or(full.start);
        let end = end.map(parse_date).transpose()?.unwrap_or(full.end);
        Ok(SelectionState::new(
            ticker,
            self.clamp(DateWindow::new(start, end)),
        ))
    }

    /// Full selectable window.
    pub fn full_window(&self) -> DateWindow {
        self.config.history_window(today_utc())
    }

    /// Fetch the full history and wrap it in a fresh dashboard.
    pub async fn dashboard(&self, cache_mode: CacheMode) -> Result<Dashboard, WebError> {
        let options = self.options.clone().with_cache_mode(cache_mode);
        let store = fetch_series(
            self.source.as_ref(),
            &self.catalog,
            self.full_window(),
            &options,
        )
        .await;
        Ok(Dashboard::new(
            Arc::clone(&self.catalog),
            Arc::new(store),
            self.config.fallback_ticker.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use time::Duration;

    fn bootstrap() -> Bootstrap {
        let config = DashboardConfig {
            history_start: today_utc() - Duration::days(30),
            ..DashboardConfig::default()
        };
        Bootstrap::from_config(config).expect("valid config")
    }

    #[test]
    fn selection_defaults_to_full_history() {
        let bootstrap = bootstrap();
        let selection = bootstrap.selection(None, None, None).expect("selection");
        assert_eq!(selection.ticker, None);
        assert_eq!(selection.window(), bootstrap.full_window());
    }

    #[test]
    fn selection_clamps_dates_outside_history() {
        let bootstrap = bootstrap();
        let selection = bootstrap
            .selection(Some("gc=f"), Some("1999-01-01"), Some("2999-12-31"))
            .expect("selection");
        assert_eq!(selection.ticker.as_ref().map(Symbol::as_str), Some("GC=F"));
        assert_eq!(selection.start, bootstrap.history_start());
        assert_eq!(selection.end, today_utc());
    }

    #[test]
    fn selection_rejects_malformed_input() {
        let bootstrap = bootstrap();
        assert!(bootstrap.selection(Some("!!"), None, None).is_err());
        assert!(bootstrap.selection(None, Some("01/02/2023"), None).is_err());
    }

    #[test]
    fn command_line_mode_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"fallback_ticker": "GC=F", "fetch": {{"synthetic": false}}}}"#)
            .expect("write config");
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["ferrodash", "--synthetic", "--config", path.as_str(), "serve"])
            .expect("parses");
        let bootstrap = Bootstrap::from_cli(&cli).expect("valid config");

        assert!(bootstrap.config().fetch.synthetic);
        assert_eq!(bootstrap.config().fallback_ticker.as_str(), "GC=F");
    }
}
