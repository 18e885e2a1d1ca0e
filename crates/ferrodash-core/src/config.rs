//! Dashboard configuration.
//!
//! Values resolve in this order, later layers winning:
//!
//! | Layer | Source |
//! |-------|--------|
//! | Defaults | [`DashboardConfig::default`] |
//! | File | JSON file passed as `--config` or `FERRODASH_CONFIG` |
//! | Environment | `FERRODASH_SYNTHETIC`, `FERRODASH_HISTORY_START` |
//!
//! Every failure here is fatal at startup.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::macros::date;
use time::Date;

use crate::catalog::{default_entries, CatalogEntry};
use crate::{iso_date, parse_date, Catalog, ConfigError, DateWindow, Symbol};

pub const CONFIG_ENV: &str = "FERRODASH_CONFIG";
pub const SYNTHETIC_ENV: &str = "FERRODASH_SYNTHETIC";
pub const HISTORY_START_ENV: &str = "FERRODASH_HISTORY_START";

const DEFAULT_HISTORY_START: Date = date!(2022 - 01 - 01);
const DEFAULT_FALLBACK: &str = "NG=F";

/// Upstream fetch tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub requests_per_minute: u32,
    pub cache_ttl_secs: u64,
    /// Generate offline synthetic series instead of calling Yahoo.
    pub synthetic: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            requests_per_minute: 60,
            cache_ttl_secs: 900,
            synthetic: true,
        }
    }
}

impl FetchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub catalog: Vec<CatalogEntry>,
    #[serde(with = "iso_date")]
    pub history_start: Date,
    pub fallback_ticker: Symbol,
    pub fetch: FetchConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            catalog: default_entries(),
            history_start: DEFAULT_HISTORY_START,
            fallback_ticker: Symbol::parse(DEFAULT_FALLBACK)
                .expect("built-in fallback ticker is valid"),
            fetch: FetchConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Resolve defaults, the optional file, and process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::from_path(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SYNTHETIC_ENV) {
            self.fetch.synthetic = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidOverride {
                key: SYNTHETIC_ENV,
                message: format!("expected a boolean, got '{raw}'"),
            })?;
        }
        if let Some(raw) = lookup(HISTORY_START_ENV) {
            self.history_start = parse_date(&raw).map_err(|e| ConfigError::InvalidOverride {
                key: HISTORY_START_ENV,
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Check cross-field rules and build the catalog.
    pub fn validate(&self, today: Date) -> Result<Catalog, ConfigError> {
        let catalog = Catalog::new(self.catalog.clone())?;
        if !catalog.contains(&self.fallback_ticker) {
            return Err(ConfigError::FallbackNotInCatalog {
                symbol: self.fallback_ticker.to_string(),
            });
        }
        if self.history_start > today {
            return Err(ConfigError::Invalid {
                field: "history_start",
                message: format!("{} is after today ({today})", self.history_start),
            });
        }
        if self.fetch.requests_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch.requests_per_minute",
                message: String::from("must be greater than zero"),
            });
        }
        Ok(catalog)
    }

    /// Full history window fetched at startup.
    pub fn history_window(&self, today: Date) -> DateWindow {
        DateWindow::new(self.history_start, today)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
