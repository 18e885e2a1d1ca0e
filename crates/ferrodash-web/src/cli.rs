//! Command-line interface.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the browser dashboard and JSON API |
//! | `snapshot` | Print one dashboard view as JSON |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | none | JSON config file (`FERRODASH_CONFIG`) |
//! | `--log-json` | `false` | Emit JSON log lines |
//! | `--synthetic` / `--live` | config | Force offline or live Yahoo data |
//!
//! ```bash
//! ferrodash serve --bind 0.0.0.0:8050
//! ferrodash --live snapshot --ticker GC=F --start 2023-01-01 --end 2023-06-30 --pretty
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Commodity price dashboard.
#[derive(Debug, Parser)]
#[command(name = "ferrodash", author, version, about = "Commodity price dashboard")]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = "FERRODASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    /// Use deterministic offline data regardless of configuration.
    #[arg(long, global = true, default_value_t = false, conflicts_with = "live")]
    pub synthetic: bool,

    /// Fetch live data from Yahoo Finance regardless of configuration.
    #[arg(long, global = true, default_value_t = false)]
    pub live: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Data-mode override requested on the command line, if any.
    pub fn synthetic_override(&self) -> Option<bool> {
        match (self.synthetic, self.live) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard over HTTP.
    Serve(ServeArgs),
    /// Render one view headlessly and print it as JSON.
    Snapshot(SnapshotArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8050")]
    pub bind: SocketAddr,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Ticker symbol, e.g. `GC=F`. Defaults to the fallback ticker.
    #[arg(long)]
    pub ticker: Option<String>,

    /// Window start (YYYY-MM-DD). Defaults to the history start.
    #[arg(long)]
    pub start: Option<String>,

    /// Window end (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
