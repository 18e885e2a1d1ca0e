use std::io::Write;

use ferrodash_core::CacheMode;

use crate::bootstrap::Bootstrap;
use crate::cli::{Cli, SnapshotArgs};
use crate::error::WebError;

/// Fetch, recompute once and print the view as JSON on stdout.
pub async fn run(cli: &Cli, args: &SnapshotArgs) -> Result<(), WebError> {
    let bootstrap = Bootstrap::from_cli(cli)?;
    let selection = bootstrap.selection(
        args.ticker.as_deref(),
        args.start.as_deref(),
        args.end.as_deref(),
    )?;
    let dashboard = bootstrap.dashboard(CacheMode::Bypass).await?;
    let view = dashboard.recompute(&selection);

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
