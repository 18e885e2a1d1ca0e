use tracing_subscriber::EnvFilter;

use crate::error::WebError;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "ferrodash=info,ferrodash_core=info,tower_http=info";

/// Install the global subscriber. Logs go to stderr so `snapshot` output on
/// stdout stays machine-readable.
pub fn init(json: bool) -> Result<(), WebError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|error| WebError::Logging(error.to_string()))
}
