use tokio::net::TcpListener;

use ferrodash_core::CacheMode;

use crate::bootstrap::Bootstrap;
use crate::cli::{Cli, ServeArgs};
use crate::error::WebError;
use crate::server::{router, AppState};

pub async fn run(cli: &Cli, args: &ServeArgs) -> Result<(), WebError> {
    let bootstrap = Bootstrap::from_cli(cli)?;
    let dashboard = bootstrap.dashboard(CacheMode::Use).await?;
    let app = router(AppState::new(bootstrap, dashboard));

    let listener = TcpListener::bind(args.bind)
        .await
        .map_err(|source| WebError::Bind {
            addr: args.bind,
            source,
        })?;
    tracing::info!(addr = %args.bind, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Serve)?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(error) => {
            // without a signal handler the server runs until killed
            tracing::warn!(%error, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    }
}
