use anyhow::Result;
use axum::Router;
use pod_diagnostics::{api, config, state::AppState, telemetry};
use config::Config;
use std::net::SocketAddr;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.load.max_fib_index > 42 {
        warn!(
            max_fib_index = cfg.load.max_fib_index,
            "Fibonacci ceiling above 42 allows requests that run for minutes"
        );
    }

    let app_state = AppState::new(cfg.clone())?;

    #[allow(unused_mut)]
    let mut app: Router = api::router(app_state);

    #[cfg(feature = "metrics")]
    {
        app = api::with_metrics(app);
    }

    let addr = cfg.server.socket_addr()?;

    info!(
        %addr,
        app = %cfg.app.name,
        sleep_min_secs = cfg.load.sleep_min_secs,
        sleep_max_secs = cfg.load.sleep_max_secs,
        max_fib_index = cfg.load.max_fib_index,
        "starting diagnostic receiver"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(telemetry::shutdown_signal())
    .await?;

    warn!("shutdown complete");
    Ok(())
}
