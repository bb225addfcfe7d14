use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,hyper=warn,tower_http=info";

/// JSON logs for log shippers; `DIAG_LOG_FORMAT=pretty` for local runs.
pub fn init_tracing() {
    let pretty = std::env::var("DIAG_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));

    let json_layer = (!pretty).then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let pretty_layer = pretty.then(|| tracing_subscriber::fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(json_layer)
        .with(pretty_layer)
        .init();
}

/// Resolves on Ctrl+C or SIGTERM. Kubernetes sends SIGTERM on pod eviction.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!("shutdown signal received, draining in-flight requests");
}
