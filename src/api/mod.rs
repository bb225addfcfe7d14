pub mod diagnostic;
pub mod error;
pub mod health;
pub mod info;

use axum::{error_handling::HandleErrorLayer, routing::get, BoxError, Router};
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::{api::error::ApiError, state::AppState};

pub fn router(state: AppState) -> Router {
    let request_timeout = state.cfg.server.request_timeout_secs;

    let mut router = Router::new()
        .route("/", get(info::root))
        .route("/diagnostic", get(diagnostic::diagnostic))
        .route("/health", get(health::health_check))
        .with_state(state);

    // Dropping the request future does not stop an inline Fibonacci run.
    if let Some(secs) = request_timeout {
        router = router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    timeout_error(err, secs)
                }))
                .layer(TimeoutLayer::new(Duration::from_secs(secs))),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

fn timeout_error(err: BoxError, secs: u64) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::RequestTimeout(secs)
    } else {
        ApiError::InternalError(err.to_string())
    }
}

#[cfg(feature = "metrics")]
pub fn with_metrics(app: Router) -> Router {
    use axum_prometheus::PrometheusMetricLayer;
    let (layer, handle) = PrometheusMetricLayer::pair();

    let metrics_router =
        Router::new().route("/metrics", get(move || async move { handle.render() }));

    app.layer(layer).merge(metrics_router)
}
