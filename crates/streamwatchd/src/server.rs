//! Exporter HTTP routes.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition of device gauges |
//! | GET | `/healthz` | Liveness |

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use streamwatch_metrics::{MetricsRegistry, CONTENT_TYPE};

/// Shared state for exporter handlers.
#[derive(Clone)]
pub struct ExporterState {
    pub registry: Arc<MetricsRegistry>,
}

/// Build the exporter router.
pub fn build_router(registry: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/healthz", get(healthz))
        .with_state(ExporterState { registry })
}

/// GET /metrics
async fn prometheus_metrics(State(state): State<ExporterState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], state.registry.render())
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}
