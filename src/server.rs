//! HTTP listener exposing the scrape endpoint.
//!
//! The metrics handler drives one collection cycle per request; the
//! core decides what the snapshot contains, this layer only encodes
//! and serves it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::collector::Exporter;
use crate::metrics;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<Exporter>,
    pub telemetry_path: String,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let telemetry_path = state.telemetry_path.clone();
    let app_state = Arc::new(state);

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz_handler))
        .route(&telemetry_path, get(metrics_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(app_state)
}

/// Landing page linking to the metrics endpoint.
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        concat!(
            "<html>\n",
            "<head><title>Dump1090 Exporter</title></head>\n",
            "<body>\n",
            "<h1>Dump1090 Exporter</h1>\n",
            "<p><a href=\"{path}\">Metrics</a></p>\n",
            "</body>\n",
            "</html>\n"
        ),
        path = state.telemetry_path
    ))
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Scrape handler: one collection cycle per request.
///
/// A failed cycle surfaces as 503 so the scraper records a failed
/// scrape instead of ingesting a partial snapshot.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.exporter.collect().await {
        Ok(snapshot) => match metrics::encode_snapshot(&snapshot) {
            Ok(body) => ([(header::CONTENT_TYPE, metrics::TEXT_FORMAT)], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "metric encoding failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "collection cycle failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("collection failed: {e}\n"),
            )
                .into_response()
        }
    }
}
