use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{export_handler, health_handler, segment_handler};
use crate::presentation::state::AppState;

/// Handlers are mounted under the service name, e.g. `POST /Pydub/export`.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let service = state.service_name.trim_matches('/').to_string();

    Router::new()
        .route("/health", get(health_handler))
        .route(&format!("/{}/export", service), post(export_handler))
        .route(&format!("/{}/segment", service), post(segment_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
