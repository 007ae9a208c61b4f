use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::SegmentRequest;
use crate::presentation::state::AppState;

use super::error::executor_error_response;

/// Segment an audio file.
#[tracing::instrument(
    skip(state, request),
    fields(service = %state.service_name, segments = request.segments.len())
)]
pub async fn segment_handler(
    State(state): State<AppState>,
    Json(request): Json<SegmentRequest>,
) -> impl IntoResponse {
    match state.executor.segment(&request).await {
        Ok(()) => {
            tracing::info!(segments = request.segments.len(), "Segmentation completed");
            (StatusCode::OK, Json(())).into_response()
        }
        Err(e) => executor_error_response(e),
    }
}
