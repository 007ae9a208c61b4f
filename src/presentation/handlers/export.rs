use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::ExportRequest;
use crate::presentation::state::AppState;

use super::error::executor_error_response;

/// Export an audio file.
#[tracing::instrument(skip(state, request), fields(service = %state.service_name))]
pub async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> impl IntoResponse {
    match state.executor.export(&request).await {
        Ok(()) => (StatusCode::OK, Json(())).into_response(),
        Err(e) => executor_error_response(e),
    }
}
