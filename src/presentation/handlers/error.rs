use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{AudioEngineError, LoaderError};
use crate::application::services::ExecutorError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// `true` when replaying the same request cannot succeed.
    pub terminal: bool,
}

pub fn status_for(err: &ExecutorError) -> StatusCode {
    match err {
        ExecutorError::FormatUndetermined(_)
        | ExecutorError::InvalidReference(_)
        | ExecutorError::InvalidSegment(_)
        | ExecutorError::EncodeFailed(AudioEngineError::InvalidOptions(_)) => {
            StatusCode::BAD_REQUEST
        }
        ExecutorError::LoadFailed(LoaderError::NotFound(_)) => StatusCode::NOT_FOUND,
        ExecutorError::LoadFailed(_) | ExecutorError::PersistFailed(_) => StatusCode::BAD_GATEWAY,
        ExecutorError::DecodeFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExecutorError::EncodeFailed(_) | ExecutorError::Scratch(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn executor_error_response(err: ExecutorError) -> Response {
    let status = status_for(&err);

    if status.is_server_error() {
        tracing::error!(error = %err, status = status.as_u16(), "Audio operation failed");
    } else {
        tracing::warn!(error = %err, status = status.as_u16(), "Audio operation rejected");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            terminal: err.is_terminal(),
        }),
    )
        .into_response()
}
