pub mod download;
pub mod health;
pub mod schedules;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use sg_domain::ErrorCode;

use crate::service::{Failure, ServiceError};
use crate::state::AppState;

/// Build the full API router.  No route requires authentication: download
/// tokens are the only capability.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/schedules/generate", post(schedules::generate))
        .route("/v1/schedules/validate", post(schedules::validate))
        .route("/download/:token", get(download::download))
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationError | ErrorCode::MaxRowsExceeded => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_response(status: StatusCode, failure: Failure) -> Response {
    (status, Json(failure)).into_response()
}

fn service_error(err: ServiceError) -> Response {
    let code = err.error_code();
    if code == ErrorCode::InternalError {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error_code = %code, error = %err, "request rejected");
    }
    failure_response(status_for(code), err.to_failure())
}
