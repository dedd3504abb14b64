//! Schedule endpoints.
//!
//! - `POST /v1/schedules/generate` runs the full pipeline and registers a download
//! - `POST /v1/schedules/validate` runs planning only (preview, no artifact)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;

use sg_domain::ErrorCode;

use super::{failure_response, service_error};
use crate::service::{self, Failure};
use crate::state::AppState;

fn bad_body(rejection: JsonRejection) -> Response {
    failure_response(
        StatusCode::BAD_REQUEST,
        Failure::new(ErrorCode::ValidationError, rejection.body_text()),
    )
}

pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match body {
        Ok(json) => json,
        Err(rejection) => return bad_body(rejection),
    };

    match service::generate(&state, payload).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => service_error(e),
    }
}

pub async fn validate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match body {
        Ok(json) => json,
        Err(rejection) => return bad_body(rejection),
    };

    match service::validate_preview(&payload, &state.config.schedule) {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => service_error(e),
    }
}
