use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::service;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(service::health(&state))
}
