//! `GET /download/:token`
//!
//! Streams a registered workbook back as an attachment.  Unknown, expired
//! and unreadable tokens all answer 404 with the same body, so a caller
//! learns nothing about which tokens ever existed.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use sg_artifacts::token::fingerprint;
use sg_domain::ErrorCode;

use super::failure_response;
use crate::service::Failure;
use crate::state::AppState;

pub async fn download(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let registry = state.registry.clone();
    let lookup_token = token.clone();
    let found = tokio::task::spawn_blocking(move || registry.lookup(&lookup_token)).await;

    let artifact = match found {
        Ok(Ok(artifact)) => artifact,
        Ok(Err(_)) => {
            tracing::info!(token_fp = %fingerprint(&token), "download token not found or expired");
            return failure_response(
                StatusCode::NOT_FOUND,
                Failure::new(ErrorCode::NotFound, "file not found or expired"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "download lookup task failed");
            return failure_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Failure::internal("internal error while reading the file"),
            );
        }
    };

    tracing::info!(
        token_fp = %fingerprint(&token),
        filename = %artifact.filename,
        bytes = artifact.bytes.len(),
        "download served"
    );

    let content_type = HeaderValue::from_str(&artifact.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(&artifact.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        artifact.bytes,
    )
        .into_response()
}

/// `attachment; filename="..."` with an ASCII-only fallback name plus the
/// RFC 5987 `filename*` form carrying the exact UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    if ascii == filename {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}
