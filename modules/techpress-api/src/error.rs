use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use techpress_common::TechpressError;

/// Handler error. Every failure is rendered as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] TechpressError),

    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(err) => match err {
                TechpressError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                TechpressError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                TechpressError::SourceFetch(_) | TechpressError::Scrape(_) => {
                    tracing::warn!(error = %err, "Upstream provider failure");
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
                TechpressError::Config(_) | TechpressError::Store(_) => {
                    tracing::error!(error = %err, "Internal error");
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
