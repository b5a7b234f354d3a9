pub mod news;
pub mod products;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use techpress_common::ContentType;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_LIST_LIMIT: u32 = 20;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
pub struct ContentQuery {
    limit: Option<u32>,
    content_type: Option<String>,
}

pub async fn list_content(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(q) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let content_type = match q.content_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => Some(
            ContentType::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown content_type {raw:?}")))?,
        ),
        None => None,
    };
    let content = state
        .ingestor
        .list_content(content_type, q.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(json!({ "content": content })))
}

/// Decode a JSON body, treating an empty body as the default value.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}
