use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::rest::parse_body;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsRequest {
    query: Option<String>,
}

pub async fn search(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let req: NewsRequest = parse_body(&body)?;
    let result = state.ingestor.search_news(req.query.as_deref()).await?;
    Ok(Json(json!({
        "success": true,
        "articles": result.articles,
        "query": result.query,
        "totalFound": result.total_found,
    })))
}

pub async fn ingest(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let req: NewsRequest = parse_body(&body)?;
    let summary = state.ingestor.ingest_news(req.query.as_deref()).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Inserted {} of {} fetched articles",
            summary.inserted, summary.total_fetched
        ),
        "totalFetched": summary.total_fetched,
        "inserted": summary.inserted,
        "skipped": summary.skipped,
    })))
}
