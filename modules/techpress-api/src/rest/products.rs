use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use techpress_ingest::{ProductSubmission, ScrapeRequest};

use crate::error::{ApiError, ApiResult};
use crate::rest::parse_body;
use crate::AppState;

pub async fn ingest(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let submission: ProductSubmission = parse_body(&body)?;
    let result = state.ingestor.ingest_product(submission).await?;
    Ok(Json(json!({
        "success": true,
        "content_id": result.content_id,
        "slug": result.slug,
        "inventory_id": result.inventory_id,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeBody {
    product_url: Option<String>,
    url: Option<String>,
    #[serde(rename = "maxPages")]
    max_pages: Option<u32>,
    #[serde(rename = "maxItems")]
    max_items: Option<u32>,
}

pub async fn scrape(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let req: ScrapeBody = parse_body(&body)?;
    let url = req
        .product_url
        .or(req.url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("product_url is required".to_string()))?;

    let outcome = state
        .ingestor
        .scrape_product(ScrapeRequest {
            url,
            max_pages: req.max_pages,
            max_items: req.max_items,
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "product": outcome.product,
        "raw": outcome.raw,
        "provider": outcome.provider,
    })))
}
