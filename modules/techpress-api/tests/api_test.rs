//! HTTP tests driving the router with in-memory storage and fake providers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use techpress_api::{build_router, AppState};
use techpress_ingest::{
    Ingestor, NewsSettings, NewsSource, NoopResolver, ProductScraper, ProductScrapers, RawArticle,
    ScrapeRequest, SourceFailure,
};
use techpress_store::MemoryStore;

// ---------------------------------------------------------------------------
// Fakes and helpers
// ---------------------------------------------------------------------------

struct StaticNews(Vec<RawArticle>);

#[async_trait]
impl NewsSource for StaticNews {
    async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<RawArticle>, SourceFailure> {
        Ok(self.0.clone())
    }
}

struct StaticScraper(Result<Vec<Value>, SourceFailure>);

#[async_trait]
impl ProductScraper for StaticScraper {
    async fn scrape(&self, _request: &ScrapeRequest) -> Result<Vec<Value>, SourceFailure> {
        self.0.clone()
    }
}

fn article(id: &str, title: &str) -> RawArticle {
    RawArticle {
        id: id.into(),
        title: Some(title.into()),
        description: Some("A short summary.".into()),
        url: Some(format!("https://news.example/{id}")),
        published_at: Some(Utc.with_ymd_and_hms(2026, 5, 2, 8, 30, 0).unwrap()),
        ..Default::default()
    }
}

fn app_with(
    store: Arc<MemoryStore>,
    articles: Vec<RawArticle>,
    primary: Result<Vec<Value>, SourceFailure>,
    fallback: Result<Vec<Value>, SourceFailure>,
) -> Router {
    let ingestor = Ingestor::new(
        store,
        Arc::new(StaticNews(articles)),
        ProductScrapers::new(
            Arc::new(StaticScraper(primary)),
            Arc::new(StaticScraper(fallback)),
            Arc::new(NoopResolver),
        ),
        NewsSettings {
            default_query: "technology".into(),
            page_size: 50,
            author_id: None,
        },
    );
    build_router(Arc::new(AppState::new(ingestor)))
}

fn app(store: Arc<MemoryStore>) -> Router {
    app_with(store, Vec::new(), Ok(Vec::new()), Ok(Vec::new()))
}

async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Health and CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let response = get(app(Arc::new(MemoryStore::new())), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/products")
        .header(header::ORIGIN, "https://admin.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(Arc::new(MemoryStore::new()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_search_filters_removed_articles() {
    let app = app_with(
        Arc::new(MemoryStore::new()),
        vec![article("a", "Chip Shortage Eases"), article("b", "[Removed]")],
        Ok(Vec::new()),
        Ok(Vec::new()),
    );
    let response = post_json(app, "/api/news/search", json!({ "query": "chips" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "chips");
    assert_eq!(json["totalFound"], 1);
    assert_eq!(json["articles"][0]["title"], "Chip Shortage Eases");
    assert!(json["articles"][0].get("urlToImage").is_some());
}

#[tokio::test]
async fn news_ingest_with_empty_body_uses_default_query() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(
        store.clone(),
        vec![article("a", "Chip Shortage Eases"), article("b", "[Removed]")],
        Ok(Vec::new()),
        Ok(Vec::new()),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/news/ingest")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["totalFetched"], 2);
    assert_eq!(json["inserted"], 1);
    assert_eq!(json["skipped"], 1);
    assert_eq!(store.content().await.len(), 1);
}

#[tokio::test]
async fn ingested_news_appears_in_content_listing() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(
        store.clone(),
        vec![article("a", "Phone Launch"), article("b", "Phone Launch!")],
        Ok(Vec::new()),
        Ok(Vec::new()),
    );
    post_json(app.clone(), "/api/news/ingest", json!({})).await;

    let response = get(app, "/api/content?content_type=news&limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["content"].as_array().unwrap().len(), 1);
    assert_eq!(json["content"][0]["slug"], "phone-launch");
}

#[tokio::test]
async fn unknown_content_type_is_bad_request() {
    let response = get(app(Arc::new(MemoryStore::new())), "/api/content?content_type=podcast").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn malformed_limit_is_json_bad_request() {
    let response = get(app(Arc::new(MemoryStore::new())), "/api/content?limit=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_without_required_fields_is_400() {
    let response = post_json(
        app(Arc::new(MemoryStore::new())),
        "/api/products",
        json!({ "title": "Kindle" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("author_id"));
}

#[tokio::test]
async fn product_ingest_returns_ids() {
    let store = Arc::new(MemoryStore::new());
    let response = post_json(
        app(store.clone()),
        "/api/products",
        json!({
            "title": "Kindle Paperwhite",
            "author_id": Uuid::new_v4(),
            "category_id": Uuid::new_v4(),
            "source_url": "https://shop.example/kindle",
            "price": "$149.99",
            "images": ["https://img.example/k.jpg"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["slug"], "kindle-paperwhite");
    assert!(json["content_id"].is_string());
    assert!(json["inventory_id"].is_string());
    assert_eq!(store.inventory().await[0].price, Some(149.99));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app(Arc::new(MemoryStore::new()))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scrape_falls_back_and_returns_product_shape() {
    let app = app_with(
        Arc::new(MemoryStore::new()),
        Vec::new(),
        Err(SourceFailure::TimedOut("RUNNING".into())),
        Ok(vec![json!({
            "success": true,
            "product": {"title": "Kindle", "price": "1.299,99 €", "images": ["a.jpg"]}
        })]),
    );
    let response = post_json(
        app,
        "/api/products/scrape",
        json!({ "url": "https://shop.example/kindle", "maxItems": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["provider"], "fallback");
    assert_eq!(json["product"]["title"], "Kindle");
    assert_eq!(json["product"]["price"], 1299.99);
    assert_eq!(json["product"]["source"], "https://shop.example/kindle");
    assert!(json["raw"].is_object());
}

#[tokio::test]
async fn scrape_without_url_is_400() {
    let response = post_json(
        app(Arc::new(MemoryStore::new())),
        "/api/products/scrape",
        json!({ "maxPages": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scrape_with_both_scrapers_failing_is_502() {
    let app = app_with(
        Arc::new(MemoryStore::new()),
        Vec::new(),
        Err(SourceFailure::RunFailed("FAILED".into())),
        Err(SourceFailure::Unreachable("connection refused".into())),
    );
    let response = post_json(
        app,
        "/api/products/scrape",
        json!({ "product_url": "https://shop.example/kindle" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());
}
