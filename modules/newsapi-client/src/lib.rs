pub mod error;
pub mod types;

pub use error::{NewsApiError, Result};
pub use types::{Article, ArticleSource, EverythingResponse};

use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org/v2";

/// Provider ceiling for `pageSize`.
const MAX_PAGE_SIZE: u32 = 100;

pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("techpress-ingest/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Search all indexed articles for `query`, newest first.
    pub async fn everything(&self, query: &str, page_size: u32) -> Result<Vec<Article>> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        tracing::info!(query, page_size = %page_size, "NewsAPI search");

        let url = format!("{}/everything", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<EverythingResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body);
            return Err(NewsApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: EverythingResponse = serde_json::from_str(&body)?;
        if data.status != "ok" {
            return Err(NewsApiError::Rejected {
                code: data.code.unwrap_or_else(|| data.status.clone()),
                message: data.message.unwrap_or_default(),
            });
        }

        tracing::info!(
            query,
            count = data.articles.len(),
            total = data.total_results,
            "NewsAPI search complete"
        );
        Ok(data.articles)
    }
}
