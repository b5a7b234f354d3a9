use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope for `/v2/everything`. Errors come back with `status: "error"`
/// and a `code`/`message` pair instead of articles.
#[derive(Debug, Clone, Deserialize)]
pub struct EverythingResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single article as returned by the provider. Every field is optional;
/// the provider blanks out withdrawn articles rather than omitting them.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}
