use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use newsapi_client::{Article, NewsApiClient};
use techpress_common::DedupKeys;

use crate::error::SourceFailure;

/// Title the provider substitutes for withdrawn articles.
pub const REMOVED_MARKER: &str = "[Removed]";

/// An article as handed over by a news source, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawArticle {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub source_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// An article that passed validation: it has a real headline.
#[derive(Debug, Clone)]
pub struct ValidArticle {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub source_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl RawArticle {
    /// `None` when the headline is missing, blank, or the removal marker.
    pub fn validate(self) -> Option<ValidArticle> {
        let title = self.title?.trim().to_string();
        if title.is_empty() || title == REMOVED_MARKER {
            return None;
        }
        Some(ValidArticle {
            id: self.id,
            title,
            description: non_blank(self.description),
            content: non_blank(self.content),
            image_url: non_blank(self.image_url),
            url: non_blank(self.url),
            source_name: non_blank(self.source_name),
            published_at: self.published_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Article shape returned by the search endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl From<ValidArticle> for ArticleView {
    fn from(a: ValidArticle) -> Self {
        Self {
            id: a.id,
            title: a.title,
            description: a.description,
            url: a.url,
            url_to_image: a.image_url,
            published_at: a.published_at,
            source: a.source_name,
        }
    }
}

impl DedupKeys for ArticleView {
    fn identity_key(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn dedup_title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn dedup_date(&self) -> Option<NaiveDate> {
        self.published_at.map(|d| d.date_naive())
    }
}

// --- NewsSource trait ---

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch up to `limit` recent articles for `query`. A failure means the
    /// provider gave nothing usable; there are no partial results.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<RawArticle>, SourceFailure>;
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<RawArticle>, SourceFailure> {
        info!(query, limit, "News search");
        let articles = self.everything(query, limit).await?;
        Ok(articles.into_iter().map(RawArticle::from).collect())
    }
}

impl From<Article> for RawArticle {
    fn from(a: Article) -> Self {
        let id = article_id(a.url.as_deref(), a.title.as_deref(), a.published_at);
        Self {
            id,
            title: a.title,
            description: a.description,
            content: a.content,
            image_url: a.url_to_image,
            url: a.url,
            source_name: a.source.name,
            published_at: a.published_at,
        }
    }
}

/// The provider assigns no ids, so derive a stable one from the article URL
/// (or title and timestamp when the URL is missing).
pub fn article_id(url: Option<&str>, title: Option<&str>, published_at: Option<DateTime<Utc>>) -> String {
    let mut hasher = Sha256::new();
    match url {
        Some(url) => hasher.update(url.as_bytes()),
        None => {
            hasher.update(title.unwrap_or_default().as_bytes());
            if let Some(at) = published_at {
                hasher.update(at.to_rfc3339().as_bytes());
            }
        }
    }
    hex::encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>) -> RawArticle {
        RawArticle {
            id: "a1".into(),
            title: title.map(String::from),
            description: Some("  ".into()),
            ..Default::default()
        }
    }

    #[test]
    fn removed_and_missing_titles_are_rejected() {
        assert!(raw(Some(REMOVED_MARKER)).validate().is_none());
        assert!(raw(Some("   ")).validate().is_none());
        assert!(raw(None).validate().is_none());
    }

    #[test]
    fn valid_article_trims_title_and_drops_blank_fields() {
        let a = raw(Some("  Chip Shortage Eases ")).validate().unwrap();
        assert_eq!(a.title, "Chip Shortage Eases");
        assert!(a.description.is_none());
    }

    #[test]
    fn article_id_is_stable_per_url() {
        let a = article_id(Some("https://news.example/a"), Some("A"), None);
        let b = article_id(Some("https://news.example/a"), Some("B"), None);
        let c = article_id(Some("https://news.example/c"), Some("A"), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn view_serializes_provider_field_names() {
        let view = ArticleView::from(raw(Some("Launch")).validate().unwrap());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("urlToImage").is_some());
        assert!(json.get("publishedAt").is_some());
    }
}
