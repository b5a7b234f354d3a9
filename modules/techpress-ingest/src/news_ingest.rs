use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use techpress_common::canonical::canonicalize;
use techpress_common::{
    dedup_records, ContentDraft, ContentStatus, ContentType, Result, TechpressError,
};

use crate::news::{ArticleView, ValidArticle};
use crate::resolver::{resolve_content, Resolution};
use crate::Ingestor;

const NEWS_CATEGORY_NAME: &str = "Technology";
const NEWS_CATEGORY_SLUG: &str = "technology";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSearchResult {
    pub articles: Vec<ArticleView>,
    pub query: String,
    pub total_found: usize,
}

/// Counts for one ingestion batch. `skipped` covers invalid articles,
/// articles that were already stored, and per-item write failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsIngestSummary {
    pub total_fetched: usize,
    pub inserted: usize,
    pub skipped: usize,
}

enum Written {
    Inserted,
    Refreshed,
    /// Another story already holds the slug; the first one stored is kept.
    SlugTaken,
}

impl Ingestor {
    fn news_query(&self, query: Option<&str>) -> String {
        query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(self.news_settings.default_query.as_str())
            .to_string()
    }

    /// Search the news source without persisting anything. Invalid and
    /// duplicate articles are filtered out.
    pub async fn search_news(&self, query: Option<&str>) -> Result<NewsSearchResult> {
        let query = self.news_query(query);
        let raw = self.news.search(&query, self.news_settings.page_size).await?;
        let fetched = raw.len();

        let articles: Vec<ArticleView> = raw
            .into_iter()
            .filter_map(|a| a.validate())
            .map(ArticleView::from)
            .collect();
        let articles = dedup_records(articles);

        info!(%query, fetched, returned = articles.len(), "News search complete");
        Ok(NewsSearchResult {
            total_found: articles.len(),
            articles,
            query,
        })
    }

    /// Fetch articles and store each valid one. A fetch failure aborts
    /// before anything is written; per-article failures are logged and
    /// counted as skipped.
    pub async fn ingest_news(&self, query: Option<&str>) -> Result<NewsIngestSummary> {
        let query = self.news_query(query);
        let raw = self.news.search(&query, self.news_settings.page_size).await?;

        let mut summary = NewsIngestSummary {
            total_fetched: raw.len(),
            ..Default::default()
        };
        let mut category_id = None;

        for article in raw {
            let id = article.id.clone();
            let Some(article) = article.validate() else {
                warn!(article_id = %id, "Skipping article without a usable title");
                summary.skipped += 1;
                continue;
            };

            let category = match category_id {
                Some(c) => c,
                None => {
                    let c = self
                        .store
                        .ensure_category(NEWS_CATEGORY_NAME, NEWS_CATEGORY_SLUG)
                        .await?;
                    category_id = Some(c);
                    c
                }
            };

            match self.store_article(&article, category).await {
                Ok(Written::Inserted) => summary.inserted += 1,
                Ok(Written::Refreshed | Written::SlugTaken) => summary.skipped += 1,
                Err(e) => {
                    warn!(
                        article_id = %article.id,
                        title = %article.title,
                        error = %e,
                        "Failed to store article"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            %query,
            fetched = summary.total_fetched,
            inserted = summary.inserted,
            skipped = summary.skipped,
            "News ingestion complete"
        );
        Ok(summary)
    }

    async fn store_article(&self, article: &ValidArticle, category_id: Uuid) -> Result<Written> {
        let body = article.content.as_deref().or(article.description.as_deref());
        let canonical = canonicalize(
            ContentType::News,
            &article.title,
            body,
            None,
            article.description.as_deref(),
        );
        if canonical.slug.is_empty() {
            return Err(TechpressError::validation("title has no characters usable in a slug"));
        }

        let mut draft = ContentDraft {
            slug: canonical.slug,
            title: article.title.clone(),
            excerpt: canonical.excerpt,
            body: body.map(String::from),
            content_type: ContentType::News,
            status: ContentStatus::Published,
            category_id: Some(category_id),
            author_id: self.news_settings.author_id,
            inventory_id: None,
            featured_image: article.image_url.clone(),
            source_url: article.url.clone(),
            reading_time: canonical.reading_time,
            meta_title: Some(canonical.meta_title),
            meta_description: canonical.meta_description,
            published_at: Some(article.published_at.unwrap_or_else(Utc::now)),
        };

        match resolve_content(self.store.as_ref(), None, &article.title).await? {
            Resolution::Matched(existing) => {
                draft.slug = existing.slug;
                self.store.update_content(existing.id, &draft).await?;
                Ok(Written::Refreshed)
            }
            Resolution::Explicit(id) => {
                self.store.update_content(id, &draft).await?;
                Ok(Written::Refreshed)
            }
            Resolution::New => {
                if let Some(holder) = self.store.find_content_by_slug(&draft.slug).await? {
                    debug!(
                        slug = %draft.slug,
                        kept = %holder.title,
                        title = %article.title,
                        "Slug already stored under another title"
                    );
                    return Ok(Written::SlugTaken);
                }
                self.store.upsert_content(&draft).await?;
                Ok(Written::Inserted)
            }
        }
    }
}
