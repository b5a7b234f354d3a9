//! Source adapters, identity resolution, and the ingestion pipelines that
//! turn news articles and scraped products into canonical stored records.

pub mod error;
pub mod news;
pub mod news_ingest;
pub mod product;
pub mod product_ingest;
pub mod resolver;
pub mod scrape;

pub use error::{ScrapeError, SourceFailure};
pub use news::{ArticleView, NewsSource, RawArticle, REMOVED_MARKER};
pub use news_ingest::{NewsIngestSummary, NewsSearchResult};
pub use product::{parse_price, ScrapedProduct};
pub use product_ingest::{ProductIngestResult, ProductSubmission};
pub use resolver::Resolution;
pub use scrape::{
    ApifyProductScraper, NoopResolver, ProductScraper, ProductScrapers, Provider, RedirectResolver,
    ScrapeOutcome, ScrapeRequest, UrlResolver,
};

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use apify_client::ApifyClient;
use newsapi_client::NewsApiClient;
use scrape_service_client::ScrapeServiceClient;
use techpress_common::{dedup_records, Config, ContentRecord, ContentType, Result, TechpressError};
use techpress_store::ContentStore;

/// Largest page the read path will return.
pub const MAX_LIST_LIMIT: u32 = 100;

/// News settings the pipelines need from `Config`.
#[derive(Debug, Clone)]
pub struct NewsSettings {
    pub default_query: String,
    pub page_size: u32,
    pub author_id: Option<Uuid>,
}

impl From<&Config> for NewsSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_query: config.news_default_query.clone(),
            page_size: config.news_page_size,
            author_id: config.news_author_id,
        }
    }
}

/// Entry point for every ingestion operation. Holds the store and the
/// source adapters; cheap to share behind an `Arc`.
pub struct Ingestor {
    store: Arc<dyn ContentStore>,
    news: Arc<dyn NewsSource>,
    scrapers: ProductScrapers,
    news_settings: NewsSettings,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ContentStore>,
        news: Arc<dyn NewsSource>,
        scrapers: ProductScrapers,
        news_settings: NewsSettings,
    ) -> Self {
        Self {
            store,
            news,
            scrapers,
            news_settings,
        }
    }

    /// Wire the real providers from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        let news = NewsApiClient::new(config.news_api_key.clone())
            .map_err(|e| TechpressError::Config(format!("news client: {e}")))?;

        let primary = ApifyProductScraper::new(
            ApifyClient::new(config.apify_token.clone()),
            config.apify_product_actor.clone(),
            config.apify_run_window,
        );
        let fallback = ScrapeServiceClient::new(
            &config.scrape_service_url,
            config.scrape_service_token.as_deref(),
        )
        .map_err(|e| TechpressError::Config(format!("scrape service client: {e}")))?;
        let resolver = RedirectResolver::new()
            .map_err(|e| TechpressError::Config(format!("link resolver: {e}")))?;

        info!(
            actor = %config.apify_product_actor,
            fallback = %config.scrape_service_url,
            "Ingestion providers configured"
        );

        Ok(Self::new(
            store,
            Arc::new(news),
            ProductScrapers::new(Arc::new(primary), Arc::new(fallback), Arc::new(resolver)),
            NewsSettings::from(config),
        ))
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Published content, newest first, with presentation duplicates removed.
    pub async fn list_content(
        &self,
        content_type: Option<ContentType>,
        limit: u32,
    ) -> Result<Vec<ContentRecord>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let rows = self.store.list_published(content_type, limit).await?;
        Ok(dedup_records(rows))
    }
}
