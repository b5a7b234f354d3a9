use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use apify_client::{ApifyClient, ProductScraperInput};
use scrape_service_client::ScrapeServiceClient;

use crate::error::{ScrapeError, SourceFailure};
use crate::product::{first_product, ScrapedProduct};

/// How many redirects a short link may take before we give up on it.
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    pub url: String,
    pub max_pages: Option<u32>,
    pub max_items: Option<u32>,
}

/// Which scraper produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub product: ScrapedProduct,
    pub raw: Value,
    pub provider: Provider,
}

// --- ProductScraper trait ---

/// One scraping backend. Returns the raw items it found; an empty list is a
/// valid answer and is judged by the caller.
#[async_trait]
pub trait ProductScraper: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<Value>, SourceFailure>;
}

/// Primary backend: a hosted product actor run to completion.
pub struct ApifyProductScraper {
    client: ApifyClient,
    actor_id: String,
    window: Duration,
}

impl ApifyProductScraper {
    pub fn new(client: ApifyClient, actor_id: impl Into<String>, window: Duration) -> Self {
        Self {
            client,
            actor_id: actor_id.into(),
            window,
        }
    }
}

#[async_trait]
impl ProductScraper for ApifyProductScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<Value>, SourceFailure> {
        let input = ProductScraperInput::single(&request.url, request.max_pages, request.max_items);
        Ok(self
            .client
            .scrape_products(&self.actor_id, &input, self.window)
            .await?)
    }
}

/// Fallback backend: the internal scrape service returns a single payload.
#[async_trait]
impl ProductScraper for ScrapeServiceClient {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<Value>, SourceFailure> {
        let payload = ScrapeServiceClient::scrape(
            self,
            &request.url,
            request.max_pages,
            request.max_items,
        )
        .await?;
        Ok(vec![payload])
    }
}

// --- UrlResolver trait ---

/// Expands short or tracking links to the page they land on.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Never fails: an unresolvable link comes back unchanged.
    async fn resolve(&self, url: &str) -> String;
}

pub struct RedirectResolver {
    client: reqwest::Client,
}

impl RedirectResolver {
    pub fn new() -> Result<Self, SourceFailure> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceFailure::Unreachable(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UrlResolver for RedirectResolver {
    async fn resolve(&self, url: &str) -> String {
        match self.client.get(url).send().await {
            Ok(resp) => resp.url().to_string(),
            Err(e) => {
                warn!(url, error = %e, "Could not resolve link, using it as given");
                url.to_string()
            }
        }
    }
}

/// Leaves every URL untouched.
pub struct NoopResolver;

#[async_trait]
impl UrlResolver for NoopResolver {
    async fn resolve(&self, url: &str) -> String {
        url.to_string()
    }
}

// --- Primary/fallback orchestration ---

pub struct ProductScrapers {
    primary: Arc<dyn ProductScraper>,
    fallback: Arc<dyn ProductScraper>,
    resolver: Arc<dyn UrlResolver>,
}

impl ProductScrapers {
    pub fn new(
        primary: Arc<dyn ProductScraper>,
        fallback: Arc<dyn ProductScraper>,
        resolver: Arc<dyn UrlResolver>,
    ) -> Self {
        Self {
            primary,
            fallback,
            resolver,
        }
    }

    /// Try the primary scraper once on the resolved URL. If it fails or
    /// yields no product, try the fallback once on the URL as submitted.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeOutcome, ScrapeError> {
        let resolved = self.resolver.resolve(&request.url).await;
        if resolved != request.url {
            info!(url = %request.url, resolved = %resolved, "Resolved product link");
        }

        let primary_request = ScrapeRequest {
            url: resolved.clone(),
            ..request.clone()
        };
        let primary = match attempt(self.primary.as_ref(), &primary_request, &resolved).await {
            Ok((product, raw)) => {
                return Ok(ScrapeOutcome {
                    product,
                    raw,
                    provider: Provider::Primary,
                })
            }
            Err(failure) => failure,
        };
        warn!(url = %resolved, reason = %primary, "Primary scraper failed, trying fallback");

        match attempt(self.fallback.as_ref(), request, &resolved).await {
            Ok((product, raw)) => Ok(ScrapeOutcome {
                product,
                raw,
                provider: Provider::Fallback,
            }),
            Err(fallback) => {
                warn!(url = %request.url, reason = %fallback, "Fallback scraper failed");
                Err(ScrapeError { primary, fallback })
            }
        }
    }
}

async fn attempt(
    scraper: &dyn ProductScraper,
    request: &ScrapeRequest,
    resolved: &str,
) -> Result<(ScrapedProduct, Value), SourceFailure> {
    let items = scraper.scrape(request).await?;
    first_product(&items, resolved).ok_or(SourceFailure::NoResults)
}
