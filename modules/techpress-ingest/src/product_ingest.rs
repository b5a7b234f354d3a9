use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use techpress_common::canonical::canonicalize;
use techpress_common::{
    ContentDraft, ContentStatus, ContentType, InventoryDraft, Result, TechpressError,
};

use crate::product::parse_price;
use crate::resolver::{resolve_content, resolve_inventory, Resolution};
use crate::scrape::{ScrapeOutcome, ScrapeRequest};
use crate::Ingestor;

/// A product submitted for ingestion. `title`, `author_id` and
/// `category_id` are required; everything else is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSubmission {
    pub title: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub affiliate_url: Option<String>,
    pub source_url: Option<String>,
    /// Number or display string such as `"$349.99"`.
    pub price: Option<Value>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specs: BTreeMap<String, Value>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: Option<ContentStatus>,
    pub inventory_id: Option<Uuid>,
    pub content_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductIngestResult {
    pub content_id: Uuid,
    pub slug: String,
    pub inventory_id: Uuid,
}

struct Required {
    title: String,
    author_id: Uuid,
    category_id: Uuid,
}

impl ProductSubmission {
    fn required(&self) -> Result<Required> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        match (title, self.author_id, self.category_id) {
            (Some(title), Some(author_id), Some(category_id)) => Ok(Required {
                title: title.to_string(),
                author_id,
                category_id,
            }),
            _ => Err(TechpressError::validation(
                "title, author_id and category_id are required",
            )),
        }
    }

    fn price(&self) -> Result<Option<f64>> {
        match &self.price {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => parse_price(s)
                .map(Some)
                .ok_or_else(|| TechpressError::validation(format!("unreadable price {s:?}"))),
            Some(other) => Err(TechpressError::validation(format!(
                "price must be a number or string, got {other}"
            ))),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl Ingestor {
    /// Store a product as an inventory record plus a product content record
    /// linked to it. Inventory is written first; if the content write then
    /// fails the inventory row stays behind unlinked and the error is
    /// returned. A slug already held by non-product content is rejected
    /// before anything is written.
    pub async fn ingest_product(&self, submission: ProductSubmission) -> Result<ProductIngestResult> {
        let required = submission.required()?;
        let supplied_slug = non_blank(&submission.slug);
        let canonical = canonicalize(
            ContentType::Product,
            &required.title,
            submission.content.as_deref(),
            supplied_slug.as_deref(),
            submission.excerpt.as_deref(),
        );
        if canonical.slug.is_empty() {
            return Err(TechpressError::validation(
                "slug is empty; supply a slug or a title with letters or digits",
            ));
        }

        let inventory = InventoryDraft {
            title: required.title.clone(),
            brand: non_blank(&submission.brand),
            model: non_blank(&submission.model),
            affiliate_url: non_blank(&submission.affiliate_url),
            source_url: non_blank(&submission.source_url),
            price: submission.price()?,
            images: submission.images.clone(),
            specs: submission.specs.clone(),
            author_id: Some(required.author_id),
        };

        let store = self.store.as_ref();
        let mut resolution =
            resolve_content(store, submission.content_id, &required.title).await?;
        if resolution.is_new() {
            if let Some(holder) = store.find_content_by_slug(&canonical.slug).await? {
                if holder.content_type != ContentType::Product {
                    return Err(TechpressError::validation(format!(
                        "slug {:?} already belongs to {} content",
                        canonical.slug, holder.content_type
                    )));
                }
                resolution = Resolution::Matched(holder);
            }
        }

        let inventory_id =
            match resolve_inventory(store, submission.inventory_id, &inventory).await? {
                Resolution::Explicit(id) => store.update_inventory(id, &inventory).await?,
                Resolution::Matched(existing) => {
                    info!(inventory_id = %existing.id, "Refreshing existing inventory");
                    store.update_inventory(existing.id, &inventory).await?
                }
                Resolution::New => store.insert_inventory(&inventory).await?,
            };

        let (existing_slug, existing_status) = match &resolution {
            Resolution::Matched(existing) => (Some(existing.slug.clone()), Some(existing.status)),
            Resolution::Explicit(id) => match store.find_content(*id).await? {
                Some(existing) => (Some(existing.slug), Some(existing.status)),
                None => (None, None),
            },
            Resolution::New => (None, None),
        };

        let status = submission
            .status
            .or(existing_status)
            .unwrap_or(ContentStatus::Draft);
        let slug = match (supplied_slug.is_some(), existing_slug) {
            (false, Some(stored)) => stored,
            _ => canonical.slug,
        };

        let draft = ContentDraft {
            slug,
            title: required.title.clone(),
            excerpt: canonical.excerpt,
            body: submission.content.clone(),
            content_type: ContentType::Product,
            status,
            category_id: Some(required.category_id),
            author_id: Some(required.author_id),
            inventory_id: Some(inventory_id),
            featured_image: submission.images.first().cloned(),
            source_url: non_blank(&submission.source_url),
            reading_time: canonical.reading_time,
            meta_title: Some(canonical.meta_title),
            meta_description: canonical.meta_description,
            published_at: (status == ContentStatus::Published).then(Utc::now),
        };

        let written = match resolution {
            Resolution::Explicit(id) => store.update_content(id, &draft).await,
            Resolution::Matched(existing) => store.update_content(existing.id, &draft).await,
            Resolution::New => store.upsert_content(&draft).await,
        };
        let content = written.map_err(|e| {
            warn!(
                %inventory_id,
                title = %required.title,
                error = %e,
                "Content write failed after inventory write; inventory left unlinked"
            );
            TechpressError::from(e)
        })?;

        info!(
            content_id = %content.id,
            slug = %content.slug,
            %inventory_id,
            "Product ingested"
        );
        Ok(ProductIngestResult {
            content_id: content.id,
            slug: content.slug,
            inventory_id,
        })
    }

    /// Scrape a product page, primary scraper first, fallback second.
    pub async fn scrape_product(&self, request: ScrapeRequest) -> Result<ScrapeOutcome> {
        if request.url.trim().is_empty() {
            return Err(TechpressError::validation("product_url is required"));
        }
        let outcome = self.scrapers.scrape(&request).await?;
        info!(
            url = %request.url,
            provider = ?outcome.provider,
            title = %outcome.product.title,
            "Product scraped"
        );
        Ok(outcome)
    }
}
