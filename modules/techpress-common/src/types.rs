use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Content ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    News,
    Review,
    Video,
    HowTo,
    Comparison,
    Product,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::News => "news",
            ContentType::Review => "review",
            ContentType::Video => "video",
            ContentType::HowTo => "how_to",
            ContentType::Comparison => "comparison",
            ContentType::Product => "product",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "news" => Some(Self::News),
            "review" => Some(Self::Review),
            "video" => Some(Self::Video),
            "how_to" => Some(Self::HowTo),
            "comparison" => Some(Self::Comparison),
            "product" => Some(Self::Product),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Pending,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical stored unit of published material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub featured_image: Option<String>,
    pub source_url: Option<String>,
    pub reading_time: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view_count: i64,
    pub like_count: i64,
    pub is_featured: bool,
    pub is_indexable: bool,
}

/// Write-side shape of a content record: everything ingestion controls.
/// Counters, flags and timestamps other than `published_at` belong to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub featured_image: Option<String>,
    pub source_url: Option<String>,
    pub reading_time: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentDraft {
    /// Refresh a stored record in place. Optional fields only overwrite when
    /// present, and an existing `published_at` is never replaced or cleared.
    pub fn apply_to(&self, record: &mut ContentRecord, now: DateTime<Utc>) {
        record.slug = self.slug.clone();
        record.title = self.title.clone();
        record.content_type = self.content_type;
        record.status = self.status;
        overwrite(&mut record.excerpt, &self.excerpt);
        if self.body.is_some() {
            record.reading_time = self.reading_time;
        }
        overwrite(&mut record.body, &self.body);
        overwrite(&mut record.category_id, &self.category_id);
        overwrite(&mut record.author_id, &self.author_id);
        overwrite(&mut record.inventory_id, &self.inventory_id);
        overwrite(&mut record.featured_image, &self.featured_image);
        overwrite(&mut record.source_url, &self.source_url);
        overwrite(&mut record.meta_title, &self.meta_title);
        overwrite(&mut record.meta_description, &self.meta_description);
        if record.published_at.is_none() {
            record.published_at = self.published_at;
        }
        record.updated_at = now;
    }

    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> ContentRecord {
        ContentRecord {
            id,
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            body: self.body,
            content_type: self.content_type,
            status: self.status,
            category_id: self.category_id,
            author_id: self.author_id,
            inventory_id: self.inventory_id,
            featured_image: self.featured_image,
            source_url: self.source_url,
            reading_time: self.reading_time,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            published_at: self.published_at,
            created_at: now,
            updated_at: now,
            view_count: 0,
            like_count: 0,
            is_featured: false,
            is_indexable: true,
        }
    }
}

fn overwrite<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) {
    if let Some(v) = incoming {
        *slot = Some(v.clone());
    }
}

/// Identity of a written content row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRef {
    pub id: Uuid,
    pub slug: String,
}

// --- Inventory ---

/// Physical-product fact sheet, optionally linked from a product ContentRecord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub title: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub affiliate_url: Option<String>,
    pub source_url: Option<String>,
    pub price: Option<f64>,
    pub images: Vec<String>,
    pub specs: BTreeMap<String, serde_json::Value>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryDraft {
    pub title: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub affiliate_url: Option<String>,
    pub source_url: Option<String>,
    pub price: Option<f64>,
    pub images: Vec<String>,
    pub specs: BTreeMap<String, serde_json::Value>,
    pub author_id: Option<Uuid>,
}

impl InventoryDraft {
    /// True if this draft matches a stored record on either product URL.
    pub fn shares_url_with(&self, record: &InventoryRecord) -> bool {
        let same = |a: &Option<String>, b: &Option<String>| matches!((a, b), (Some(x), Some(y)) if x == y);
        same(&self.source_url, &record.source_url) || same(&self.affiliate_url, &record.affiliate_url)
    }

    /// Refresh a stored record in place; absent fields keep their stored value.
    pub fn apply_to(&self, record: &mut InventoryRecord, now: DateTime<Utc>) {
        record.title = self.title.clone();
        overwrite(&mut record.brand, &self.brand);
        overwrite(&mut record.model, &self.model);
        overwrite(&mut record.affiliate_url, &self.affiliate_url);
        overwrite(&mut record.source_url, &self.source_url);
        overwrite(&mut record.price, &self.price);
        overwrite(&mut record.author_id, &self.author_id);
        if !self.images.is_empty() {
            record.images = self.images.clone();
        }
        if !self.specs.is_empty() {
            record.specs = self.specs.clone();
        }
        record.updated_at = now;
    }

    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> InventoryRecord {
        InventoryRecord {
            id,
            title: self.title,
            brand: self.brand,
            model: self.model,
            affiliate_url: self.affiliate_url,
            source_url: self.source_url,
            price: self.price,
            images: self.images,
            specs: self.specs,
            author_id: self.author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// --- Categories ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_round_trips_through_str() {
        for ct in [
            ContentType::News,
            ContentType::Review,
            ContentType::Video,
            ContentType::HowTo,
            ContentType::Comparison,
            ContentType::Product,
        ] {
            assert_eq!(ContentType::parse(ct.as_str()), Some(ct));
        }
        assert_eq!(ContentType::parse("podcast"), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ContentStatus::Published).unwrap(),
            serde_json::json!("published")
        );
        assert_eq!(ContentStatus::parse("pending"), Some(ContentStatus::Pending));
    }

    fn draft(title: &str) -> ContentDraft {
        ContentDraft {
            slug: "phone-launch".into(),
            title: title.into(),
            excerpt: None,
            body: None,
            content_type: ContentType::News,
            status: ContentStatus::Published,
            category_id: None,
            author_id: None,
            inventory_id: None,
            featured_image: None,
            source_url: None,
            reading_time: 0,
            meta_title: None,
            meta_description: None,
            published_at: None,
        }
    }

    #[test]
    fn content_refresh_never_clears_published_at() {
        let published = Utc::now() - chrono::Duration::days(3);
        let mut first = draft("Phone Launch");
        first.published_at = Some(published);
        first.excerpt = Some("original".into());
        let mut record = first.into_record(Uuid::new_v4(), Utc::now());

        let mut second = draft("Phone Launch");
        second.published_at = Some(Utc::now());
        second.apply_to(&mut record, Utc::now());
        assert_eq!(record.published_at, Some(published));
        assert_eq!(record.excerpt.as_deref(), Some("original"));

        draft("Phone Launch").apply_to(&mut record, Utc::now());
        assert_eq!(record.published_at, Some(published));
    }

    #[test]
    fn inventory_refresh_updates_price_and_keeps_brand() {
        let mut record = InventoryDraft {
            title: "Kindle".into(),
            brand: Some("Amazon".into()),
            model: None,
            affiliate_url: None,
            source_url: Some("https://shop.example/kindle".into()),
            price: Some(99.0),
            images: vec!["a.jpg".into()],
            specs: BTreeMap::new(),
            author_id: None,
        }
        .into_record(Uuid::new_v4(), Utc::now());

        let refresh = InventoryDraft {
            title: "Kindle Paperwhite".into(),
            brand: None,
            model: None,
            affiliate_url: None,
            source_url: Some("https://shop.example/kindle".into()),
            price: Some(89.0),
            images: Vec::new(),
            specs: BTreeMap::new(),
            author_id: None,
        };
        assert!(refresh.shares_url_with(&record));
        refresh.apply_to(&mut record, Utc::now());
        assert_eq!(record.price, Some(89.0));
        assert_eq!(record.brand.as_deref(), Some("Amazon"));
        assert_eq!(record.images, vec!["a.jpg".to_string()]);
        assert_eq!(record.title, "Kindle Paperwhite");
    }

    #[test]
    fn how_to_serializes_with_underscore() {
        assert_eq!(
            serde_json::to_value(ContentType::HowTo).unwrap(),
            serde_json::json!("how_to")
        );
    }
}
