// Postgres implementation of the persistence gateway.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use techpress_common::{
    ContentDraft, ContentRecord, ContentRef, ContentStatus, ContentType, InventoryDraft,
    InventoryRecord,
};

use crate::error::{Result, StoreError};
use crate::ContentStore;

pub struct PgStore {
    pool: PgPool,
}

/// A row from the content table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    slug: String,
    title: String,
    excerpt: Option<String>,
    body: Option<String>,
    content_type: String,
    status: String,
    category_id: Option<Uuid>,
    author_id: Option<Uuid>,
    inventory_id: Option<Uuid>,
    featured_image: Option<String>,
    source_url: Option<String>,
    reading_time: i32,
    meta_title: Option<String>,
    meta_description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    view_count: i64,
    like_count: i64,
    is_featured: bool,
    is_indexable: bool,
}

impl TryFrom<ContentRow> for ContentRecord {
    type Error = StoreError;

    fn try_from(row: ContentRow) -> Result<Self> {
        let content_type = ContentType::parse(&row.content_type).ok_or_else(|| {
            StoreError::Corrupt(format!("content {} has type {:?}", row.id, row.content_type))
        })?;
        let status = ContentStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Corrupt(format!("content {} has status {:?}", row.id, row.status))
        })?;
        Ok(ContentRecord {
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            body: row.body,
            content_type,
            status,
            category_id: row.category_id,
            author_id: row.author_id,
            inventory_id: row.inventory_id,
            featured_image: row.featured_image,
            source_url: row.source_url,
            reading_time: row.reading_time,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            view_count: row.view_count,
            like_count: row.like_count,
            is_featured: row.is_featured,
            is_indexable: row.is_indexable,
        })
    }
}

/// A row from the inventory table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryRow {
    id: Uuid,
    title: String,
    brand: Option<String>,
    model: Option<String>,
    affiliate_url: Option<String>,
    source_url: Option<String>,
    price: Option<f64>,
    images: Vec<String>,
    specs: Json<BTreeMap<String, serde_json::Value>>,
    author_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        InventoryRecord {
            id: row.id,
            title: row.title,
            brand: row.brand,
            model: row.model,
            affiliate_url: row.affiliate_url,
            source_url: row.source_url,
            price: row.price,
            images: row.images,
            specs: row.specs.0,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RefRow {
    id: Uuid,
    slug: String,
}

impl From<RefRow> for ContentRef {
    fn from(row: RefRow) -> Self {
        ContentRef {
            id: row.id,
            slug: row.slug,
        }
    }
}

// Refresh rules shared by the slug upsert and the by-id update: optional
// fields only overwrite when supplied, published_at is never replaced.
const CONTENT_UPSERT: &str = r#"
    INSERT INTO content
        (slug, title, excerpt, body, content_type, status, category_id, author_id,
         inventory_id, featured_image, source_url, reading_time, meta_title,
         meta_description, published_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
    ON CONFLICT (slug) DO UPDATE SET
        title            = EXCLUDED.title,
        excerpt          = COALESCE(EXCLUDED.excerpt, content.excerpt),
        body             = COALESCE(EXCLUDED.body, content.body),
        reading_time     = CASE WHEN EXCLUDED.body IS NULL THEN content.reading_time
                                ELSE EXCLUDED.reading_time END,
        content_type     = EXCLUDED.content_type,
        status           = EXCLUDED.status,
        category_id      = COALESCE(EXCLUDED.category_id, content.category_id),
        author_id        = COALESCE(EXCLUDED.author_id, content.author_id),
        inventory_id     = COALESCE(EXCLUDED.inventory_id, content.inventory_id),
        featured_image   = COALESCE(EXCLUDED.featured_image, content.featured_image),
        source_url       = COALESCE(EXCLUDED.source_url, content.source_url),
        meta_title       = COALESCE(EXCLUDED.meta_title, content.meta_title),
        meta_description = COALESCE(EXCLUDED.meta_description, content.meta_description),
        published_at     = COALESCE(content.published_at, EXCLUDED.published_at),
        updated_at       = now()
    RETURNING id, slug
"#;

const CONTENT_UPDATE: &str = r#"
    UPDATE content SET
        slug             = $2,
        title            = $3,
        excerpt          = COALESCE($4, excerpt),
        body             = COALESCE($5, body),
        reading_time     = CASE WHEN $5 IS NULL THEN reading_time ELSE $13 END,
        content_type     = $6,
        status           = $7,
        category_id      = COALESCE($8, category_id),
        author_id        = COALESCE($9, author_id),
        inventory_id     = COALESCE($10, inventory_id),
        featured_image   = COALESCE($11, featured_image),
        source_url       = COALESCE($12, source_url),
        meta_title       = COALESCE($14, meta_title),
        meta_description = COALESCE($15, meta_description),
        published_at     = COALESCE(published_at, $16),
        updated_at       = now()
    WHERE id = $1
    RETURNING id, slug
"#;

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        info!("store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn find_content(&self, id: Uuid) -> Result<Option<ContentRecord>> {
        let row = sqlx::query_as::<_, ContentRow>("SELECT * FROM content WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ContentRecord::try_from).transpose()
    }

    async fn find_content_by_title(&self, title: &str) -> Result<Option<ContentRecord>> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT * FROM content
            WHERE title = $1
            ORDER BY updated_at DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ContentRecord::try_from).transpose()
    }

    async fn find_content_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>> {
        let row = sqlx::query_as::<_, ContentRow>("SELECT * FROM content WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ContentRecord::try_from).transpose()
    }

    async fn upsert_content(&self, d: &ContentDraft) -> Result<ContentRef> {
        let row = sqlx::query_as::<_, RefRow>(CONTENT_UPSERT)
            .bind(&d.slug)
            .bind(&d.title)
            .bind(&d.excerpt)
            .bind(&d.body)
            .bind(d.content_type.as_str())
            .bind(d.status.as_str())
            .bind(d.category_id)
            .bind(d.author_id)
            .bind(d.inventory_id)
            .bind(&d.featured_image)
            .bind(&d.source_url)
            .bind(d.reading_time)
            .bind(&d.meta_title)
            .bind(&d.meta_description)
            .bind(d.published_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_content(&self, id: Uuid, d: &ContentDraft) -> Result<ContentRef> {
        let row = sqlx::query_as::<_, RefRow>(CONTENT_UPDATE)
            .bind(id)
            .bind(&d.slug)
            .bind(&d.title)
            .bind(&d.excerpt)
            .bind(&d.body)
            .bind(d.content_type.as_str())
            .bind(d.status.as_str())
            .bind(d.category_id)
            .bind(d.author_id)
            .bind(d.inventory_id)
            .bind(&d.featured_image)
            .bind(&d.source_url)
            .bind(d.reading_time)
            .bind(&d.meta_title)
            .bind(&d.meta_description)
            .bind(d.published_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ContentRef::from).ok_or_else(|| StoreError::NotFound {
            kind: "content",
            id: id.to_string(),
        })
    }

    async fn list_published(
        &self,
        content_type: Option<ContentType>,
        limit: u32,
    ) -> Result<Vec<ContentRecord>> {
        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT * FROM content
            WHERE status = 'published'
              AND ($1::text IS NULL OR content_type = $1)
            ORDER BY COALESCE(published_at, created_at) DESC
            LIMIT $2
            "#,
        )
        .bind(content_type.map(|t| t.as_str()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn find_inventory(&self, id: Uuid) -> Result<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>("SELECT * FROM inventory WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(InventoryRecord::from))
    }

    async fn find_inventory_by_urls(
        &self,
        source_url: Option<&str>,
        affiliate_url: Option<&str>,
    ) -> Result<Option<InventoryRecord>> {
        if source_url.is_none() && affiliate_url.is_none() {
            return Ok(None);
        }
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT * FROM inventory
            WHERE ($1::text IS NOT NULL AND source_url = $1)
               OR ($2::text IS NOT NULL AND affiliate_url = $2)
            ORDER BY updated_at DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(source_url)
        .bind(affiliate_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(InventoryRecord::from))
    }

    async fn insert_inventory(&self, d: &InventoryDraft) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory
                (title, brand, model, affiliate_url, source_url, price, images, specs, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&d.title)
        .bind(&d.brand)
        .bind(&d.model)
        .bind(&d.affiliate_url)
        .bind(&d.source_url)
        .bind(d.price)
        .bind(&d.images)
        .bind(Json(&d.specs))
        .bind(d.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_inventory(&self, id: Uuid, d: &InventoryDraft) -> Result<Uuid> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE inventory SET
                title         = $2,
                brand         = COALESCE($3, brand),
                model         = COALESCE($4, model),
                affiliate_url = COALESCE($5, affiliate_url),
                source_url    = COALESCE($6, source_url),
                price         = COALESCE($7, price),
                images        = CASE WHEN cardinality($8::text[]) = 0 THEN images ELSE $8 END,
                specs         = CASE WHEN $9::jsonb = '{}'::jsonb THEN specs ELSE $9 END,
                author_id     = COALESCE($10, author_id),
                updated_at    = now()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&d.title)
        .bind(&d.brand)
        .bind(&d.model)
        .bind(&d.affiliate_url)
        .bind(&d.source_url)
        .bind(d.price)
        .bind(&d.images)
        .bind(Json(&d.specs))
        .bind(d.author_id)
        .fetch_optional(&self.pool)
        .await?;
        updated.ok_or_else(|| StoreError::NotFound {
            kind: "inventory",
            id: id.to_string(),
        })
    }

    async fn ensure_category(&self, name: &str, slug: &str) -> Result<Uuid> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO categories (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
