//! Persistence gateway for content, inventory, and categories.
//!
//! Every write is a single statement that either creates one row or updates
//! one row and returns its identity. There is no transaction spanning a
//! content row and the inventory row it links to.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use techpress_common::{
    ContentDraft, ContentRecord, ContentRef, ContentType, InventoryDraft, InventoryRecord,
};

/// Lookups that could match several rows resolve to the most recently
/// updated one, ties broken by id.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_content(&self, id: Uuid) -> Result<Option<ContentRecord>>;

    /// Exact title match.
    async fn find_content_by_title(&self, title: &str) -> Result<Option<ContentRecord>>;

    async fn find_content_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>>;

    /// Create, or refresh the row that already holds `draft.slug`.
    async fn upsert_content(&self, draft: &ContentDraft) -> Result<ContentRef>;

    /// Refresh the row with `id`. Fails with `NotFound` if it does not exist.
    async fn update_content(&self, id: Uuid, draft: &ContentDraft) -> Result<ContentRef>;

    /// Published content, newest publication first.
    async fn list_published(
        &self,
        content_type: Option<ContentType>,
        limit: u32,
    ) -> Result<Vec<ContentRecord>>;

    async fn find_inventory(&self, id: Uuid) -> Result<Option<InventoryRecord>>;

    /// Match on source_url or affiliate_url. Returns `None` when both are absent.
    async fn find_inventory_by_urls(
        &self,
        source_url: Option<&str>,
        affiliate_url: Option<&str>,
    ) -> Result<Option<InventoryRecord>>;

    async fn insert_inventory(&self, draft: &InventoryDraft) -> Result<Uuid>;

    /// Refresh the row with `id`. Fails with `NotFound` if it does not exist.
    async fn update_inventory(&self, id: Uuid, draft: &InventoryDraft) -> Result<Uuid>;

    /// Return the category with `slug`, creating it on first use.
    async fn ensure_category(&self, name: &str, slug: &str) -> Result<Uuid>;
}
