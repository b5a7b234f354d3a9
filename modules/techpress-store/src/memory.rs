// In-process store with the same conflict and refresh rules as Postgres.
// Backs the pipeline tests and local runs without a database.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use techpress_common::{
    Category, ContentDraft, ContentRecord, ContentRef, ContentStatus, ContentType,
    InventoryDraft, InventoryRecord,
};

use crate::error::{Result, StoreError};
use crate::ContentStore;

#[derive(Default)]
struct State {
    content: Vec<ContentRecord>,
    inventory: Vec<InventoryRecord>,
    categories: Vec<Category>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_content_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent content write fail. Inventory writes still succeed.
    pub fn fail_content_writes(&self, fail: bool) {
        self.fail_content_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn content(&self) -> Vec<ContentRecord> {
        self.state.lock().await.content.clone()
    }

    pub async fn inventory(&self) -> Vec<InventoryRecord> {
        self.state.lock().await.inventory.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.lock().await.categories.clone()
    }

    fn check_content_writable(&self) -> Result<()> {
        if self.fail_content_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("content writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_content(&self, id: Uuid) -> Result<Option<ContentRecord>> {
        let state = self.state.lock().await;
        Ok(state.content.iter().find(|c| c.id == id).cloned())
    }

    async fn find_content_by_title(&self, title: &str) -> Result<Option<ContentRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .content
            .iter()
            .filter(|c| c.title == title)
            .min_by_key(|c| (Reverse(c.updated_at), c.id))
            .cloned())
    }

    async fn find_content_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>> {
        let state = self.state.lock().await;
        Ok(state.content.iter().find(|c| c.slug == slug).cloned())
    }

    async fn upsert_content(&self, draft: &ContentDraft) -> Result<ContentRef> {
        self.check_content_writable()?;
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(existing) = state.content.iter_mut().find(|c| c.slug == draft.slug) {
            draft.apply_to(existing, now);
            return Ok(ContentRef {
                id: existing.id,
                slug: existing.slug.clone(),
            });
        }

        let record = draft.clone().into_record(Uuid::new_v4(), now);
        let out = ContentRef {
            id: record.id,
            slug: record.slug.clone(),
        };
        state.content.push(record);
        Ok(out)
    }

    async fn update_content(&self, id: Uuid, draft: &ContentDraft) -> Result<ContentRef> {
        self.check_content_writable()?;
        let mut state = self.state.lock().await;
        if state
            .content
            .iter()
            .any(|c| c.id != id && c.slug == draft.slug)
        {
            return Err(StoreError::Rejected(format!(
                "slug {:?} already belongs to another record",
                draft.slug
            )));
        }
        let existing = state
            .content
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "content",
                id: id.to_string(),
            })?;
        draft.apply_to(existing, Utc::now());
        Ok(ContentRef {
            id: existing.id,
            slug: existing.slug.clone(),
        })
    }

    async fn list_published(
        &self,
        content_type: Option<ContentType>,
        limit: u32,
    ) -> Result<Vec<ContentRecord>> {
        let state = self.state.lock().await;
        let mut rows: Vec<ContentRecord> = state
            .content
            .iter()
            .filter(|c| c.status == ContentStatus::Published)
            .filter(|c| content_type.map_or(true, |t| c.content_type == t))
            .cloned()
            .collect();
        rows.sort_by_key(|c| Reverse(c.published_at.unwrap_or(c.created_at)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn find_inventory(&self, id: Uuid) -> Result<Option<InventoryRecord>> {
        let state = self.state.lock().await;
        Ok(state.inventory.iter().find(|i| i.id == id).cloned())
    }

    async fn find_inventory_by_urls(
        &self,
        source_url: Option<&str>,
        affiliate_url: Option<&str>,
    ) -> Result<Option<InventoryRecord>> {
        if source_url.is_none() && affiliate_url.is_none() {
            return Ok(None);
        }
        let state = self.state.lock().await;
        let hit = |field: &Option<String>, want: Option<&str>| {
            matches!((field.as_deref(), want), (Some(a), Some(b)) if a == b)
        };
        Ok(state
            .inventory
            .iter()
            .filter(|i| hit(&i.source_url, source_url) || hit(&i.affiliate_url, affiliate_url))
            .min_by_key(|i| (Reverse(i.updated_at), i.id))
            .cloned())
    }

    async fn insert_inventory(&self, draft: &InventoryDraft) -> Result<Uuid> {
        let mut state = self.state.lock().await;
        let record = draft.clone().into_record(Uuid::new_v4(), Utc::now());
        let id = record.id;
        state.inventory.push(record);
        Ok(id)
    }

    async fn update_inventory(&self, id: Uuid, draft: &InventoryDraft) -> Result<Uuid> {
        let mut state = self.state.lock().await;
        let existing = state
            .inventory
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "inventory",
                id: id.to_string(),
            })?;
        draft.apply_to(existing, Utc::now());
        Ok(id)
    }

    async fn ensure_category(&self, name: &str, slug: &str) -> Result<Uuid> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.categories.iter().find(|c| c.slug == slug) {
            return Ok(existing.id);
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        let id = category.id;
        state.categories.push(category);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn content(slug: &str, title: &str) -> ContentDraft {
        ContentDraft {
            slug: slug.into(),
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

    fn product(source_url: Option<&str>, affiliate_url: Option<&str>, price: f64) -> InventoryDraft {
        InventoryDraft {
            title: "Widget".into(),
            brand: None,
            model: None,
            affiliate_url: affiliate_url.map(String::from),
            source_url: source_url.map(String::from),
            price: Some(price),
            images: Vec::new(),
            specs: BTreeMap::new(),
            author_id: None,
        }
    }

    #[tokio::test]
    async fn upsert_on_same_slug_returns_same_id() {
        let store = MemoryStore::new();
        let a = store.upsert_content(&content("s", "T")).await.unwrap();
        let b = store.upsert_content(&content("s", "T2")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.content().await.len(), 1);
        assert_eq!(store.content().await[0].title, "T2");
    }

    #[tokio::test]
    async fn slug_lookup_finds_only_exact_slug() {
        let store = MemoryStore::new();
        let a = store.upsert_content(&content("phone-launch", "Phone Launch")).await.unwrap();
        let hit = store.find_content_by_slug("phone-launch").await.unwrap();
        assert_eq!(hit.map(|c| c.id), Some(a.id));
        assert!(store.find_content_by_slug("phone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_content_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_content(Uuid::new_v4(), &content("s", "T"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "content", .. }));
    }

    #[tokio::test]
    async fn title_lookup_prefers_most_recently_updated() {
        let store = MemoryStore::new();
        let older = store.upsert_content(&content("one", "Same")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = store.upsert_content(&content("two", "Same")).await.unwrap();
        assert_eq!(
            store.find_content_by_title("Same").await.unwrap().unwrap().id,
            newer.id
        );

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.update_content(older.id, &content("one", "Same")).await.unwrap();
        assert_eq!(
            store.find_content_by_title("Same").await.unwrap().unwrap().id,
            older.id
        );
    }

    #[tokio::test]
    async fn inventory_matches_either_url() {
        let store = MemoryStore::new();
        let id = store
            .insert_inventory(&product(Some("https://a"), Some("https://aff"), 10.0))
            .await
            .unwrap();
        let by_aff = store
            .find_inventory_by_urls(Some("https://other"), Some("https://aff"))
            .await
            .unwrap();
        assert_eq!(by_aff.map(|r| r.id), Some(id));
        assert!(store.find_inventory_by_urls(None, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_category_is_idempotent() {
        let store = MemoryStore::new();
        let a = store.ensure_category("Technology", "technology").await.unwrap();
        let b = store.ensure_category("Technology", "technology").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.categories().await.len(), 1);
    }

    #[tokio::test]
    async fn list_published_skips_drafts() {
        let store = MemoryStore::new();
        store.upsert_content(&content("live", "Live")).await.unwrap();
        let mut draft = content("wip", "WIP");
        draft.status = ContentStatus::Draft;
        store.upsert_content(&draft).await.unwrap();

        let rows = store.list_published(None, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, "live");
        assert!(store
            .list_published(Some(ContentType::Review), 10)
            .await
            .unwrap()
            .is_empty());
    }
}
