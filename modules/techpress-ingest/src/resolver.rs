//! Identity resolution: decide whether an incoming item updates an
//! existing record or becomes a new one.

use uuid::Uuid;

use techpress_common::{ContentRecord, InventoryDraft, InventoryRecord};
use techpress_store::{ContentStore, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Caller named the record to update. Taken on trust.
    Explicit(Uuid),
    /// An existing record matched on a natural key.
    Matched(T),
    New,
}

impl<T> Resolution<T> {
    pub fn is_new(&self) -> bool {
        matches!(self, Resolution::New)
    }
}

/// Resolve content by explicit id, else by exact title.
pub async fn resolve_content(
    store: &dyn ContentStore,
    explicit_id: Option<Uuid>,
    title: &str,
) -> Result<Resolution<ContentRecord>> {
    if let Some(id) = explicit_id {
        return Ok(Resolution::Explicit(id));
    }
    Ok(match store.find_content_by_title(title).await? {
        Some(existing) => Resolution::Matched(existing),
        None => Resolution::New,
    })
}

/// Resolve inventory by explicit id, else by source or affiliate URL.
/// Without either URL there is nothing to match on.
pub async fn resolve_inventory(
    store: &dyn ContentStore,
    explicit_id: Option<Uuid>,
    draft: &InventoryDraft,
) -> Result<Resolution<InventoryRecord>> {
    if let Some(id) = explicit_id {
        return Ok(Resolution::Explicit(id));
    }
    let found = store
        .find_inventory_by_urls(draft.source_url.as_deref(), draft.affiliate_url.as_deref())
        .await?;
    Ok(match found {
        Some(existing) => Resolution::Matched(existing),
        None => Resolution::New,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use techpress_common::{ContentDraft, ContentStatus, ContentType};
    use techpress_store::MemoryStore;

    use super::*;

    fn inventory(source_url: Option<&str>) -> InventoryDraft {
        InventoryDraft {
            title: "Pixel 9".into(),
            brand: None,
            model: None,
            affiliate_url: None,
            source_url: source_url.map(String::from),
            price: None,
            images: Vec::new(),
            specs: BTreeMap::new(),
            author_id: None,
        }
    }

    #[tokio::test]
    async fn explicit_id_is_returned_without_lookup() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let res = resolve_content(&store, Some(id), "Anything").await.unwrap();
        assert_eq!(res, Resolution::Explicit(id));
    }

    #[tokio::test]
    async fn content_matches_on_exact_title_only() {
        let store = MemoryStore::new();
        let draft = ContentDraft {
            slug: "phone-launch".into(),
            title: "Phone Launch".into(),
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
        };
        let created = store.upsert_content(&draft).await.unwrap();

        match resolve_content(&store, None, "Phone Launch").await.unwrap() {
            Resolution::Matched(r) => assert_eq!(r.id, created.id),
            other => panic!("expected match, got {other:?}"),
        }
        assert!(resolve_content(&store, None, "phone launch").await.unwrap().is_new());
    }

    #[tokio::test]
    async fn inventory_without_urls_is_always_new() {
        let store = MemoryStore::new();
        store.insert_inventory(&inventory(None)).await.unwrap();
        assert!(resolve_inventory(&store, None, &inventory(None)).await.unwrap().is_new());

        let id = store
            .insert_inventory(&inventory(Some("https://shop.example/pixel")))
            .await
            .unwrap();
        match resolve_inventory(&store, None, &inventory(Some("https://shop.example/pixel")))
            .await
            .unwrap()
        {
            Resolution::Matched(r) => assert_eq!(r.id, id),
            other => panic!("expected match, got {other:?}"),
        }
    }
}
