//! Read-path deduplication for lists of content before they are shown.
//!
//! The store guarantees slug uniqueness, but the same story picked up from
//! two feeds lands under two slugs. This pass catches those by also keying
//! on normalized title plus calendar day. It never touches the store.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::ContentRecord;

/// What the dedup filter needs to know about a list item.
pub trait DedupKeys {
    /// Stable identity: slug, falling back to id.
    fn identity_key(&self) -> Option<String>;
    fn dedup_title(&self) -> Option<&str>;
    /// Publication (or creation) day.
    fn dedup_date(&self) -> Option<NaiveDate>;
}

/// Lower-case, collapse every punctuation/whitespace run to one space, trim.
pub fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_space = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

fn title_day_key<T: DedupKeys>(item: &T) -> Option<String> {
    let title = normalize_title(item.dedup_title()?);
    if title.is_empty() {
        return None;
    }
    let day = item.dedup_date()?;
    Some(format!("{title}|{day}"))
}

/// Drop later items that share either key with an earlier kept item.
/// Order of first occurrences is preserved. Items with neither key are kept.
pub fn dedup_records<T: DedupKeys>(items: Vec<T>) -> Vec<T> {
    let mut seen_ids = HashSet::new();
    let mut seen_titles = HashSet::new();

    items
        .into_iter()
        .filter(|item| {
            let id_key = item.identity_key().filter(|k| !k.is_empty());
            let title_key = title_day_key(item);

            let id_dup = id_key.as_ref().is_some_and(|k| seen_ids.contains(k));
            let title_dup = title_key.as_ref().is_some_and(|k| seen_titles.contains(k));
            if id_dup || title_dup {
                return false;
            }

            if let Some(k) = id_key {
                seen_ids.insert(k);
            }
            if let Some(k) = title_key {
                seen_titles.insert(k);
            }
            true
        })
        .collect()
}

impl DedupKeys for ContentRecord {
    fn identity_key(&self) -> Option<String> {
        if self.slug.is_empty() {
            Some(self.id.to_string())
        } else {
            Some(self.slug.clone())
        }
    }

    fn dedup_title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn dedup_date(&self) -> Option<NaiveDate> {
        Some(self.published_at.unwrap_or(self.created_at).date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        slug: Option<&'static str>,
        title: Option<&'static str>,
        day: Option<u32>,
    }

    impl DedupKeys for Item {
        fn identity_key(&self) -> Option<String> {
            self.slug.map(String::from)
        }
        fn dedup_title(&self) -> Option<&str> {
            self.title
        }
        fn dedup_date(&self) -> Option<NaiveDate> {
            self.day.and_then(|d| NaiveDate::from_ymd_opt(2024, 9, d))
        }
    }

    fn item(slug: Option<&'static str>, title: Option<&'static str>, day: Option<u32>) -> Item {
        Item { slug, title, day }
    }

    #[test]
    fn normalize_title_collapses_punctuation() {
        assert_eq!(normalize_title("  Phone Launch!!  Today?? "), "phone launch today");
        assert_eq!(normalize_title("Phone-Launch"), "phone launch");
        assert_eq!(normalize_title("..."), "");
    }

    #[test]
    fn same_title_same_day_different_slug_keeps_first() {
        let items = vec![
            item(Some("phone-launch-abc"), Some("Phone Launch"), Some(10)),
            item(Some("phone-launch-xyz"), Some("Phone launch!"), Some(10)),
        ];
        let out = dedup_records(items.clone());
        assert_eq!(out, vec![items[0].clone()]);
    }

    #[test]
    fn same_title_different_day_is_kept() {
        let items = vec![
            item(Some("a"), Some("Phone Launch"), Some(10)),
            item(Some("b"), Some("Phone Launch"), Some(11)),
        ];
        assert_eq!(dedup_records(items).len(), 2);
    }

    #[test]
    fn same_slug_is_dropped_even_with_other_title() {
        let items = vec![
            item(Some("a"), Some("First"), Some(1)),
            item(Some("a"), Some("Second"), Some(2)),
        ];
        assert_eq!(dedup_records(items).len(), 1);
    }

    #[test]
    fn keyless_items_are_always_kept() {
        let items = vec![
            item(None, Some("Untimed"), None),
            item(None, Some("Untimed"), None),
            item(None, None, Some(3)),
            item(None, None, Some(3)),
        ];
        assert_eq!(dedup_records(items).len(), 4);
    }

    #[test]
    fn preserves_order_and_is_idempotent() {
        let items = vec![
            item(Some("c"), Some("Gamma"), Some(3)),
            item(Some("a"), Some("Alpha"), Some(1)),
            item(Some("b"), Some("Gamma"), Some(3)),
            item(Some("a"), Some("Alpha again"), Some(2)),
            item(None, Some("Beta"), Some(1)),
            item(Some("d"), Some("beta"), Some(1)),
        ];
        let once = dedup_records(items.clone());
        let slugs: Vec<_> = once.iter().map(|i| i.slug).collect();
        assert_eq!(slugs, vec![Some("c"), Some("a"), None]);
        assert!(once.len() <= items.len());

        let twice = dedup_records(once.clone());
        assert_eq!(once, twice);
    }
}
