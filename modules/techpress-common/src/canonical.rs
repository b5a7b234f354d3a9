//! Canonicalization: slugs, excerpts, reading time, and metadata defaults.
//!
//! Every length rule that depends on the kind of content is decided in
//! [`ContentType::slug_max_len`] and [`ContentType::excerpt_len`].

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ContentType;

pub const READING_SPEED_WPM: usize = 200;
pub const META_TITLE_MAX: usize = 60;
pub const META_DESCRIPTION_MAX: usize = 160;

const ELLIPSIS: &str = "...";

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

impl ContentType {
    /// Auto-ingested news gets longer slugs than editorial content.
    pub fn slug_max_len(self) -> usize {
        match self {
            ContentType::News => 100,
            ContentType::Review
            | ContentType::Video
            | ContentType::HowTo
            | ContentType::Comparison
            | ContentType::Product => 80,
        }
    }

    pub fn excerpt_len(self) -> usize {
        match self {
            ContentType::News => 250,
            ContentType::Review
            | ContentType::Video
            | ContentType::HowTo
            | ContentType::Comparison
            | ContentType::Product => 200,
        }
    }
}

/// Derived fields computed from a title and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonical {
    pub slug: String,
    pub excerpt: Option<String>,
    pub reading_time: i32,
    pub meta_title: String,
    pub meta_description: Option<String>,
}

/// Build the canonical derived fields. Caller-supplied slug and excerpt win
/// over generated ones; both are still normalized and cut to the length
/// rules of `content_type`.
pub fn canonicalize(
    content_type: ContentType,
    title: &str,
    body: Option<&str>,
    slug: Option<&str>,
    excerpt_override: Option<&str>,
) -> Canonical {
    let max = content_type.slug_max_len();
    let slug = match slug.map(|s| slugify(s, max)).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => slugify(title, max),
    };

    let excerpt_len = content_type.excerpt_len();
    let excerpt = excerpt_override
        .map(|e| excerpt(e, excerpt_len))
        .filter(|e| !e.is_empty())
        .or_else(|| body.map(|b| excerpt(b, excerpt_len)).filter(|e| !e.is_empty()));

    Canonical {
        slug,
        reading_time: body.map(reading_time).unwrap_or(0),
        meta_title: meta_title(title),
        meta_description: excerpt.as_deref().map(meta_description),
        excerpt,
    }
}

/// Lower-case, collapse every run of non-alphanumerics to one hyphen, trim
/// hyphens, and cut to `max_len` without leaving a trailing hyphen.
pub fn slugify(title: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    // ASCII-only, so byte length equals char length.
    slug.truncate(max_len);
    slug.trim_end_matches('-').to_string()
}

/// Plain-text excerpt: markup stripped, whitespace collapsed, cut to
/// `max_chars` with an ellipsis when anything was dropped.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let text = plain_text(body);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut = truncate_chars(&text, max_chars).trim_end();
    format!("{cut}{ELLIPSIS}")
}

/// Minutes to read at [`READING_SPEED_WPM`], rounded up.
pub fn reading_time(body: &str) -> i32 {
    let words = plain_text(body).split_whitespace().count();
    words.div_ceil(READING_SPEED_WPM) as i32
}

pub fn meta_title(title: &str) -> String {
    truncate_chars(title.trim(), META_TITLE_MAX).trim_end().to_string()
}

pub fn meta_description(excerpt: &str) -> String {
    truncate_chars(excerpt.trim(), META_DESCRIPTION_MAX)
        .trim_end()
        .to_string()
}

/// Longest prefix of `s` holding at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn plain_text(body: &str) -> String {
    let stripped = RE_TAG.replace_all(body, " ");
    RE_WS.replace_all(stripped.trim(), " ").into_owned()
}
