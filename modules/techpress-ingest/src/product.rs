//! Normalizing scraped product payloads.
//!
//! Scrapers disagree on field names and shapes, so extraction probes a list
//! of known aliases per field and accepts strings, numbers, or nested
//! objects where providers are known to use them.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,\s]*").expect("valid price regex"));

/// A product in the fixed shape the scrape endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedProduct {
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub availability: Option<String>,
    /// Resolved page URL the product was read from.
    pub source: String,
}

/// Pick the first item that looks like a product and normalize it.
pub fn first_product(items: &[Value], source_url: &str) -> Option<(ScrapedProduct, Value)> {
    items
        .iter()
        .find_map(|item| extract_product(item, source_url).map(|p| (p, item.clone())))
}

/// Normalize one scraped item. `None` when it has no usable title.
pub fn extract_product(item: &Value, source_url: &str) -> Option<ScrapedProduct> {
    // The scrape service nests the product under `product`.
    let item = item.get("product").filter(|v| v.is_object()).unwrap_or(item);

    let title = first_string(item, &["title", "name", "productName"])?;

    Some(ScrapedProduct {
        title,
        description: first_string(item, &["description", "descriptionText", "about"]),
        images: images(item),
        price: first_price(item),
        rating: first_number(item, &["rating", "stars", "aggregateRating.ratingValue"]),
        brand: first_string(item, &["brand", "brand.name", "manufacturer"]),
        model: first_string(item, &["model", "modelNumber", "mpn", "sku"]),
        availability: availability(item),
        source: first_string(item, &["url", "canonicalUrl"])
            .unwrap_or_else(|| source_url.to_string()),
    })
}

/// Parse a display price such as `$1,299.99`, `1.299,99 €` or `349`.
///
/// When both separators appear the later one is the decimal point. A lone
/// comma followed by exactly two digits is a decimal comma; otherwise commas
/// group thousands.
pub fn parse_price(text: &str) -> Option<f64> {
    let raw: String = RE_PRICE
        .find(text)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let raw = raw.trim_end_matches([',', '.']);

    let normalized = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (Some(comma), None) => {
            let decimals = raw.len() - comma - 1;
            if decimals == 2 && raw.matches(',').count() == 1 {
                raw.replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (None, Some(_)) if raw.matches('.').count() > 1 => raw.replace('.', ""),
        _ => raw.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|p| p.is_finite() && *p >= 0.0)
}

// --- Field probing ---

fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |v, key| v.get(key))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => map.get("name").and_then(as_text),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        Value::Object(map) => ["value", "amount", "current"]
            .iter()
            .find_map(|k| map.get(*k).and_then(as_number)),
        _ => None,
    }
}

fn first_string(item: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|p| lookup(item, p).and_then(as_text))
}

fn first_number(item: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|p| lookup(item, p).and_then(as_number))
}

fn first_price(item: &Value) -> Option<f64> {
    first_number(
        item,
        &["price", "offers.price", "currentPrice", "salePrice", "priceText"],
    )
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => ["url", "src", "link"]
            .iter()
            .find_map(|k| map.get(*k).and_then(image_url)),
        _ => None,
    }
}

fn images(item: &Value) -> Vec<String> {
    for key in ["images", "imageUrls", "image", "mainImage", "thumbnail"] {
        let found: Vec<String> = match item.get(key) {
            Some(Value::Array(list)) => list.iter().filter_map(image_url).collect(),
            Some(other) => image_url(other).into_iter().collect(),
            None => continue,
        };
        if !found.is_empty() {
            let mut unique = Vec::with_capacity(found.len());
            for url in found {
                if !unique.contains(&url) {
                    unique.push(url);
                }
            }
            return unique;
        }
    }
    Vec::new()
}

fn availability(item: &Value) -> Option<String> {
    if let Some(text) = first_string(item, &["availability", "offers.availability", "stockStatus"]) {
        return Some(text);
    }
    match item.get("inStock") {
        Some(Value::Bool(true)) => Some("in_stock".to_string()),
        Some(Value::Bool(false)) => Some("out_of_stock".to_string()),
        _ => None,
    }
}
