use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// A start URL entry for crawler-style actor input.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Input for e-commerce product scraper actors.
/// Page and item limits are omitted when unset so the actor defaults apply.
#[derive(Debug, Clone, Serialize)]
pub struct ProductScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "maxPagesPerCrawl", skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

impl ProductScraperInput {
    pub fn single(url: &str, max_pages: Option<u32>, max_items: Option<u32>) -> Self {
        Self {
            start_urls: vec![StartUrl {
                url: url.to_string(),
            }],
            max_pages,
            max_items,
        }
    }
}

/// Actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Where a run sits in its lifecycle, derived from the raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Succeeded,
    Failed,
    Running,
}

impl RunData {
    pub fn phase(&self) -> RunPhase {
        match self.status.as_str() {
            "SUCCEEDED" => RunPhase::Succeeded,
            "FAILED" | "ABORTED" | "TIMED-OUT" => RunPhase::Failed,
            _ => RunPhase::Running,
        }
    }
}
