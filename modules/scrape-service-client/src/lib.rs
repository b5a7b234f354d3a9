pub mod error;

pub use error::{Result, ScrapeServiceError};

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Serialize)]
struct ScrapeBody<'a> {
    url: &'a str,
    #[serde(rename = "maxPages", skip_serializing_if = "Option::is_none")]
    max_pages: Option<u32>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    max_items: Option<u32>,
}

pub struct ScrapeServiceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ScrapeServiceClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Scrape a product page via the service's `/scrape` endpoint and return
    /// the JSON payload as-is. A body of `{"success": false, "error": ...}`
    /// is treated as a failure even on a 2xx status.
    pub async fn scrape(
        &self,
        url: &str,
        max_pages: Option<u32>,
        max_items: Option<u32>,
    ) -> Result<serde_json::Value> {
        let endpoint = format!("{}/scrape", self.base_url);
        tracing::info!(url, "scrape service: requesting product");

        let mut req = self.client.post(&endpoint).json(&ScrapeBody {
            url,
            max_pages,
            max_items,
        });
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrapeServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = serde_json::from_str(&resp.text().await?)?;
        if body.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let message = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(ScrapeServiceError::Unsuccessful(message));
        }

        Ok(body)
    }
}
