pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{ProductScraperInput, RunData, RunPhase, StartUrl};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Longest single long-poll the API accepts for `waitForFinish`.
const MAX_WAIT_SECS: u64 = 60;

pub struct ApifyClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes or `window` elapses. Uses `waitForFinish`
    /// long-polling, so each request blocks server-side for up to 60s.
    pub async fn wait_for_run(&self, run_id: &str, window: Duration) -> Result<RunData> {
        let deadline = Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // Only a sub-second window reaches here with `None`: one plain status check.
            let wait_secs = long_poll_secs(remaining).unwrap_or(0);
            let url = format!(
                "{}/actor-runs/{}?waitForFinish={}",
                self.base_url, run_id, wait_secs
            );
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;
            let resp = ensure_success(resp).await?;

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            let run = api_resp.data;
            match run.phase() {
                RunPhase::Succeeded => return Ok(run),
                RunPhase::Failed => return Err(ApifyError::RunFailed(run.status)),
                RunPhase::Running => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if long_poll_secs(left).is_none() {
                        return Err(ApifyError::RunTimedOut {
                            status: run.status,
                            window_secs: window.as_secs(),
                        });
                    }
                    tracing::debug!(run_id, status = %run.status, "Run still in progress");
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Scrape product pages end-to-end: start run, poll, fetch results.
    /// Items are returned untyped; product actors disagree on field names.
    pub async fn scrape_products(
        &self,
        actor_id: &str,
        input: &ProductScraperInput,
        window: Duration,
    ) -> Result<Vec<serde_json::Value>> {
        let first_url = input.start_urls.first().map(|u| u.url.as_str()).unwrap_or("");
        tracing::info!(actor_id, url = first_url, "Starting product scrape");

        let run = self.start_run(actor_id, input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id, window).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<serde_json::Value> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(count = items.len(), "Fetched product items");

        Ok(items)
    }
}

/// Turn a non-2xx response into `ApifyError::Api` carrying the body text.
/// Seconds to long-poll for, or `None` once less than a second of the
/// window is left.
fn long_poll_secs(remaining: Duration) -> Option<u64> {
    match remaining.as_secs() {
        0 => None,
        secs => Some(secs.min(MAX_WAIT_SECS)),
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message,
    })
}
