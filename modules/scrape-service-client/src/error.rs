use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeServiceError>;

#[derive(Debug, Error)]
pub enum ScrapeServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Scrape service reported failure: {0}")]
    Unsuccessful(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ScrapeServiceError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeServiceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapeServiceError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeServiceError::Parse(err.to_string())
    }
}
