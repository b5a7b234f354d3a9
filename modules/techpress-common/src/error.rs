use thiserror::Error;

pub type Result<T> = std::result::Result<T, TechpressError>;

#[derive(Error, Debug)]
pub enum TechpressError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Source fetch error: {0}")]
    SourceFetch(String),

    #[error("Scraping error: {0}")]
    Scrape(String),

    #[error("Database error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl TechpressError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TechpressError::Validation(msg.into())
    }
}
