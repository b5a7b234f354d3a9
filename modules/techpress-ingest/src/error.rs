use apify_client::ApifyError;
use newsapi_client::NewsApiError;
use scrape_service_client::ScrapeServiceError;
use techpress_common::TechpressError;
use thiserror::Error;

/// Why a source adapter call produced nothing usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceFailure {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider returned status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("run ended with status {0}")]
    RunFailed(String),

    #[error("run did not finish in time: {0}")]
    TimedOut(String),

    #[error("no usable results")]
    NoResults,

    #[error("unreadable response: {0}")]
    Unparseable(String),
}

impl From<ApifyError> for SourceFailure {
    fn from(err: ApifyError) -> Self {
        match err {
            ApifyError::Network(m) => SourceFailure::Unreachable(m),
            ApifyError::Api { status, message } => SourceFailure::Rejected { status, message },
            ApifyError::Parse(m) => SourceFailure::Unparseable(m),
            ApifyError::RunFailed(status) => SourceFailure::RunFailed(status),
            e @ ApifyError::RunTimedOut { .. } => SourceFailure::TimedOut(e.to_string()),
        }
    }
}

impl From<NewsApiError> for SourceFailure {
    fn from(err: NewsApiError) -> Self {
        match err {
            NewsApiError::Network(m) => SourceFailure::Unreachable(m),
            NewsApiError::Api { status, message } => SourceFailure::Rejected { status, message },
            NewsApiError::Rejected { code, message } => SourceFailure::Rejected {
                status: 200,
                message: format!("{code}: {message}"),
            },
            NewsApiError::Parse(m) => SourceFailure::Unparseable(m),
        }
    }
}

impl From<ScrapeServiceError> for SourceFailure {
    fn from(err: ScrapeServiceError) -> Self {
        match err {
            ScrapeServiceError::Network(m) => SourceFailure::Unreachable(m),
            ScrapeServiceError::Api { status, message } => {
                SourceFailure::Rejected { status, message }
            }
            ScrapeServiceError::Unsuccessful(m) => SourceFailure::RunFailed(m),
            ScrapeServiceError::Parse(m) => SourceFailure::Unparseable(m),
        }
    }
}

impl From<SourceFailure> for TechpressError {
    fn from(err: SourceFailure) -> Self {
        TechpressError::SourceFetch(err.to_string())
    }
}

/// Both product scrapers failed.
#[derive(Debug, Clone, Error)]
#[error("primary scraper failed ({primary}); fallback scraper failed ({fallback})")]
pub struct ScrapeError {
    pub primary: SourceFailure,
    pub fallback: SourceFailure,
}

impl From<ScrapeError> for TechpressError {
    fn from(err: ScrapeError) -> Self {
        TechpressError::Scrape(err.to_string())
    }
}
