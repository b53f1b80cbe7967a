use crate::storage::base::StorageError;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: Url },

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Timed out after {timeout:?} waiting for `{selector}` on {url}")]
    WaitTimeout {
        url: Url,
        selector: String,
        timeout: Duration,
    },

    #[error("Element `{selector}` not present on {url}")]
    ElementNotFound { url: Url, selector: String },

    #[error("Page actions are not supported by the {0} fetcher")]
    ActionsUnsupported(&'static str),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Season `{season}` not found. Seasons available: {available:?}")]
    SeasonNotFound {
        season: String,
        available: Vec<String>,
    },

    #[error("Competition `{competition}` not found. Competitions available: {available:?}")]
    CompetitionNotFound {
        competition: String,
        available: Vec<String>,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

pub type ScraperResult<T> = Result<T, ScraperError>;

/// How the crawler treats an error raised while handling one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The page could not be loaded; skip it and continue.
    Load,
    /// The page loaded but its data could not be extracted; skip it and continue.
    Extraction,
    /// The output destination or the fetcher setup is unusable; abort the run.
    Fatal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Load => "load",
            FailureKind::Extraction => "extraction",
            FailureKind::Fatal => "fatal",
        }
    }
}

impl ScraperError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::HttpError(_)
            | ScraperError::HttpStatus { .. }
            | ScraperError::BrowserError(_)
            | ScraperError::WaitTimeout { .. }
            | ScraperError::ElementNotFound { .. }
            | ScraperError::ActionsUnsupported(_) => FailureKind::Load,
            ScraperError::UrlError(_)
            | ScraperError::JsonError(_)
            | ScraperError::ExtractionError(_)
            | ScraperError::SeasonNotFound { .. }
            | ScraperError::CompetitionNotFound { .. } => FailureKind::Extraction,
            ScraperError::StorageError(_) | ScraperError::InvalidHeader(_) => FailureKind::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.failure_kind() == FailureKind::Fatal
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        ScraperError::ExtractionError(msg.into())
    }
}
