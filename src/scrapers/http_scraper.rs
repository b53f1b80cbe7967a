use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use scraper::Html;
use std::sync::Arc;
use thiserror::Error;

use super::Scraper;
use crate::core::spider::SpiderConfig;
use crate::http::{PageRequest, PageResponse};
use crate::parser::SiteSelectors;
use crate::{ScraperError, ScraperResult, StatsTracker};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum HttpScraperError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] header::InvalidHeaderName),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}

impl From<HttpScraperError> for ScraperError {
    fn from(err: HttpScraperError) -> Self {
        match err {
            HttpScraperError::HttpError(e) => ScraperError::HttpError(e),
            other => ScraperError::InvalidHeader(other.to_string()),
        }
    }
}

/// Fetches server-rendered pages without a browser. Requests that need page
/// actions or pagination are rejected; the ready selector is checked against the returned
/// document instead of being waited for.
#[derive(Clone)]
pub struct HttpScraper {
    client: Client,
    stats: Arc<StatsTracker>,
}

impl HttpScraper {
    pub fn new() -> Result<Self, HttpScraperError> {
        let client = ClientBuilder::new()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            stats: Arc::new(StatsTracker::new()),
        })
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Result<Self, HttpScraperError> {
        let mut header_map = header::HeaderMap::new();
        header_map.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(DEFAULT_USER_AGENT),
        );

        for (key, value) in headers {
            let name = header::HeaderName::from_bytes(key.as_bytes())?;
            let value = header::HeaderValue::from_str(value)?;
            header_map.insert(name, value);
        }

        self.client = ClientBuilder::new().default_headers(header_map).build()?;

        Ok(self)
    }

    fn has_element(content: &str, selector: &str) -> ScraperResult<bool> {
        let parsed = SiteSelectors::compile(selector)?;
        let document = Html::parse_document(content);
        let found = document.select(&parsed).next().is_some();
        Ok(found)
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_single(
        &self,
        request: &PageRequest,
        config: &SpiderConfig,
    ) -> ScraperResult<PageResponse> {
        if !request.actions.is_empty() || request.pagination.is_some() {
            return Err(ScraperError::ActionsUnsupported("http"));
        }

        let mut req = self.client.get(request.url.clone());
        for (key, value) in &config.headers {
            req = req.header(key, value);
        }

        let response = req
            .timeout(config.wait_timeout)
            .send()
            .await
            .map_err(HttpScraperError::from)?;
        let status = response.status().as_u16();
        let content = response.text().await.map_err(HttpScraperError::from)?;

        if status < 400 {
            if let Some(ref selector) = request.wait_for {
                if !Self::has_element(&content, selector)? {
                    return Err(ScraperError::ElementNotFound {
                        url: request.url.clone(),
                        selector: selector.clone(),
                    });
                }
            }
        }

        Ok(PageResponse::new(request, status, content))
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}
