use async_trait::async_trait;
use std::time::Duration;

use super::retry::RetryConfig;
use crate::http::{PageRequest, PageResponse};
use crate::items::ScrapedItem;
use crate::{ScraperError, ScraperResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpiderCallback {
    Bootstrap,
    ParseSeasons,
    ParseStages,
    ParseFixtures,
    ParseMatch,
}

#[derive(Debug)]
pub enum ParseResult {
    /// Follow-up pages to fetch.
    Continue(Vec<PageRequest>),
    /// Records extracted from the page, written in order.
    Items(Vec<ScrapedItem>),
}

#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Pagination steps are capped below this depth. Requests at depth 0
    /// always run.
    pub max_depth: usize,
    pub allow_url_revisit: bool,
    /// How long to wait for a request's `wait_for` selector.
    pub wait_timeout: Duration,
    /// Fixed delay used instead of a selector wait, and after each click.
    pub settle_delay: Duration,
    /// Pause between consecutive pages.
    pub page_delay: Duration,
    pub headers: Vec<(String, String)>,
    pub retry_config: RetryConfig,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            allow_url_revisit: false,
            wait_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(5),
            page_delay: Duration::from_secs(2),
            headers: Vec::new(),
            retry_config: RetryConfig::default(),
        }
    }
}

impl SpiderConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_allow_url_revisit(mut self, allow: bool) -> Self {
        self.allow_url_revisit = allow;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }
}

#[async_trait]
pub trait Spider: Send + Sync {
    fn name(&self) -> String;
    fn start_requests(&self) -> ScraperResult<Vec<PageRequest>>;
    fn config(&self) -> &SpiderConfig;

    /// Turns one loaded page into follow-up requests or records.
    ///
    /// An `Err` fails this page only, unless the error is fatal.
    async fn parse(&self, response: &PageResponse) -> ScraperResult<ParseResult>;

    /// Requests to try instead of one that failed to load or extract.
    fn recover(
        &self,
        _request: &PageRequest,
        _error: &ScraperError,
    ) -> ScraperResult<Vec<PageRequest>> {
        Ok(Vec::new())
    }
}
