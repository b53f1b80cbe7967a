use crate::core::spider::SpiderConfig;
use crate::http::{PageRequest, PageResponse};
use crate::{ScraperError, ScraperResult, StatsTracker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::Scraper;

#[derive(Clone, Debug)]
pub enum MockPage {
    Page { status: u16, body: String },
    Timeout,
    LoadError(String),
}

impl MockPage {
    pub fn html(body: impl Into<String>) -> Self {
        MockPage::Page {
            status: 200,
            body: body.into(),
        }
    }
}

/// Serves canned pages by URL. Each fetch of a URL takes the next queued
/// page; the last one repeats. Unknown URLs fail to load. Paginated requests
/// keep taking pages of their URL as further captures until the pager ends
/// or a queued page fails.
#[derive(Clone, Default)]
pub struct MockScraper {
    pages: Arc<Mutex<HashMap<String, VecDeque<MockPage>>>>,
    fetched: Arc<Mutex<Vec<(PageRequest, Instant)>>>,
    stats: Arc<StatsTracker>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, page: MockPage) -> Self {
        self.pages
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(page);
        self
    }

    pub fn fetched(&self) -> Vec<PageRequest> {
        self.fetched.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    /// When each fetch started, in fetch order.
    pub fn fetch_times(&self) -> Vec<Instant> {
        self.fetched.lock().iter().map(|(_, at)| *at).collect()
    }

    fn next_page(&self, url: &str) -> Option<MockPage> {
        let mut pages = self.pages.lock();
        let queue = pages.get_mut(url)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Scraper for MockScraper {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_single(
        &self,
        request: &PageRequest,
        config: &SpiderConfig,
    ) -> ScraperResult<PageResponse> {
        self.fetched.lock().push((request.clone(), Instant::now()));

        match self.next_page(request.url.as_str()) {
            Some(MockPage::Page { status, body }) => {
                let mut response = PageResponse::new(request, status, body);
                if let Some(ref pagination) = request.pagination {
                    while response.capture_count() < pagination.max_pages
                        && pagination.can_advance(response.last_capture())?
                    {
                        match self.next_page(request.url.as_str()) {
                            Some(MockPage::Page { body, .. }) => response.pages.push(body),
                            _ => break,
                        }
                    }
                }
                Ok(response)
            }
            Some(MockPage::Timeout) => Err(ScraperError::WaitTimeout {
                url: request.url.clone(),
                selector: request.wait_for.clone().unwrap_or_default(),
                timeout: config.wait_timeout,
            }),
            Some(MockPage::LoadError(message)) => Err(ScraperError::BrowserError(message)),
            None => Err(ScraperError::BrowserError(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                request.url
            ))),
        }
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}

/// Config with every delay zeroed so tests do not sleep.
pub fn fast_config() -> SpiderConfig {
    SpiderConfig::default()
        .with_settle_delay(Duration::ZERO)
        .with_page_delay(Duration::ZERO)
        .with_wait_timeout(Duration::from_millis(10))
}
