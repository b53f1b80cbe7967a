use crate::core::errors::FailureKind;
use crate::core::spider::ParseResult;
use crate::http::PageRequest;
use crate::items::{FailureRecord, ScrapedItem};
use crate::stats::{ScrapingStats, StatsTracker};
use crate::storage::{StorageCategory, StorageError, StorageManager};
use crate::{Scraper, ScraperError};
use chrono::Utc;
use log::{debug, error, info, trace, warn};
use parking_lot::RwLock;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{ScraperResult, Spider};

/// Drives a spider one page at a time: fetch, extract, write, then the
/// next page.
pub struct Crawler {
    scraper: Box<dyn Scraper>,
    storage: StorageManager,
    visited: Arc<RwLock<HashSet<String>>>,
    stats: Arc<StatsTracker>,
    run_id: Uuid,
}

impl Crawler {
    pub fn new(scraper: Box<dyn Scraper>, storage: StorageManager) -> Self {
        let run_id = Uuid::now_v7();
        info!("Initializing crawler (run {})", run_id);
        let stats = Arc::new(StatsTracker::new());
        let mut scraper = scraper;
        scraper.set_stats(Arc::clone(&stats));

        Self {
            scraper,
            storage,
            visited: Arc::new(RwLock::new(HashSet::new())),
            stats,
            run_id,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stats(&self) -> Arc<StatsTracker> {
        Arc::clone(&self.stats)
    }

    /// Crawls until the queue is empty.
    ///
    /// Pages that fail to load or extract are logged, counted and recorded
    /// as failures; the crawl moves on. A write failure ends the crawl and
    /// is returned. Each run starts with no visited pages and fresh stats.
    pub async fn run<S: Spider>(&self, spider: &S) -> ScraperResult<ScrapingStats> {
        let config = spider.config();
        info!("Starting spider: {}", spider.name());
        self.visited.write().clear();
        self.stats.reset();
        debug!(
            "Max depth: {}, page delay: {:?}",
            config.max_depth, config.page_delay
        );

        let mut queue = VecDeque::new();
        self.enqueue(&mut queue, spider.start_requests()?, spider);

        let mut pages = 0usize;
        let outcome: ScraperResult<()> = loop {
            let Some(request) = queue.pop_front() else {
                break Ok(());
            };
            if pages > 0 && !config.page_delay.is_zero() {
                trace!("Waiting {:?} before next page", config.page_delay);
                sleep(config.page_delay).await;
            }
            pages += 1;

            match self.process_request(&request, spider).await {
                Ok(ParseResult::Continue(requests)) => {
                    self.enqueue(&mut queue, requests, spider);
                }
                Ok(ParseResult::Items(items)) => {
                    if let Err(error) = self.write_items(&items).await {
                        break Err(error.into());
                    }
                }
                Err(error) if error.is_fatal() => break Err(error),
                Err(error) => {
                    if let Err(write_error) = self.record_failure(&request, &error).await {
                        break Err(write_error.into());
                    }
                    match spider.recover(&request, &error) {
                        Ok(requests) => self.enqueue(&mut queue, requests, spider),
                        Err(e) => warn!("No recovery for {}: {}", request.url, e),
                    }
                }
            }
        };

        self.stats.finish();
        let flushed = self.storage.flush().await;

        info!(
            "Spider {} completed. Pages processed: {}",
            spider.name(),
            pages
        );
        self.stats.print_summary();

        if let Err(error) = outcome {
            error!("Run {} aborted: {}", self.run_id, error);
            return Err(error);
        }
        flushed?;
        Ok(self.stats.get_stats())
    }

    /// Releases the fetcher. The crawler cannot fetch afterwards.
    pub async fn close(&self) {
        if let Err(e) = self.scraper.close().await {
            warn!("Failed to close {} fetcher: {}", self.scraper.name(), e);
        }
    }

    fn enqueue<S: Spider>(
        &self,
        queue: &mut VecDeque<PageRequest>,
        requests: Vec<PageRequest>,
        spider: &S,
    ) {
        let config = spider.config();
        for request in requests {
            if request.depth > 0 && request.depth >= config.max_depth {
                debug!("Skipping URL {} - max depth reached", request.url);
                continue;
            }

            let fingerprint = request.fingerprint();
            if !config.allow_url_revisit && !self.visited.write().insert(fingerprint) {
                debug!("Skipping URL {} - already visited", request.url);
                continue;
            }

            if let Some(meta) = &request.meta {
                trace!("Request metadata: {:?}", meta);
            }
            queue.push_back(request);
        }
    }

    async fn process_request<S: Spider>(
        &self,
        request: &PageRequest,
        spider: &S,
    ) -> ScraperResult<ParseResult> {
        info!(
            "Processing URL: {} ({:?}, depth {})",
            request.url, request.callback, request.depth
        );
        self.stats.record_page_requested();

        let response = self.scraper.fetch(request, spider.config()).await?;
        spider.parse(&response).await
    }

    async fn write_items(&self, items: &[ScrapedItem]) -> Result<(), StorageError> {
        for item in items {
            self.storage.store(item).await?;
            self.stats.record_written(item.category());
        }
        Ok(())
    }

    async fn record_failure(
        &self,
        request: &PageRequest,
        error: &ScraperError,
    ) -> Result<(), StorageError> {
        let kind = error.failure_kind();
        match kind {
            FailureKind::Load => warn!("Failed to load {}: {}", request.url, error),
            _ => warn!("Failed to extract {}: {}", request.url, error),
        }
        self.stats.record_failure(kind);

        if !self.storage.has_storage(&StorageCategory::Failures) {
            return Ok(());
        }
        let record = FailureRecord {
            run_id: self.run_id.to_string(),
            timestamp: Utc::now(),
            url: request.url.to_string(),
            callback: format!("{:?}", request.callback),
            kind: kind.as_str().to_string(),
            message: error.to_string(),
        };
        self.write_items(&[ScrapedItem::Failure(record)]).await
    }
}
