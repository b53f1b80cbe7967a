use crate::core::spider::SpiderConfig;
use crate::http::{PageRequest, PageResponse};
use crate::{ScraperError, ScraperResult, StatsTracker};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::core::retry::{RetryCategory, RetryConfig};

#[async_trait]
pub trait Scraper: Send + Sync {
    fn name(&self) -> &'static str;

    /// Loads one page once, without retries.
    async fn fetch_single(
        &self,
        request: &PageRequest,
        config: &SpiderConfig,
    ) -> ScraperResult<PageResponse>;

    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);

    async fn close(&self) -> ScraperResult<()> {
        Ok(())
    }

    /// Loads a page, applying the retry policy of `config`. Responses with an
    /// error status that survive the policy become `HttpStatus` errors.
    async fn fetch(
        &self,
        request: &PageRequest,
        config: &SpiderConfig,
    ) -> ScraperResult<PageResponse> {
        let start_time = Utc::now();
        let key = request.fingerprint();
        let retry_config = &config.retry_config;

        loop {
            info!("Fetching URL: {} ({})", request.url, self.name());
            let response = match self.fetch_single(request, config).await {
                Ok(response) => response,
                Err(error) => match retry_config.should_retry_error(&key, &error) {
                    Some((category, delay)) => {
                        warn!("Load failed for {}: {}", request.url, error);
                        self.backoff(retry_config, &key, category, delay).await;
                        continue;
                    }
                    None => return Err(error),
                },
            };
            debug!(
                "Received response: status={}, content_length={}",
                response.status,
                response.content.len()
            );

            if let Some((category, delay)) =
                retry_config.should_retry_response(&key, response.status, &response.content)
            {
                self.backoff(retry_config, &key, category, delay).await;
                continue;
            }

            let state = retry_config.get_retry_state(&key);
            info!(
                "Request completed for URL: {} (total_retries={}, status={})",
                request.url, state.total_retries, response.status
            );
            debug!("Retry history for {}: {:?}", request.url, state.counts);

            if response.status >= 400 {
                self.stats().record_status(response.status);
                return Err(ScraperError::HttpStatus {
                    status: response.status,
                    url: response.url,
                });
            }

            let duration = Utc::now().signed_duration_since(start_time);
            self.stats()
                .record_load(response.status, response.size(), duration);

            return Ok(PageResponse {
                retry_count: state.total_retries,
                retry_history: state.counts,
                ..response
            });
        }
    }

    async fn backoff(
        &self,
        retry_config: &RetryConfig,
        key: &str,
        category: RetryCategory,
        delay: Duration,
    ) {
        self.stats().record_retry(format!("{:?}", category));
        let state = retry_config.get_retry_state(key);
        warn!(
            "Retry triggered for {} (category={:?}, attempt={}/{}, delay={:?})",
            key,
            category,
            state.counts.get(&category).copied().unwrap_or(0),
            retry_config.max_retries(&category),
            delay
        );
        sleep(delay).await;
    }
}
