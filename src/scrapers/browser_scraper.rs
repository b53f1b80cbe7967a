//! Page fetcher driving a real browser through Playwright.
//!
//! Client-side rendered pages only expose their data after scripts run, so
//! every fetch navigates a long-lived page, replays the request's actions and
//! waits for the request's ready selector before capturing the DOM. Paginated
//! requests then keep clicking through the same page, one capture per step.

use async_trait::async_trait;
use log::{debug, info, warn};
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::Scraper;
use crate::core::spider::SpiderConfig;
use crate::http::{PageAction, PageRequest, PageResponse, Pagination};
use crate::{ScraperError, ScraperResult, StatsTracker};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub executable_path: Option<PathBuf>,
    pub user_agent: String,
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub navigation_timeout: Duration,
    /// Download the Playwright driver browsers before launching.
    pub install_browsers: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let headless = std::env::var("MATCHSCRAPER_HEADLESS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let executable_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            browser: BrowserKind::Chromium,
            headless,
            executable_path,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout: Duration::from_secs(60),
            install_browsers: false,
        }
    }
}

impl BrowserConfig {
    pub fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_install_browsers(mut self, install: bool) -> Self {
        self.install_browsers = install;
        self
    }
}

fn browser_error(error: impl std::fmt::Display) -> ScraperError {
    ScraperError::BrowserError(error.to_string())
}

/// Whether the page still needs `settle_delay` once `actions` ran. A click
/// settles on its own.
fn needs_settle(actions: &[PageAction]) -> bool {
    matches!(actions.last(), Some(action) if !matches!(action, PageAction::Click { .. }))
}

pub struct BrowserScraper {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    config: BrowserConfig,
    stats: Arc<StatsTracker>,
}

impl BrowserScraper {
    pub async fn launch(config: BrowserConfig) -> ScraperResult<Self> {
        let playwright = Playwright::initialize().await.map_err(browser_error)?;
        if config.install_browsers {
            info!("Installing Playwright browsers");
            playwright.prepare().map_err(browser_error)?;
        }

        let browser_type = match config.browser {
            BrowserKind::Chromium => playwright.chromium(),
            BrowserKind::Firefox => playwright.firefox(),
            BrowserKind::Webkit => playwright.webkit(),
        };

        let args: Vec<String> = match config.browser {
            BrowserKind::Chromium => [
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            _ => Vec::new(),
        };

        let mut launcher = browser_type.launcher().headless(config.headless);
        if let Some(ref path) = config.executable_path {
            info!("Using browser executable: {}", path.display());
            launcher = launcher.executable(path);
        }
        if !args.is_empty() {
            launcher = launcher.args(&args);
        }
        let browser = launcher.launch().await.map_err(browser_error)?;

        let context = browser
            .context_builder()
            .user_agent(&config.user_agent)
            .build()
            .await
            .map_err(browser_error)?;
        let page = context.new_page().await.map_err(browser_error)?;
        page.set_viewport_size(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
        })
        .await
        .map_err(browser_error)?;

        info!(
            "Launched {:?} browser (headless: {})",
            config.browser, config.headless
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            config,
            stats: Arc::new(StatsTracker::new()),
        })
    }

    async fn wait_for(
        page: &Page,
        request: &PageRequest,
        selector: &str,
        timeout: Duration,
    ) -> ScraperResult<()> {
        page.wait_for_selector_builder(selector)
            .timeout(timeout.as_millis() as f64)
            .wait_for_selector()
            .await
            .map_err(|e| {
                debug!("wait_for_selector({}) failed: {}", selector, e);
                ScraperError::WaitTimeout {
                    url: request.url.clone(),
                    selector: selector.to_string(),
                    timeout,
                }
            })?;
        Ok(())
    }

    async fn perform(
        page: &Page,
        request: &PageRequest,
        action: &PageAction,
        config: &SpiderConfig,
    ) -> ScraperResult<()> {
        debug!("Performing {:?} on {}", action, request.url);
        match action {
            PageAction::Click { selector } => {
                Self::wait_for(page, request, selector, config.wait_timeout).await?;
                page.click_builder(selector)
                    .click()
                    .await
                    .map_err(browser_error)?;
                sleep(config.settle_delay).await;
            }
            PageAction::ScrollTo { y } => {
                page.evaluate::<i32, ()>("y => window.scrollTo(0, y)", *y)
                    .await
                    .map_err(browser_error)?;
            }
        }
        Ok(())
    }

    /// Moves one page back and captures it.
    async fn advance(
        page: &Page,
        request: &PageRequest,
        pagination: &Pagination,
        config: &SpiderConfig,
    ) -> ScraperResult<String> {
        let click = PageAction::Click {
            selector: pagination.control.clone(),
        };
        Self::perform(page, request, &click, config).await?;
        if let Some(ref selector) = request.wait_for {
            Self::wait_for(page, request, selector, config.wait_timeout).await?;
        }
        page.content().await.map_err(browser_error)
    }

    /// Clicks back through the pager until it is exhausted or `max_pages`
    /// captures are held. A failed step ends the walk with what was captured.
    async fn paginate(
        page: &Page,
        request: &PageRequest,
        pagination: &Pagination,
        config: &SpiderConfig,
        response: &mut PageResponse,
    ) {
        while response.capture_count() < pagination.max_pages {
            match pagination.can_advance(response.last_capture()) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("Cannot read pager on {}: {}", request.url, e);
                    break;
                }
            }
            match Self::advance(page, request, pagination, config).await {
                Ok(content) => response.pages.push(content),
                Err(e) => {
                    warn!(
                        "Paging {} stopped after {} capture(s): {}",
                        request.url,
                        response.capture_count(),
                        e
                    );
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl Scraper for BrowserScraper {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch_single(
        &self,
        request: &PageRequest,
        config: &SpiderConfig,
    ) -> ScraperResult<PageResponse> {
        let page = self.page.lock().await;

        let navigation = page
            .goto_builder(request.url.as_str())
            .timeout(self.config.navigation_timeout.as_millis() as f64)
            .goto()
            .await
            .map_err(browser_error)?;
        let status = navigation
            .and_then(|response| response.status().ok())
            .and_then(|status| u16::try_from(status).ok())
            .unwrap_or(200);

        match request.wait_for {
            Some(ref selector) => {
                Self::wait_for(&page, request, selector, config.wait_timeout).await?
            }
            None => sleep(config.settle_delay).await,
        }

        if !request.actions.is_empty() {
            for action in &request.actions {
                Self::perform(&page, request, action, config).await?;
            }
            if needs_settle(&request.actions) {
                sleep(config.settle_delay).await;
            }
            if let Some(ref selector) = request.wait_for {
                Self::wait_for(&page, request, selector, config.wait_timeout).await?;
            }
        }

        let content = page.content().await.map_err(browser_error)?;
        let mut response = PageResponse::new(request, status, content);
        if let Some(ref pagination) = request.pagination {
            Self::paginate(&page, request, pagination, config, &mut response).await;
        }
        Ok(response)
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }

    async fn close(&self) -> ScraperResult<()> {
        info!("Closing browser");
        self.browser.close().await.map_err(browser_error)
    }
}
