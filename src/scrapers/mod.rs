pub mod browser_scraper;
pub mod http_scraper;
#[cfg(test)]
pub mod mock_scraper;

mod scraper;
pub use browser_scraper::{BrowserConfig, BrowserKind, BrowserScraper};
pub use http_scraper::HttpScraper;
pub use scraper::Scraper;
