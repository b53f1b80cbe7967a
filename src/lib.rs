pub mod core;
pub mod http;
pub mod items;
pub mod parser;
pub mod scrapers;
pub mod spiders;
pub mod stats;
pub mod storage;

pub use core::Crawler;
pub use core::{FailureKind, ScraperError, ScraperResult, Spider};
pub use http::{PageRequest, PageResponse};
pub use items::{MatchRecord, ScrapedItem};
pub use parser::SiteSelectors;
pub use scrapers::Scraper;
pub use stats::StatsTracker;
pub use storage::StorageManager;
