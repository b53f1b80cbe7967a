mod crawler;
mod errors;
pub mod retry;
pub mod spider;

pub use crawler::Crawler;
pub use errors::{FailureKind, ScraperError, ScraperResult};
pub use spider::{ParseResult, Spider, SpiderCallback, SpiderConfig};
