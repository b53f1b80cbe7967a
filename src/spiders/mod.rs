mod whoscored;

pub use whoscored::{CrawlTarget, WhoScoredSpider};
