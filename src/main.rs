use anyhow::{bail, Context};
use log::info;
use std::env;
use std::path::PathBuf;
use url::Url;

use matchscraper::core::retry::RetryConfig;
use matchscraper::core::spider::SpiderConfig;
use matchscraper::scrapers::{BrowserConfig, BrowserScraper, HttpScraper};
use matchscraper::spiders::{CrawlTarget, WhoScoredSpider};
use matchscraper::storage::{create_storage, StorageType};
use matchscraper::{Crawler, Scraper, StorageManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetcherKind {
    Browser,
    Http,
}

#[derive(Debug)]
struct RunSettings {
    target: CrawlTarget,
    output: PathBuf,
    format: OutputFormat,
    fetcher: FetcherKind,
    retry: bool,
}

impl RunSettings {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the settings through `var`, which maps a variable name to its value.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let target = match var("MATCHSCRAPER_MATCH_URLS") {
            Some(urls) if !urls.trim().is_empty() => {
                let urls = urls
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|u| !u.is_empty())
                    .map(|u| Url::parse(u).with_context(|| format!("invalid match URL `{}`", u)))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                CrawlTarget::Matches(urls)
            }
            _ => CrawlTarget::Season {
                competition: var("MATCHSCRAPER_COMPETITION")
                    .unwrap_or_else(|| "Bundesliga".to_string()),
                season: var("MATCHSCRAPER_SEASON").unwrap_or_else(|| "2023/2024".to_string()),
            },
        };

        let format = match var("MATCHSCRAPER_FORMAT").as_deref() {
            Some("tsv") => OutputFormat::Tsv,
            Some("csv") | None => OutputFormat::Csv,
            Some(other) => bail!("unknown output format `{}` (expected csv or tsv)", other),
        };

        let fetcher = match var("MATCHSCRAPER_FETCHER").as_deref() {
            Some("http") => FetcherKind::Http,
            Some("browser") | None => FetcherKind::Browser,
            Some(other) => bail!("unknown fetcher `{}` (expected browser or http)", other),
        };

        Ok(Self {
            target,
            output: var("MATCHSCRAPER_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            format,
            fetcher,
            retry: var("MATCHSCRAPER_RETRY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .parse_default_env()
        .init();

    let settings = RunSettings::from_env()?;
    info!("Run settings: {:?}", settings);

    let storage_type = match settings.format {
        OutputFormat::Csv => StorageType::Csv {
            path: settings.output.clone(),
        },
        OutputFormat::Tsv => StorageType::Tsv {
            path: settings.output.clone(),
        },
    };
    let storage = create_storage(storage_type)
        .with_context(|| format!("cannot prepare output in {}", settings.output.display()))?;
    let storage_manager = StorageManager::new().register_all(storage);

    let mut spider_config = SpiderConfig::default();
    if settings.retry {
        spider_config = spider_config.with_retry(RetryConfig::page_loads());
    }
    let spider = WhoScoredSpider::new(settings.target)?.with_config(spider_config);

    let scraper: Box<dyn Scraper> = match settings.fetcher {
        FetcherKind::Browser => Box::new(
            BrowserScraper::launch(BrowserConfig::default())
                .await
                .context("failed to launch browser")?,
        ),
        FetcherKind::Http => Box::new(HttpScraper::new()?),
    };

    let crawler = Crawler::new(scraper, storage_manager);
    let outcome = crawler.run(&spider).await;
    crawler.close().await;
    let stats = outcome?;
    info!(
        "Done: {} page(s) loaded, {} failed",
        stats.pages_loaded,
        stats.load_failures + stats.extraction_failures
    );

    Ok(())
}
