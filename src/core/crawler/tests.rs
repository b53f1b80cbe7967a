use crate::items::ScrapedItem;
use crate::parser::listing::tests::{FIXTURES_PAGE, HOME_PAGE};
use crate::parser::match_centre::tests::match_page;
use crate::parser::match_header::tests::HEADER_PAGE;
use crate::scrapers::mock_scraper::{fast_config, MockPage, MockScraper};
use crate::spiders::{CrawlTarget, WhoScoredSpider};
use crate::storage::{
    CsvStorage, MemoryStorage, Storage, StorageCategory, StorageError, StorageManager,
};
use crate::{Crawler, ScraperError};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

const MATCH_A: &str =
    "https://www.whoscored.com/Matches/1/Live/Germany-Bundesliga-2023-2024-A-B";
const MATCH_B: &str =
    "https://www.whoscored.com/Matches/2/Live/Germany-Bundesliga-2023-2024-C-D";
const MATCH_C: &str =
    "https://www.whoscored.com/Matches/4/Live/Germany-Bundesliga-2023-2024-G-H";
const HOME: &str = "https://www.whoscored.com/";
const LEAGUE: &str = "https://www.whoscored.com/Regions/81/Tournaments/3/Germany-Bundesliga";
const SEASON: &str = "https://www.whoscored.com/Regions/81/Tournaments/3/Seasons/9649";

const LEAGUE_PAGE: &str = r#"<html><body>
    <select id="seasons">
      <option value="/Regions/81/Tournaments/3/Seasons/9649">2023/2024</option>
      <option value="/Regions/81/Tournaments/3/Seasons/9192">2022/2023</option>
    </select>
    </body></html>"#;

const SEASON_PAGE: &str = r#"<html><body>
    <select id="seasons">
      <option value="/Regions/81/Tournaments/3/Seasons/9649">2023/2024</option>
    </select>
    </body></html>"#;

fn match_spider(urls: &[&str]) -> WhoScoredSpider {
    let urls = urls.iter().map(|u| Url::parse(u).unwrap()).collect();
    WhoScoredSpider::new(CrawlTarget::Matches(urls))
        .unwrap()
        .with_config(fast_config())
}

fn season_spider() -> WhoScoredSpider {
    WhoScoredSpider::new(CrawlTarget::Season {
        competition: "Bundesliga".to_string(),
        season: "2023/2024".to_string(),
    })
    .unwrap()
    .with_config(fast_config())
}

fn memory_crawler(scraper: &MockScraper) -> (Crawler, MemoryStorage) {
    let memory = MemoryStorage::new();
    let manager = StorageManager::new().register_all(Storage::Memory(memory.clone()));
    (Crawler::new(Box::new(scraper.clone()), manager), memory)
}

fn last_week() -> String {
    FIXTURES_PAGE.replace("View previous week", "No data for previous week")
}

/// The oldest week of the season, listing one match not seen in later weeks.
fn older_week() -> String {
    last_week().replace(
        "/Matches/2/Live/Germany-Bundesliga-2023-2024-C-D",
        "/Matches/4/Live/Germany-Bundesliga-2023-2024-G-H",
    )
}

fn discovery_scraper() -> MockScraper {
    MockScraper::new()
        .with_page(HOME, MockPage::html(HOME_PAGE))
        .with_page(LEAGUE, MockPage::html(LEAGUE_PAGE))
        .with_page(SEASON, MockPage::html(SEASON_PAGE))
        .with_page(SEASON, MockPage::html(FIXTURES_PAGE))
        .with_page(SEASON, MockPage::html(last_week()))
        .with_page(MATCH_A, MockPage::html(match_page()))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE))
}

/// Discovery over a season whose weeks come from `fixture_pages` in order.
fn season_scraper(fixture_pages: Vec<MockPage>) -> MockScraper {
    let mut scraper = MockScraper::new()
        .with_page(HOME, MockPage::html(HOME_PAGE))
        .with_page(LEAGUE, MockPage::html(LEAGUE_PAGE))
        .with_page(SEASON, MockPage::html(SEASON_PAGE));
    for page in fixture_pages {
        scraper = scraper.with_page(SEASON, page);
    }
    scraper
        .with_page(MATCH_A, MockPage::html(match_page()))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE))
        .with_page(MATCH_C, MockPage::html(HEADER_PAGE))
}

fn season_depths(scraper: &MockScraper) -> Vec<usize> {
    scraper
        .fetched()
        .iter()
        .filter(|r| r.url.as_str() == SEASON)
        .map(|r| r.depth)
        .collect()
}

#[tokio::test]
async fn test_rows_match_extracted_records() {
    let scraper = MockScraper::new()
        .with_page(MATCH_A, MockPage::html(match_page()))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler.run(&match_spider(&[MATCH_A, MATCH_B])).await.unwrap();

    assert_eq!(memory.len("matches"), 2);
    assert_eq!(memory.len("events"), 4);
    assert_eq!(memory.len("players"), 3);
    assert_eq!(memory.len("lineups"), 3);
    assert_eq!(memory.len("failures"), 0);
    assert_eq!(stats.records(&StorageCategory::Matches), 2);
    assert_eq!(stats.records(&StorageCategory::Events), 4);
    assert_eq!(stats.pages_loaded, 2);
}

#[tokio::test]
async fn test_failed_pages_are_skipped_and_recorded() {
    let broken = "https://www.whoscored.com/Matches/3/Live/Germany-Bundesliga-2023-2024-E-F";
    let scraper = MockScraper::new()
        .with_page(MATCH_A, MockPage::Timeout)
        .with_page(broken, MockPage::html("<html><body><p>Layout changed</p></body></html>"))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler
        .run(&match_spider(&[MATCH_A, broken, MATCH_B]))
        .await
        .unwrap();

    assert_eq!(memory.len("matches"), 1);
    assert_eq!(stats.load_failures, 1);
    assert_eq!(stats.extraction_failures, 1);

    let failures = memory.rows("failures");
    assert_eq!(failures.len(), 2);
    let ScrapedItem::Failure(first) = &failures[0] else {
        panic!("expected a failure record");
    };
    assert_eq!(first.url, MATCH_A);
    assert_eq!(first.kind, "load");
    assert_eq!(first.run_id, crawler.run_id().to_string());
    let ScrapedItem::Failure(second) = &failures[1] else {
        panic!("expected a failure record");
    };
    assert_eq!(second.kind, "extraction");
}

#[tokio::test]
async fn test_write_failure_aborts_run() {
    let scraper = MockScraper::new()
        .with_page(MATCH_A, MockPage::html(HEADER_PAGE))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let memory = MemoryStorage::new();
    // nowhere to put match rows
    let manager = StorageManager::new().register_storage(
        StorageCategory::Failures,
        Arc::new(Storage::Memory(memory.clone())),
        "failures",
    );
    let crawler = Crawler::new(Box::new(scraper.clone()), manager);

    let error = crawler
        .run(&match_spider(&[MATCH_A, MATCH_B]))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ScraperError::StorageError(StorageError::MissingStorage(StorageCategory::Matches))
    ));
    assert_eq!(scraper.fetched().len(), 1);
    assert!(memory.is_empty());
}

#[tokio::test]
async fn test_duplicate_urls_fetched_once() {
    let scraper = MockScraper::new().with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);

    crawler
        .run(&match_spider(&[MATCH_B, MATCH_B]))
        .await
        .unwrap();

    assert_eq!(scraper.fetched().len(), 1);
    assert_eq!(memory.len("matches"), 1);
}

#[tokio::test]
async fn test_season_discovery_walks_to_matches() {
    let scraper = discovery_scraper();
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler.run(&season_spider()).await.unwrap();

    // home, league, season, one paged fixtures load, two matches
    let fetched = scraper.fetched();
    assert_eq!(fetched.len(), 6);
    let season_fetches: Vec<_> = fetched.iter().filter(|r| r.url.as_str() == SEASON).collect();
    assert_eq!(season_fetches.len(), 2);
    assert!(season_fetches[1].pagination.is_some());

    assert_eq!(memory.len("matches"), 2);
    assert_eq!(stats.records(&StorageCategory::Matches), 2);
    assert_eq!(stats.load_failures + stats.extraction_failures, 0);
}

#[tokio::test]
async fn test_pagination_stops_at_max_depth() {
    let scraper = discovery_scraper();
    let (crawler, memory) = memory_crawler(&scraper);
    let spider = season_spider().with_config(fast_config().with_depth(1));

    crawler.run(&spider).await.unwrap();

    let fixtures = scraper
        .fetched()
        .into_iter()
        .filter(|r| r.pagination.is_some())
        .collect::<Vec<_>>();
    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0].pagination.as_ref().unwrap().max_pages, 1);
    assert!(scraper.fetched().iter().all(|r| r.depth == 0));
    assert_eq!(memory.len("matches"), 2);
}

#[tokio::test]
async fn test_interrupted_paging_resumes_at_next_week() {
    let scraper = season_scraper(vec![
        MockPage::html(FIXTURES_PAGE),
        MockPage::Timeout,
        MockPage::html(older_week()),
    ]);
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler.run(&season_spider()).await.unwrap();

    assert_eq!(season_depths(&scraper), vec![0, 0, 1]);
    assert!(scraper.fetched().iter().any(|r| r.url.as_str() == MATCH_C));
    assert_eq!(memory.len("matches"), 3);
    assert_eq!(stats.load_failures, 0);
}

#[tokio::test]
async fn test_failed_week_does_not_end_pagination() {
    let scraper = season_scraper(vec![MockPage::Timeout, MockPage::html(older_week())]);
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler.run(&season_spider()).await.unwrap();

    assert_eq!(season_depths(&scraper), vec![0, 0, 1]);
    assert!(scraper.fetched().iter().any(|r| r.url.as_str() == MATCH_C));
    assert_eq!(memory.len("matches"), 2);
    assert_eq!(stats.load_failures, 1);
    assert_eq!(memory.len("failures"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_page_delay_between_pages() {
    let scraper = MockScraper::new()
        .with_page(MATCH_A, MockPage::html(match_page()))
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE))
        .with_page(MATCH_C, MockPage::html(HEADER_PAGE));
    let (crawler, _memory) = memory_crawler(&scraper);
    let spider = match_spider(&[MATCH_A, MATCH_B, MATCH_C])
        .with_config(fast_config().with_page_delay(Duration::from_secs(2)));

    crawler.run(&spider).await.unwrap();

    let times = scraper.fetch_times();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_secs(2), "pages {:?} apart", gap);
        assert!(gap < Duration::from_secs(3), "pages {:?} apart", gap);
    }
}

#[tokio::test]
async fn test_error_status_is_not_a_loaded_page() {
    let scraper = MockScraper::new()
        .with_page(
            MATCH_A,
            MockPage::Page {
                status: 503,
                body: "Service Unavailable".to_string(),
            },
        )
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);

    let stats = crawler.run(&match_spider(&[MATCH_A, MATCH_B])).await.unwrap();

    assert_eq!(stats.pages_loaded, 1);
    assert_eq!(stats.load_failures, 1);
    assert_eq!(stats.status_codes.get(&503), Some(&1));
    assert_eq!(memory.len("matches"), 1);
}

#[tokio::test]
async fn test_each_run_starts_fresh() {
    let scraper = MockScraper::new().with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);
    let spider = match_spider(&[MATCH_B]);

    let first = crawler.run(&spider).await.unwrap();
    let second = crawler.run(&spider).await.unwrap();

    assert_eq!(scraper.fetched().len(), 2);
    assert_eq!(first.pages_loaded, 1);
    assert_eq!(second.pages_loaded, 1);
    assert_eq!(second.pages_requested, 1);
    assert_eq!(memory.len("matches"), 2);
    crawler.close().await;
}

#[tokio::test]
async fn test_start_requests_run_at_zero_max_depth() {
    let scraper = MockScraper::new().with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let (crawler, memory) = memory_crawler(&scraper);
    let spider = match_spider(&[MATCH_B]).with_config(fast_config().with_depth(0));

    crawler.run(&spider).await.unwrap();

    assert_eq!(scraper.fetched().len(), 1);
    assert_eq!(memory.len("matches"), 1);
}

#[tokio::test]
async fn test_unwritable_output_aborts_run() {
    let dir = std::env::temp_dir().join(format!("matchscraper-test-{}", Uuid::now_v7()));
    // a directory where the matches file should go
    std::fs::create_dir_all(dir.join("matches.csv")).unwrap();
    let storage = CsvStorage::new(&dir).unwrap();
    let manager = StorageManager::new().register_all(Storage::Csv(Box::new(storage)));
    let scraper = MockScraper::new()
        .with_page(MATCH_B, MockPage::html(HEADER_PAGE))
        .with_page(MATCH_A, MockPage::html(match_page()));
    let crawler = Crawler::new(Box::new(scraper.clone()), manager);

    let error = crawler
        .run(&match_spider(&[MATCH_B, MATCH_A]))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ScraperError::StorageError(StorageError::OperationError(_))
    ));
    assert!(error.is_fatal());
    assert_eq!(scraper.fetched().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_csv_rows_lead_with_core_fields() {
    let dir = std::env::temp_dir().join(format!("matchscraper-test-{}", Uuid::now_v7()));
    let storage = CsvStorage::new(&dir).unwrap();
    let manager = StorageManager::new().register_all(Storage::Csv(Box::new(storage)));
    let scraper = MockScraper::new().with_page(MATCH_B, MockPage::html(HEADER_PAGE));
    let crawler = Crawler::new(Box::new(scraper), manager);

    crawler.run(&match_spider(&[MATCH_B])).await.unwrap();

    let written = std::fs::read_to_string(dir.join("matches.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("home_team,away_team,home_score,away_score,match_date,"));
    assert!(lines[1].starts_with("Team A,Team B,2,1,2024-05-01,2,"));

    std::fs::remove_dir_all(&dir).unwrap();
}
