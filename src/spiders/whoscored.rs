use async_trait::async_trait;
use log::{debug, info, warn};
use scraper::Html;
use serde_json::json;
use url::Url;

use crate::core::spider::{ParseResult, SpiderCallback, SpiderConfig};
use crate::core::FailureKind;
use crate::http::{PageAction, PageRequest, PageResponse, Pagination};
use crate::parser::{self, listing, SiteSelectors, StageFilter};
use crate::{ScraperError, ScraperResult, Spider};

/// Pixels to scroll so the fixture rows are rendered before they are read.
const FIXTURE_SCROLL_Y: i32 = 400;

/// Consecutive fixture weeks that may fail to load before a stage is given up.
const MAX_SKIPPED_WEEKS: u64 = 2;

/// What a run collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTarget {
    /// A fixed list of match pages.
    Matches(Vec<Url>),
    /// Every played match of one competition season, found by walking the
    /// site from its home page.
    Season { competition: String, season: String },
}

pub struct WhoScoredSpider {
    target: CrawlTarget,
    selectors: SiteSelectors,
    base_url: Url,
    config: SpiderConfig,
}

impl WhoScoredSpider {
    pub fn new(target: CrawlTarget) -> ScraperResult<Self> {
        Self::with_selectors(target, SiteSelectors::default())
    }

    pub fn with_selectors(target: CrawlTarget, selectors: SiteSelectors) -> ScraperResult<Self> {
        let base_url = Url::parse(&selectors.base_url)?;
        Ok(Self {
            target,
            selectors,
            base_url,
            config: SpiderConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SpiderConfig) -> Self {
        self.config = config;
        self
    }

    fn match_request(&self, url: Url, depth: usize) -> PageRequest {
        PageRequest::new(url, SpiderCallback::ParseMatch, depth)
            .with_wait_for(self.selectors.match_header.clone())
    }

    /// The fixtures page of `url` from `weeks` weeks back, paging further back
    /// within the same load. `skipped` counts the weeks before it that failed
    /// to load.
    fn fixtures_request(
        &self,
        url: Url,
        weeks: usize,
        stage: &str,
        skipped: u64,
    ) -> ScraperResult<PageRequest> {
        let mut actions = vec![PageAction::ScrollTo {
            y: FIXTURE_SCROLL_Y,
        }];
        actions.extend((0..weeks).map(|_| PageAction::Click {
            selector: self.selectors.previous_week.clone(),
        }));

        PageRequest::new(url, SpiderCallback::ParseFixtures, weeks)
            .with_actions(actions)
            .with_wait_for(self.selectors.fixture_rows.clone())
            .with_pagination(Pagination {
                control: self.selectors.previous_week.clone(),
                disabled_class: self.selectors.disabled_class.clone(),
                exhausted_title: self.selectors.no_previous_data_title.clone(),
                max_pages: self.config.max_depth.saturating_sub(weeks).max(1),
            })
            .with_meta(json!({ "stage": stage, "skipped": skipped }))
    }

    fn season_target(&self) -> ScraperResult<(&str, &str)> {
        match &self.target {
            CrawlTarget::Season {
                competition,
                season,
            } => Ok((competition, season)),
            CrawlTarget::Matches(_) => Err(ScraperError::extraction(
                "discovery page reached while crawling a fixed match list",
            )),
        }
    }

    fn parse_home(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        let (competition, season) = self.season_target()?;
        let document = Html::parse_document(&response.content);
        let leagues = listing::tournaments(&document, &response.url, &self.selectors)?;

        let league = leagues
            .iter()
            .find(|league| league.label == competition)
            .ok_or_else(|| ScraperError::CompetitionNotFound {
                competition: competition.to_string(),
                available: leagues.iter().map(|l| l.label.clone()).collect(),
            })?;
        info!("Found {} at {}", competition, league.url);

        let request = PageRequest::new(league.url.clone(), SpiderCallback::ParseSeasons, 0)
            .with_wait_for(self.selectors.season_select.clone())
            .with_meta(json!({ "competition": competition, "season": season }))?;
        Ok(ParseResult::Continue(vec![request]))
    }

    fn parse_seasons(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        let (_, season) = self.season_target()?;
        let document = Html::parse_document(&response.content);
        let seasons =
            listing::dropdown_options(&document, &response.url, &self.selectors.season_options)?;

        let selected = seasons
            .iter()
            .find(|option| option.label == season)
            .ok_or_else(|| ScraperError::SeasonNotFound {
                season: season.to_string(),
                available: seasons.iter().map(|s| s.label.clone()).collect(),
            })?;
        debug!("Season {} at {}", season, selected.url);

        let request = PageRequest::new(selected.url.clone(), SpiderCallback::ParseStages, 0)
            .with_wait_for(self.selectors.season_select.clone());
        Ok(ParseResult::Continue(vec![request]))
    }

    fn parse_stages(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        let (competition, season) = self.season_target()?;
        let document = Html::parse_document(&response.content);
        let stages =
            listing::dropdown_options(&document, &response.url, &self.selectors.stage_options)?;

        if stages.is_empty() {
            debug!("No stages for {} {}, reading fixtures from season page", competition, season);
            let request = self.fixtures_request(response.url.clone(), 0, season, 0)?;
            return Ok(ParseResult::Continue(vec![request]));
        }

        let filter = StageFilter::for_competition(competition);
        let mut requests = Vec::new();
        for stage in stages {
            if !filter.keeps(&stage.label) {
                debug!("Skipping stage {}", stage.label);
                continue;
            }
            requests.push(self.fixtures_request(stage.url, 0, &stage.label, 0)?);
        }
        info!("{} stage(s) selected for {} {}", requests.len(), competition, season);
        Ok(ParseResult::Continue(requests))
    }

    fn parse_fixtures(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        let request = &response.from_request;
        let mut matches = Vec::new();
        for capture in response.captures() {
            let document = Html::parse_document(capture);
            matches.extend(listing::fixture_links(&document, &response.url, &self.selectors)?);
        }
        let weeks = response.capture_count();
        let pager = listing::previous_week(
            &Html::parse_document(response.last_capture()),
            &self.selectors,
        )?;

        let stage = request.meta_str("stage").unwrap_or_default();
        info!(
            "{} match link(s) on {} (weeks {} to {} back)",
            matches.len(),
            stage,
            request.depth,
            request.depth + weeks - 1
        );

        let mut requests: Vec<PageRequest> = matches
            .into_iter()
            .map(|url| self.match_request(url, request.depth))
            .collect();

        let planned = request.pagination.as_ref().map_or(1, |p| p.max_pages);
        if pager.can_paginate() && weeks < planned {
            debug!("Paging of {} cut short, resuming {} week(s) back", stage, request.depth + weeks);
            requests.push(self.fixtures_request(
                response.url.clone(),
                request.depth + weeks,
                stage,
                0,
            )?);
        } else {
            debug!("Pagination ends for {}: {:?}", stage, pager);
        }
        Ok(ParseResult::Continue(requests))
    }

    fn parse_match(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        let items = parser::extract_match_page(&response.content, &response.url, &self.selectors)?;
        info!("Extracted {} record(s) from {}", items.len(), response.url);
        Ok(ParseResult::Items(items))
    }
}

#[async_trait]
impl Spider for WhoScoredSpider {
    fn name(&self) -> String {
        "whoscored".to_string()
    }

    fn start_requests(&self) -> ScraperResult<Vec<PageRequest>> {
        match &self.target {
            CrawlTarget::Matches(urls) => Ok(urls
                .iter()
                .map(|url| self.match_request(url.clone(), 0))
                .collect()),
            CrawlTarget::Season {
                competition,
                season,
            } => {
                let request =
                    PageRequest::new(self.base_url.clone(), SpiderCallback::Bootstrap, 0)
                        .with_wait_for(self.selectors.tournament_links.clone())
                        .with_meta(json!({ "competition": competition, "season": season }))?;
                Ok(vec![request])
            }
        }
    }

    fn config(&self) -> &SpiderConfig {
        &self.config
    }

    async fn parse(&self, response: &PageResponse) -> ScraperResult<ParseResult> {
        match &response.from_request.callback {
            SpiderCallback::Bootstrap => self.parse_home(response),
            SpiderCallback::ParseSeasons => self.parse_seasons(response),
            SpiderCallback::ParseStages => self.parse_stages(response),
            SpiderCallback::ParseFixtures => self.parse_fixtures(response),
            SpiderCallback::ParseMatch => self.parse_match(response),
        }
    }

    /// A fixtures week that failed to load is stepped over, so the weeks
    /// before it are still read.
    fn recover(
        &self,
        request: &PageRequest,
        error: &ScraperError,
    ) -> ScraperResult<Vec<PageRequest>> {
        if request.callback != SpiderCallback::ParseFixtures
            || error.failure_kind() != FailureKind::Load
        {
            return Ok(Vec::new());
        }

        let skipped = request.meta_u64("skipped").unwrap_or(0) + 1;
        let stage = request.meta_str("stage").unwrap_or_default();
        if skipped > MAX_SKIPPED_WEEKS {
            warn!("Giving up on {} after {} unreadable week(s)", stage, skipped);
            return Ok(Vec::new());
        }
        warn!("Skipping week {} of {}", request.depth, stage);
        Ok(vec![self.fixtures_request(
            request.url.clone(),
            request.depth + 1,
            stage,
            skipped,
        )?])
    }
}
