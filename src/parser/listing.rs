//! Navigation pages: tournament list, season and stage dropdowns, fixtures.

use scraper::Html;
use std::collections::HashSet;
use url::Url;

use super::fields::clean_text;
use super::selectors::SiteSelectors;
use crate::ScraperResult;

/// A labelled link taken from a list or dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLink {
    pub label: String,
    pub url: Url,
}

/// Popular tournaments on the home page, with name overrides applied.
pub fn tournaments(
    document: &Html,
    base: &Url,
    selectors: &SiteSelectors,
) -> ScraperResult<Vec<NamedLink>> {
    let links = SiteSelectors::compile(&selectors.tournament_links)?;
    let mut found = Vec::new();
    for a in document.select(&links) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };
        let label = selectors.league_name(&clean_text(a.text()), href);
        found.push(NamedLink { label, url });
    }
    Ok(found)
}

/// `<option>` entries of a navigation dropdown; the value is the target URL.
pub fn dropdown_options(
    document: &Html,
    base: &Url,
    selector: &str,
) -> ScraperResult<Vec<NamedLink>> {
    let options = SiteSelectors::compile(selector)?;
    Ok(document
        .select(&options)
        .filter_map(|option| {
            let value = option.value().attr("value")?;
            let url = base.join(value).ok()?;
            Some(NamedLink {
                label: clean_text(option.text()),
                url,
            })
        })
        .collect())
}

/// Distinct match links in the fixture rows, in page order.
pub fn fixture_links(
    document: &Html,
    base: &Url,
    selectors: &SiteSelectors,
) -> ScraperResult<Vec<Url>> {
    let links = SiteSelectors::compile(&selectors.fixture_match_links)?;
    let mut seen = HashSet::new();
    Ok(document
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| seen.insert(url.clone()))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousWeek {
    Available,
    Disabled,
    NoData,
    Missing,
}

impl PreviousWeek {
    pub fn can_paginate(&self) -> bool {
        matches!(self, PreviousWeek::Available)
    }
}

/// State of the fixtures pager's previous-week button.
pub fn previous_week(document: &Html, selectors: &SiteSelectors) -> ScraperResult<PreviousWeek> {
    pager_state(
        document,
        &selectors.previous_week,
        &selectors.disabled_class,
        &selectors.no_previous_data_title,
    )
}

/// State of a pager control: missing, disabled, exhausted or clickable.
pub fn pager_state(
    document: &Html,
    control: &str,
    disabled_class: &str,
    exhausted_title: &str,
) -> ScraperResult<PreviousWeek> {
    let button = SiteSelectors::compile(control)?;
    let Some(element) = document.select(&button).next() else {
        return Ok(PreviousWeek::Missing);
    };
    let element = element.value();

    if element.classes().any(|c| c == disabled_class) {
        return Ok(PreviousWeek::Disabled);
    }
    if element.attr("title") == Some(exhausted_title) {
        return Ok(PreviousWeek::NoData);
    }
    Ok(PreviousWeek::Available)
}

/// Which tournament stages hold the fixtures worth collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageFilter {
    All,
    Keep(Vec<&'static str>),
    Drop(Vec<&'static str>),
}

impl StageFilter {
    pub fn for_competition(competition: &str) -> Self {
        match competition {
            "Champions League" | "Europa League" => {
                StageFilter::Keep(vec!["Group Stages", "Final Stage"])
            }
            "Major League Soccer" => StageFilter::Drop(vec!["Grp. "]),
            _ => StageFilter::All,
        }
    }

    pub fn keeps(&self, label: &str) -> bool {
        match self {
            StageFilter::All => true,
            StageFilter::Keep(needles) => needles.iter().any(|n| label.contains(n)),
            StageFilter::Drop(needles) => !needles.iter().any(|n| label.contains(n)),
        }
    }
}
