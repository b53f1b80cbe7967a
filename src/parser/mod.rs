//! Extractor: turns rendered markup into records.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and
//! documents never outlive the call that parsed them.

mod fields;
pub mod listing;
pub mod match_centre;
pub mod match_header;
pub mod selectors;
pub mod url_info;

pub use fields::{clean_text, parse_match_date, parse_score};
pub use listing::{NamedLink, PreviousWeek, StageFilter};
pub use selectors::SiteSelectors;
pub use url_info::MatchUrlInfo;

use log::debug;
use scraper::Html;
use url::Url;

use crate::items::ScrapedItem;
use crate::{ScraperError, ScraperResult};

/// Extracts every record a match page holds.
///
/// The embedded match centre data is preferred; the header markup is the
/// fallback. A page with neither fails rather than yielding partial rows.
pub fn extract_match_page(
    content: &str,
    url: &Url,
    selectors: &SiteSelectors,
) -> ScraperResult<Vec<ScrapedItem>> {
    let document = Html::parse_document(content);
    let info = MatchUrlInfo::parse(url);

    if let Some(centre) = match_centre::find_match_centre(&document, selectors)? {
        let records = centre.into_records(&info)?;
        debug!(
            "Match centre for {}: {} events, {} players",
            url,
            records.events.len(),
            records.players.len()
        );

        let mut items = Vec::with_capacity(
            1 + records.events.len() + records.players.len() + records.lineups.len(),
        );
        items.push(ScrapedItem::Match(records.match_record));
        items.extend(records.events.into_iter().map(ScrapedItem::Event));
        items.extend(records.players.into_iter().map(ScrapedItem::Player));
        items.extend(records.lineups.into_iter().map(ScrapedItem::Lineup));
        return Ok(items);
    }

    match match_header::extract_match_header(&document, selectors, &info)? {
        Some(record) => {
            debug!("No match centre data on {}, using header", url);
            Ok(vec![ScrapedItem::Match(record)])
        }
        None => Err(ScraperError::extraction(format!(
            "no match data found on {}",
            url
        ))),
    }
}
