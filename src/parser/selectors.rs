//! Every structural dependency on the target site, in one table.
//!
//! When the site's layout changes, update the values here; the extraction
//! code only ever refers to these fields.

use scraper::Selector;

use crate::{ScraperError, ScraperResult};

#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub base_url: String,

    /// Home page: one `<a>` per popular tournament.
    pub tournament_links: String,
    /// League page season dropdown options; value is the season URL.
    pub season_options: String,
    /// Season page stage dropdown options; value is the stage URL.
    pub stage_options: String,
    pub season_select: String,

    /// Container holding the fixture rows; present once fixtures are rendered.
    pub fixture_rows: String,
    pub fixture_match_links: String,
    /// First link of the date controller: the previous week button.
    pub previous_week: String,
    pub disabled_class: String,
    pub no_previous_data_title: String,

    pub match_header: String,
    pub header_team_links: String,
    pub header_result: String,
    /// One `<dl>` per header entry, holding a `<dt>` label and its `<dd>` value.
    pub header_info_entries: String,

    /// Script marker preceding the embedded match centre JSON.
    pub match_centre_marker: String,

    /// Link substring -> display name, for tournaments listed under a short name.
    pub league_name_overrides: Vec<(String, String)>,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            base_url: "https://www.whoscored.com/".to_string(),
            tournament_links: "#popular-tournaments-list li a".to_string(),
            season_options: "#seasons option".to_string(),
            stage_options: "#stages option".to_string(),
            season_select: "#seasons".to_string(),
            fixture_rows: "#tournament-fixture".to_string(),
            fixture_match_links: ".divtable-row a.result-1.rc".to_string(),
            previous_week: "#date-controller > a:first-of-type".to_string(),
            disabled_class: "is-disabled".to_string(),
            no_previous_data_title: "No data for previous week".to_string(),
            match_header: "#match-header".to_string(),
            header_team_links: "#match-header a.team-link".to_string(),
            header_result: "#match-header .result".to_string(),
            header_info_entries: "#match-header .info-block dl".to_string(),
            match_centre_marker: "matchCentreData:".to_string(),
            league_name_overrides: vec![(
                "Russia".to_string(),
                "Russian Premier League".to_string(),
            )],
        }
    }
}

impl SiteSelectors {
    /// Compiles one of the table's selectors.
    pub fn compile(selector: &str) -> ScraperResult<Selector> {
        Selector::parse(selector).map_err(|e| {
            ScraperError::extraction(format!("invalid selector `{}`: {}", selector, e))
        })
    }

    pub fn league_name(&self, name: &str, link: &str) -> String {
        self.league_name_overrides
            .iter()
            .find(|(needle, _)| link.contains(needle.as_str()))
            .map(|(_, replacement)| replacement.clone())
            .unwrap_or_else(|| name.trim().to_string())
    }
}
