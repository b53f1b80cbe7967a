use scraper::Html;

use super::fields::{clean_text, parse_match_date, parse_score};
use super::selectors::SiteSelectors;
use super::url_info::MatchUrlInfo;
use crate::items::MatchRecord;
use crate::{ScraperError, ScraperResult};

/// Builds a statistics-free record from the `#match-header` block.
///
/// Returns `Ok(None)` when the page has no header at all; a header that is
/// present but incomplete is an extraction error.
pub fn extract_match_header(
    document: &Html,
    selectors: &SiteSelectors,
    info: &MatchUrlInfo,
) -> ScraperResult<Option<MatchRecord>> {
    let header = SiteSelectors::compile(&selectors.match_header)?;
    if document.select(&header).next().is_none() {
        return Ok(None);
    }

    let team_links = SiteSelectors::compile(&selectors.header_team_links)?;
    let teams: Vec<String> = document
        .select(&team_links)
        .map(|a| clean_text(a.text()))
        .filter(|name| !name.is_empty())
        .collect();
    let [home_team, away_team] = teams.as_slice() else {
        return Err(ScraperError::extraction(format!(
            "expected two team links in match header, found {}",
            teams.len()
        )));
    };

    let result = SiteSelectors::compile(&selectors.header_result)?;
    let score_text = document
        .select(&result)
        .next()
        .map(|cell| clean_text(cell.text()))
        .ok_or_else(|| ScraperError::extraction("match header has no result cell"))?;
    let (home_score, away_score) = parse_score(&score_text)
        .ok_or_else(|| ScraperError::extraction(format!("no final score in `{}`", score_text)))?;

    let date_text = header_info(document, selectors, "Date")?
        .ok_or_else(|| ScraperError::extraction("match header has no date entry"))?;
    let match_date = parse_match_date(&date_text)
        .ok_or_else(|| ScraperError::extraction(format!("unreadable match date `{}`", date_text)))?;

    let mut record = MatchRecord::new(
        home_team.clone(),
        away_team.clone(),
        home_score,
        away_score,
        match_date,
    );
    record.match_id = info.match_id;
    record.region = info.region.clone();
    record.competition = info.competition.clone();
    record.season = info.season.clone();
    Ok(Some(record))
}

/// Value of the `<dd>` sharing a `<dl>` with the `<dt>` whose label starts
/// with `label`.
fn header_info(
    document: &Html,
    selectors: &SiteSelectors,
    label: &str,
) -> ScraperResult<Option<String>> {
    let entries = SiteSelectors::compile(&selectors.header_info_entries)?;
    let term = SiteSelectors::compile("dt")?;
    let value = SiteSelectors::compile("dd")?;

    for entry in document.select(&entries) {
        let Some(dt) = entry.select(&term).next() else {
            continue;
        };
        if clean_text(dt.text()).starts_with(label) {
            return Ok(entry.select(&value).next().map(|dd| clean_text(dd.text())));
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    pub(crate) const HEADER_PAGE: &str = r#"
        <html><body>
        <div id="match-header">
          <table><tr>
            <td class="team home"><a class="team-link" href="/Teams/1">Team A</a></td>
            <td class="result">2 &ndash; 1</td>
            <td class="team away"><a class="team-link" href="/Teams/2">Team B</a></td>
          </tr></table>
          <div class="info-block">
            <dl><dt>Kick off:</dt><dd>15:30</dd></dl>
            <dl><dt>Date:</dt><dd>2024-05-01</dd></dl>
          </div>
        </div>
        </body></html>"#;

    fn info() -> MatchUrlInfo {
        MatchUrlInfo::parse(&Url::parse("https://www.whoscored.com/Matches/99/Show").unwrap())
    }

    #[test]
    fn test_header_record() {
        let document = Html::parse_document(HEADER_PAGE);
        let record = extract_match_header(&document, &SiteSelectors::default(), &info())
            .unwrap()
            .unwrap();

        assert_eq!(record.home_team, "Team A");
        assert_eq!(record.away_team, "Team B");
        assert_eq!(record.home_score, 2);
        assert_eq!(record.away_score, 1);
        assert_eq!(record.match_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(record.match_id, Some(99));
        assert_eq!(record.home_shots, None);
    }

    #[test]
    fn test_page_without_header() {
        let document = Html::parse_document("<html><body><p>Maintenance</p></body></html>");
        let record = extract_match_header(&document, &SiteSelectors::default(), &info()).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_incomplete_header_is_an_error() {
        let page = HEADER_PAGE.replace("2 &ndash; 1", "vs");
        let document = Html::parse_document(&page);
        let error = extract_match_header(&document, &SiteSelectors::default(), &info()).unwrap_err();
        assert!(matches!(error, ScraperError::ExtractionError(_)));

        let page = HEADER_PAGE.replace(r#"<a class="team-link" href="/Teams/2">Team B</a>"#, "");
        let document = Html::parse_document(&page);
        let error = extract_match_header(&document, &SiteSelectors::default(), &info()).unwrap_err();
        assert!(error.to_string().contains("two team links"));
    }

    #[test]
    fn test_info_entries_pair_within_their_block() {
        // a label without a value must not shift the date onto another entry
        let page = HEADER_PAGE.replace(
            "<dl><dt>Kick off:</dt><dd>15:30</dd></dl>",
            "<dl><dt>Attendance:</dt></dl><dl><dt>Kick off:</dt><dd>15:30</dd></dl>",
        );
        let document = Html::parse_document(&page);
        let selectors = SiteSelectors::default();

        assert_eq!(
            header_info(&document, &selectors, "Date").unwrap().as_deref(),
            Some("2024-05-01")
        );
        assert_eq!(
            header_info(&document, &selectors, "Kick off").unwrap().as_deref(),
            Some("15:30")
        );
        assert_eq!(header_info(&document, &selectors, "Attendance").unwrap(), None);

        let record = extract_match_header(&document, &selectors, &info())
            .unwrap()
            .unwrap();
        assert_eq!(record.match_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
