use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*[:\-\u{2013}\u{2014}]\s*(\d+)\s*\*?\s*$")
            .expect("static pattern is valid")
    })
}

/// Parses a final score such as `2 : 1`, `2-1` or `2 – 1` into (home, away).
pub fn parse_score(text: &str) -> Option<(u32, u32)> {
    let caps = score_pattern().captures(text)?;
    let home = caps.get(1)?.as_str().parse().ok()?;
    let away = caps.get(2)?.as_str().parse().ok()?;
    Some((home, away))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%a, %d-%b-%y", "%d-%b-%y", "%d/%m/%Y", "%A, %b %d %Y"];

/// Parses a match date. Timestamps are cut to their date part.
pub fn parse_match_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(prefix) = text.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Collapses runs of whitespace, as rendered text tends to carry layout
/// newlines and indentation.
pub fn clean_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
