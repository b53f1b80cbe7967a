use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Metadata carried by a match page URL such as
/// `/Matches/1729386/Live/Germany-Bundesliga-2023-2024-Werder-Bremen-Bayern-Munich`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchUrlInfo {
    pub match_id: Option<u64>,
    pub region: Option<String>,
    pub competition: Option<String>,
    pub season: Option<String>,
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/([^/-]+)-([^/]+?)-(\d{4}-\d{4})-").expect("static pattern is valid")
    })
}

impl MatchUrlInfo {
    pub fn parse(url: &Url) -> Self {
        let (region, competition, season) = match slug_pattern().captures(url.path()) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().to_string()),
                caps.get(3).map(|m| m.as_str().to_string()),
            ),
            None => (None, None, None),
        };

        Self {
            match_id: match_id(url),
            region,
            competition,
            season,
        }
    }
}

fn match_id(url: &Url) -> Option<u64> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let after_matches = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("matches"))
        .and_then(|i| segments.get(i + 1));
    let candidate = after_matches.or_else(|| segments.len().checked_sub(3).and_then(|i| segments.get(i)))?;
    candidate.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundesliga_match_url() {
        let url = Url::parse(
            "https://www.whoscored.com/Matches/1729386/Live/Germany-Bundesliga-2023-2024-Werder-Bremen-Bayern-Munich",
        )
        .unwrap();
        let info = MatchUrlInfo::parse(&url);

        assert_eq!(info.match_id, Some(1729386));
        assert_eq!(info.region.as_deref(), Some("Germany"));
        assert_eq!(info.competition.as_deref(), Some("Bundesliga"));
        assert_eq!(info.season.as_deref(), Some("2023-2024"));
    }

    #[test]
    fn test_multi_word_competition() {
        let url = Url::parse(
            "https://www.whoscored.com/Matches/1729462/Live/England-Premier-League-2023-2024-Burnley-Manchester-City",
        )
        .unwrap();
        let info = MatchUrlInfo::parse(&url);

        assert_eq!(info.region.as_deref(), Some("England"));
        assert_eq!(info.competition.as_deref(), Some("Premier-League"));
        assert_eq!(info.season.as_deref(), Some("2023-2024"));
    }

    #[test]
    fn test_url_without_slug() {
        let url = Url::parse("https://www.whoscored.com/Matches/42/Show").unwrap();
        let info = MatchUrlInfo::parse(&url);

        assert_eq!(info.match_id, Some(42));
        assert_eq!(info.region, None);
        assert_eq!(info.season, None);

        let url = Url::parse("https://example.com/fixtures/today").unwrap();
        assert_eq!(MatchUrlInfo::parse(&url), MatchUrlInfo::default());
    }
}
