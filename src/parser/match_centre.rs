//! Records from the `matchCentreData` object embedded in match pages.

use scraper::Html;
use serde::Deserialize;
use serde_json::Value;

use super::fields::{parse_match_date, parse_score};
use super::selectors::SiteSelectors;
use super::url_info::MatchUrlInfo;
use crate::items::{EventRecord, LineupRecord, MatchRecord, PlayerRecord, TeamStats};
use crate::{ScraperError, ScraperResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCentre {
    pub start_date: String,
    pub score: String,
    pub home: TeamSide,
    pub away: TeamSide,
    pub max_minute: Option<u32>,
    pub expanded_max_minute: Option<u32>,
    #[serde(default)]
    pub events: Vec<MatchEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    pub team_id: i64,
    pub name: String,
    pub field: Option<String>,
    #[serde(default)]
    pub players: Vec<SquadPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadPlayer {
    pub player_id: i64,
    pub shirt_no: Option<u32>,
    pub name: String,
    pub position: Option<String>,
    pub age: Option<u32>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub field: Option<String>,
    pub is_first_eleven: Option<bool>,
    pub subbed_in_player_id: Option<i64>,
    pub subbed_out_player_id: Option<i64>,
    pub subbed_in_period: Option<Value>,
    pub subbed_out_period: Option<Value>,
    pub subbed_in_expanded_minute: Option<i32>,
    pub subbed_out_expanded_minute: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub id: f64,
    pub minute: i32,
    pub second: Option<f64>,
    pub expanded_minute: i32,
    pub team_id: i64,
    pub player_id: Option<i64>,
    pub related_player_id: Option<i64>,
    pub x: f64,
    pub y: f64,
    pub end_x: Option<f64>,
    pub end_y: Option<f64>,
    #[serde(default)]
    pub qualifiers: Vec<Value>,
    #[serde(default)]
    pub is_touch: bool,
    pub blocked_x: Option<f64>,
    pub blocked_y: Option<f64>,
    pub goal_mouth_z: Option<f64>,
    pub goal_mouth_y: Option<f64>,
    #[serde(default)]
    pub is_shot: bool,
    #[serde(default)]
    pub is_goal: bool,
    pub card_type: Option<Value>,
    pub period: DisplayName,
    #[serde(rename = "type")]
    pub event_type: DisplayName,
    pub outcome_type: DisplayName,
}

impl MatchEvent {
    fn is(&self, event_type: &str) -> bool {
        self.event_type.display_name == event_type
    }

    fn successful(&self) -> bool {
        self.outcome_type.display_name == "Successful"
    }
}

/// Everything one match page contributes to the output.
#[derive(Debug, Clone)]
pub struct MatchCentreRecords {
    pub match_record: MatchRecord,
    pub events: Vec<EventRecord>,
    pub players: Vec<PlayerRecord>,
    pub lineups: Vec<LineupRecord>,
}

/// Finds the match centre object in the page's scripts.
///
/// Returns `Ok(None)` when no script carries the marker, and an error when
/// one does but the object after it cannot be decoded.
pub fn find_match_centre(
    document: &Html,
    selectors: &SiteSelectors,
) -> ScraperResult<Option<MatchCentre>> {
    let script = SiteSelectors::compile("script")?;
    let marker = selectors.match_centre_marker.as_str();

    for element in document.select(&script) {
        let text: String = element.text().collect();
        let Some(start) = text.find(marker) else {
            continue;
        };
        let rest = text[start + marker.len()..].trim_start();
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<MatchCentre>();
        return match stream.next() {
            Some(Ok(centre)) => Ok(Some(centre)),
            Some(Err(e)) => Err(ScraperError::extraction(format!(
                "malformed match centre data: {}",
                e
            ))),
            None => Err(ScraperError::extraction("empty match centre data")),
        };
    }
    Ok(None)
}

fn period_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) => map
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Per-team totals for (home, away).
pub fn team_stats(centre: &MatchCentre) -> (TeamStats, TeamStats) {
    let mut home = TeamStats::default();
    let mut away = TeamStats::default();

    for event in &centre.events {
        let side = if event.team_id == centre.home.team_id {
            &mut home
        } else if event.team_id == centre.away.team_id {
            &mut away
        } else {
            continue;
        };

        if event.is_shot {
            side.shots += 1;
        }
        if event.is("SavedShot") || event.is("Goal") {
            side.shots_on_target += 1;
        }
        if event.is("Pass") {
            side.passes += 1;
            if event.successful() {
                side.successful_passes += 1;
            }
        }
        if event.is("Foul") && !event.successful() {
            side.fouls += 1;
        }
        if event.is("Card") {
            side.cards += 1;
        }
    }

    (home, away)
}

impl MatchCentre {
    pub fn into_records(self, info: &MatchUrlInfo) -> ScraperResult<MatchCentreRecords> {
        let match_id = info
            .match_id
            .ok_or_else(|| ScraperError::extraction("match id missing from URL"))?;
        let (home_score, away_score) = parse_score(&self.score).ok_or_else(|| {
            ScraperError::extraction(format!("no final score in `{}`", self.score))
        })?;
        let match_date = parse_match_date(&self.start_date).ok_or_else(|| {
            ScraperError::extraction(format!("unreadable start date `{}`", self.start_date))
        })?;
        let max_minute = self
            .max_minute
            .ok_or_else(|| ScraperError::extraction("maxMinute missing"))?;
        let expanded_max_minute = self
            .expanded_max_minute
            .ok_or_else(|| ScraperError::extraction("expandedMaxMinute missing"))?;

        let (home_stats, away_stats) = team_stats(&self);
        let mut match_record = MatchRecord::new(
            self.home.name.clone(),
            self.away.name.clone(),
            home_score,
            away_score,
            match_date,
        )
        .with_stats(home_stats, away_stats);
        match_record.match_id = Some(match_id);
        match_record.region = info.region.clone();
        match_record.competition = info.competition.clone();
        match_record.season = info.season.clone();
        match_record.match_minutes = Some(max_minute);
        match_record.match_minutes_expanded = Some(expanded_max_minute);

        let events = self
            .events
            .iter()
            .filter(|event| !event.is("OffsideGiven"))
            .filter_map(|event| {
                let player_id = event.player_id?;
                Some(EventRecord {
                    event_id: event.id as i64,
                    match_id,
                    minute: event.minute,
                    second: event.second,
                    expanded_minute: event.expanded_minute,
                    team_id: event.team_id,
                    player_id,
                    related_player_id: event.related_player_id,
                    x: event.x,
                    y: event.y,
                    end_x: event.end_x,
                    end_y: event.end_y,
                    qualifiers: Value::Array(event.qualifiers.clone()).to_string(),
                    is_touch: event.is_touch,
                    blocked_x: event.blocked_x,
                    blocked_y: event.blocked_y,
                    goal_mouth_z: event.goal_mouth_z,
                    goal_mouth_y: event.goal_mouth_y,
                    is_shot: event.is_shot,
                    card_type: event.card_type.as_ref().is_some_and(|c| !c.is_null()),
                    is_goal: event.is_goal,
                    event_type: event.event_type.display_name.clone(),
                    outcome_type: event.outcome_type.display_name.clone(),
                    period: event.period.display_name.clone(),
                })
            })
            .collect();

        let mut players = Vec::new();
        let mut lineups = Vec::new();
        for team in [&self.home, &self.away] {
            for player in &team.players {
                players.push(PlayerRecord {
                    player_id: player.player_id,
                    team_id: team.team_id,
                    shirt_no: player.shirt_no,
                    name: player.name.clone(),
                    age: player.age,
                    height: player.height,
                    weight: player.weight,
                });
                lineups.push(LineupRecord {
                    match_id,
                    team_id: team.team_id,
                    player_id: player.player_id,
                    player_name: player.name.clone(),
                    player_position: player.position.clone().unwrap_or_default(),
                    field: player
                        .field
                        .clone()
                        .or_else(|| team.field.clone())
                        .unwrap_or_default(),
                    first_eleven: player.is_first_eleven.unwrap_or(false),
                    subbed_in_player_id: player.subbed_in_player_id,
                    subbed_out_period: player.subbed_out_period.as_ref().and_then(period_name),
                    subbed_out_expanded_min: player.subbed_out_expanded_minute,
                    subbed_in_period: player.subbed_in_period.as_ref().and_then(period_name),
                    subbed_in_expanded_min: player.subbed_in_expanded_minute,
                    subbed_out_player_id: player.subbed_out_player_id,
                });
            }
        }

        Ok(MatchCentreRecords {
            match_record,
            events,
            players,
            lineups,
        })
    }
}
