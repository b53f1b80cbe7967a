//! Flat records produced by the extractor and appended by the writer.
//!
//! Field order is column order: every record serializes to one row whose
//! columns follow the struct declaration, and `COLUMNS` mirrors it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageCategory;

/// Per-team totals aggregated from a match's event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub shots: u32,
    pub shots_on_target: u32,
    pub passes: u32,
    pub successful_passes: u32,
    pub fouls: u32,
    pub cards: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub match_date: NaiveDate,
    pub match_id: Option<u64>,
    pub region: Option<String>,
    pub competition: Option<String>,
    pub season: Option<String>,
    pub match_minutes: Option<u32>,
    pub match_minutes_expanded: Option<u32>,
    pub home_shots: Option<u32>,
    pub away_shots: Option<u32>,
    pub home_shots_on_target: Option<u32>,
    pub away_shots_on_target: Option<u32>,
    pub home_passes: Option<u32>,
    pub away_passes: Option<u32>,
    pub home_successful_passes: Option<u32>,
    pub away_successful_passes: Option<u32>,
    pub home_fouls: Option<u32>,
    pub away_fouls: Option<u32>,
    pub home_cards: Option<u32>,
    pub away_cards: Option<u32>,
}

impl MatchRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "home_team",
        "away_team",
        "home_score",
        "away_score",
        "match_date",
        "match_id",
        "region",
        "competition",
        "season",
        "match_minutes",
        "match_minutes_expanded",
        "home_shots",
        "away_shots",
        "home_shots_on_target",
        "away_shots_on_target",
        "home_passes",
        "away_passes",
        "home_successful_passes",
        "away_successful_passes",
        "home_fouls",
        "away_fouls",
        "home_cards",
        "away_cards",
    ];

    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_score: u32,
        away_score: u32,
        match_date: NaiveDate,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score,
            away_score,
            match_date,
            match_id: None,
            region: None,
            competition: None,
            season: None,
            match_minutes: None,
            match_minutes_expanded: None,
            home_shots: None,
            away_shots: None,
            home_shots_on_target: None,
            away_shots_on_target: None,
            home_passes: None,
            away_passes: None,
            home_successful_passes: None,
            away_successful_passes: None,
            home_fouls: None,
            away_fouls: None,
            home_cards: None,
            away_cards: None,
        }
    }

    pub fn with_stats(mut self, home: TeamStats, away: TeamStats) -> Self {
        self.home_shots = Some(home.shots);
        self.away_shots = Some(away.shots);
        self.home_shots_on_target = Some(home.shots_on_target);
        self.away_shots_on_target = Some(away.shots_on_target);
        self.home_passes = Some(home.passes);
        self.away_passes = Some(away.passes);
        self.home_successful_passes = Some(home.successful_passes);
        self.away_successful_passes = Some(away.successful_passes);
        self.home_fouls = Some(home.fouls);
        self.away_fouls = Some(away.fouls);
        self.home_cards = Some(home.cards);
        self.away_cards = Some(away.cards);
        self
    }

    /// True when every optional column carries a value.
    pub fn is_complete(&self) -> bool {
        self.match_id.is_some()
            && self.region.is_some()
            && self.competition.is_some()
            && self.season.is_some()
            && self.match_minutes.is_some()
            && self.match_minutes_expanded.is_some()
            && self.home_shots.is_some()
            && self.away_shots.is_some()
            && self.home_shots_on_target.is_some()
            && self.away_shots_on_target.is_some()
            && self.home_passes.is_some()
            && self.away_passes.is_some()
            && self.home_successful_passes.is_some()
            && self.away_successful_passes.is_some()
            && self.home_fouls.is_some()
            && self.away_fouls.is_some()
            && self.home_cards.is_some()
            && self.away_cards.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: i64,
    pub match_id: u64,
    pub minute: i32,
    pub second: Option<f64>,
    pub expanded_minute: i32,
    pub team_id: i64,
    pub player_id: i64,
    pub related_player_id: Option<i64>,
    pub x: f64,
    pub y: f64,
    pub end_x: Option<f64>,
    pub end_y: Option<f64>,
    /// Raw qualifier list as JSON text.
    pub qualifiers: String,
    pub is_touch: bool,
    pub blocked_x: Option<f64>,
    pub blocked_y: Option<f64>,
    pub goal_mouth_z: Option<f64>,
    pub goal_mouth_y: Option<f64>,
    pub is_shot: bool,
    pub card_type: bool,
    pub is_goal: bool,
    #[serde(rename = "type")]
    pub event_type: String,
    pub outcome_type: String,
    pub period: String,
}

impl EventRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "match_id",
        "minute",
        "second",
        "expanded_minute",
        "team_id",
        "player_id",
        "related_player_id",
        "x",
        "y",
        "end_x",
        "end_y",
        "qualifiers",
        "is_touch",
        "blocked_x",
        "blocked_y",
        "goal_mouth_z",
        "goal_mouth_y",
        "is_shot",
        "card_type",
        "is_goal",
        "type",
        "outcome_type",
        "period",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: i64,
    pub team_id: i64,
    pub shirt_no: Option<u32>,
    pub name: String,
    pub age: Option<u32>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
}

impl PlayerRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "player_id",
        "team_id",
        "shirt_no",
        "name",
        "age",
        "height",
        "weight",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupRecord {
    pub match_id: u64,
    pub team_id: i64,
    pub player_id: i64,
    pub player_name: String,
    pub player_position: String,
    pub field: String,
    pub first_eleven: bool,
    pub subbed_in_player_id: Option<i64>,
    pub subbed_out_period: Option<String>,
    pub subbed_out_expanded_min: Option<i32>,
    pub subbed_in_period: Option<String>,
    pub subbed_in_expanded_min: Option<i32>,
    pub subbed_out_player_id: Option<i64>,
}

impl LineupRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "match_id",
        "team_id",
        "player_id",
        "player_name",
        "player_position",
        "field",
        "first_eleven",
        "subbed_in_player_id",
        "subbed_out_period",
        "subbed_out_expanded_min",
        "subbed_in_period",
        "subbed_in_expanded_min",
        "subbed_out_player_id",
    ];
}

/// A page the run had to skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub callback: String,
    pub kind: String,
    pub message: String,
}

impl FailureRecord {
    pub const COLUMNS: &'static [&'static str] =
        &["run_id", "timestamp", "url", "callback", "kind", "message"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapedItem {
    Match(MatchRecord),
    Event(EventRecord),
    Player(PlayerRecord),
    Lineup(LineupRecord),
    Failure(FailureRecord),
}

impl ScrapedItem {
    pub fn category(&self) -> StorageCategory {
        match self {
            ScrapedItem::Match(_) => StorageCategory::Matches,
            ScrapedItem::Event(_) => StorageCategory::Events,
            ScrapedItem::Player(_) => StorageCategory::Players,
            ScrapedItem::Lineup(_) => StorageCategory::Lineups,
            ScrapedItem::Failure(_) => StorageCategory::Failures,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ScrapedItem::Match(_) => MatchRecord::COLUMNS,
            ScrapedItem::Event(_) => EventRecord::COLUMNS,
            ScrapedItem::Player(_) => PlayerRecord::COLUMNS,
            ScrapedItem::Lineup(_) => LineupRecord::COLUMNS,
            ScrapedItem::Failure(_) => FailureRecord::COLUMNS,
        }
    }
}
