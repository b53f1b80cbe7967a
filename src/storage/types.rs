use serde::Serialize;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Default)]
pub enum StorageCategory {
    #[default]
    Matches, // One row per match
    Events,   // Match centre event stream
    Players,  // Squad members seen in a match
    Lineups,  // Per-match lineup and substitutions
    Failures, // Pages skipped during the run
}

impl StorageCategory {
    pub const ALL: [StorageCategory; 5] = [
        StorageCategory::Matches,
        StorageCategory::Events,
        StorageCategory::Players,
        StorageCategory::Lineups,
        StorageCategory::Failures,
    ];

    /// Default destination name (file stem) for the category.
    pub fn destination(&self) -> &'static str {
        match self {
            StorageCategory::Matches => "matches",
            StorageCategory::Events => "events",
            StorageCategory::Players => "players",
            StorageCategory::Lineups => "lineups",
            StorageCategory::Failures => "failures",
        }
    }
}
