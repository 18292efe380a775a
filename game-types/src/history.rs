use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Player;

/// Finished games kept in memory and in storage.
pub const HISTORY_LIMIT: usize = 10;

/// Snapshot of one finished game. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameRecord {
    pub date: String, // ISO 8601 string
    pub rounds: u32,
    pub winner: Player,
    pub players: Vec<Player>, // Sorted by score, highest first
}

/// Cross-game statistics for one player name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerProfile {
    pub name: String,
    pub total_score: u32,
    pub wins: u32,
    pub games_played: u32,
    pub high_score: u32,
    pub avg_score: u32,
    pub total_rounds: u32,
    pub win_rate: u32, // Percentage, rounded
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSummary {
    pub record: GameRecord,
    pub average_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistorySummary {
    pub games: Vec<GameSummary>, // Most recent first
    pub total_games: u32,
    pub total_rounds: u32,
}
