use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Difficulty, PlayerId};

/// Everything the view layer can ask the game to do.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum GameAction {
    AddPlayer { name: String },
    RemovePlayer { player_id: PlayerId },
    SetDifficulty { difficulty: Difficulty },
    StartGame,
    ProceedToAnswers,
    BeginAnswer,
    RequestSuggestions,
    SubmitAnswer { text: String },
    SubmitVote { suspect_id: PlayerId },
    Continue,
    ViewHistory,
    ViewLeaderboard,
    BackToSetup,
    ResetGame,
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::AddPlayer { .. } => "add a player",
            GameAction::RemovePlayer { .. } => "remove a player",
            GameAction::SetDifficulty { .. } => "change difficulty",
            GameAction::StartGame => "start the game",
            GameAction::ProceedToAnswers => "proceed to answers",
            GameAction::BeginAnswer => "begin answering",
            GameAction::RequestSuggestions => "request suggestions",
            GameAction::SubmitAnswer { .. } => "submit an answer",
            GameAction::SubmitVote { .. } => "submit a vote",
            GameAction::Continue => "continue",
            GameAction::ViewHistory => "view history",
            GameAction::ViewLeaderboard => "view the leaderboard",
            GameAction::BackToSetup => "go back to setup",
            GameAction::ResetGame => "reset the game",
        }
    }
}
