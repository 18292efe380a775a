use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GamePhase, PlayerId};

/// Guard violations. Returned instead of changing state; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("Invalid player name: {reason}")]
    InvalidPlayerName { reason: String },
    #[error("A player named {name} already exists")]
    DuplicatePlayerName { name: String },
    #[error("At most {max} players can join")]
    TooManyPlayers { max: u32 },
    #[error("Need at least {required} players to start, have {actual}")]
    NotEnoughPlayers { required: u32, actual: u32 },
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: PlayerId },
    #[error("Invalid answer: {reason}")]
    InvalidAnswer { reason: String },
    #[error("Players cannot vote for themselves")]
    SelfVote,
    #[error("Suggestions are only available to the imposter on their turn")]
    SuggestionsUnavailable,
    #[error("Cannot {action} during {phase:?}")]
    InvalidTransition { phase: GamePhase, action: String },
    #[error("Waiting for the previous request to finish")]
    AwaitingService,
}

impl GameError {
    pub fn invalid_transition(phase: GamePhase, action: &str) -> Self {
        GameError::InvalidTransition {
            phase,
            action: action.to_string(),
        }
    }
}
