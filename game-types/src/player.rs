use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PlayerId;

/// A local player sharing the device. Lives for the duration of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            score: 0,
        }
    }
}

/// Player plus the per-round progress flags, as the view sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStatus {
    pub player: Player,
    pub has_answered: bool,
    pub has_voted: bool,
}
