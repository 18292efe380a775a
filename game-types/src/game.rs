use crate::PlayerId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::player::{Player, PlayerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum GamePhase {
    Setup,
    Question,
    Ready,
    Answer,
    Voting,
    Results,
    Final,
    History,
    Leaderboard,
}

impl GamePhase {
    /// Phases reachable from `self` in one transition.
    pub fn successors(self) -> &'static [GamePhase] {
        use GamePhase::*;
        match self {
            Setup => &[Question, History, Leaderboard],
            Question => &[Ready, Answer],
            Ready => &[Answer],
            Answer => &[Ready, Voting],
            Voting => &[Results],
            Results => &[Question, Final],
            Final => &[Setup],
            History | Leaderboard => &[Setup],
        }
    }

    pub fn can_transition_to(self, next: GamePhase) -> bool {
        self.successors().contains(&next)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub player_id: PlayerId,
    pub player_name: String,
    pub text: String,
    pub is_imposter: bool,
    pub impersonating: Option<String>, // Target name, imposter only
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Vote {
    pub voter_id: PlayerId,
    pub suspect_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SuspectVotes {
    pub suspect_id: PlayerId,
    pub votes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoundOutcome {
    ImposterCaught,
    ImposterSurvived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreChange {
    pub player_id: PlayerId,
    pub points: u32,
}

/// Everything revealed once voting closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundResults {
    pub round_number: u32,
    pub imposter: Player,
    pub target: Player,
    pub outcome: RoundOutcome,
    pub tallied_suspect: Option<PlayerId>,
    pub max_votes: u32,
    pub vote_counts: Vec<SuspectVotes>,
    pub score_changes: Vec<ScoreChange>,
    pub answers: Vec<Answer>,
    pub votes: Vec<Vote>,
    pub analysis: Option<String>,
}

/// Role information shown only to the player whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrentRole {
    pub is_imposter: bool,
    pub impersonating: Option<String>,
    pub suggestions: Vec<String>,
}

/// An answer shown on the ballot without its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BallotEntry {
    pub text: String,
}

/// View-facing state. Hides roles until the round is scored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub round_number: u32,
    pub total_rounds: u32,
    pub question: Option<String>,
    pub countdown_remaining: u32,
    pub players: Vec<PlayerStatus>,
    pub current_player: Option<Player>,
    pub current_role: Option<CurrentRole>,
    pub ballot: Vec<BallotEntry>,
    pub results: Option<RoundResults>,
    pub final_standings: Vec<Player>,
    pub awaiting_service: bool,
}
