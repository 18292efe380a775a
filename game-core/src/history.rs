use game_types::{GameRecord, GameSummary, HistorySummary, PlayerProfile};

pub use game_types::HISTORY_LIMIT;

/// Derives cross-game statistics from persisted records.
///
/// Players are grouped by name since ids only live for one game.
pub struct HistoryAggregator;

impl HistoryAggregator {
    /// Append a finished game, keeping only the most recent `HISTORY_LIMIT`.
    pub fn append(history: &mut Vec<GameRecord>, record: GameRecord) {
        history.push(record);
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
    }

    /// Profiles sorted by total score, highest first.
    pub fn profiles(history: &[GameRecord]) -> Vec<PlayerProfile> {
        let mut profiles: Vec<PlayerProfile> = Vec::new();

        for record in history {
            for player in &record.players {
                let index = match profiles.iter().position(|p| p.name == player.name) {
                    Some(index) => index,
                    None => {
                        profiles.push(PlayerProfile {
                            name: player.name.clone(),
                            total_score: 0,
                            wins: 0,
                            games_played: 0,
                            high_score: 0,
                            avg_score: 0,
                            total_rounds: 0,
                            win_rate: 0,
                        });
                        profiles.len() - 1
                    }
                };

                let profile = &mut profiles[index];
                profile.games_played += 1;
                profile.total_score += player.score;
                profile.high_score = profile.high_score.max(player.score);
                profile.total_rounds += record.rounds;
                if record.winner.name == player.name {
                    profile.wins += 1;
                }
            }
        }

        for profile in &mut profiles {
            profile.avg_score = rounded_div(profile.total_score, profile.games_played);
            profile.win_rate = rounded_div(profile.wins * 100, profile.games_played);
        }

        profiles.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        profiles
    }

    pub fn summary(history: &[GameRecord]) -> HistorySummary {
        let games = history
            .iter()
            .rev()
            .map(|record| {
                let total: u32 = record.players.iter().map(|p| p.score).sum();
                GameSummary {
                    record: record.clone(),
                    average_score: rounded_div(total, record.players.len() as u32),
                }
            })
            .collect();

        HistorySummary {
            games,
            total_games: history.len() as u32,
            total_rounds: history.iter().map(|r| r.rounds).sum(),
        }
    }
}

/// Integer division rounding halves up; zero when `denominator` is zero.
fn rounded_div(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (numerator * 2 + denominator) / (denominator * 2)
}
