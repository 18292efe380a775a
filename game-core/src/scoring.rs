use game_types::{Player, PlayerId, RoundOutcome, ScoreChange, Vote};

use crate::TallyResult;

pub const CATCH_POINTS: u32 = 100;
pub const SURVIVE_POINTS: u32 = 200;
pub const NO_VOTES_BONUS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    pub players: Vec<Player>,
    pub outcome: RoundOutcome,
    pub changes: Vec<ScoreChange>,
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Apply the round's points to a copy of `players`.
    ///
    /// Caught: every player who voted for the imposter gains 100.
    /// Survived: the imposter gains 200, plus 50 when nobody received a vote.
    pub fn score_round(
        players: &[Player],
        imposter_id: PlayerId,
        votes: &[Vote],
        tally: &TallyResult,
    ) -> RoundScore {
        let outcome = if tally.imposter_caught {
            RoundOutcome::ImposterCaught
        } else {
            RoundOutcome::ImposterSurvived
        };

        let mut changes = Vec::new();
        let players = players
            .iter()
            .map(|player| {
                let points = Self::points_for(player.id, imposter_id, votes, tally);
                if points == 0 {
                    return player.clone();
                }
                changes.push(ScoreChange {
                    player_id: player.id,
                    points,
                });
                Player {
                    score: player.score + points,
                    ..player.clone()
                }
            })
            .collect();

        RoundScore {
            players,
            outcome,
            changes,
        }
    }

    fn points_for(
        player_id: PlayerId,
        imposter_id: PlayerId,
        votes: &[Vote],
        tally: &TallyResult,
    ) -> u32 {
        if tally.imposter_caught {
            let voted_for_imposter = votes
                .iter()
                .find(|v| v.voter_id == player_id)
                .is_some_and(|v| v.suspect_id == imposter_id);
            if voted_for_imposter { CATCH_POINTS } else { 0 }
        } else if player_id == imposter_id {
            // Only reachable when no votes were cast at all
            let bonus = if tally.max_votes == 0 { NO_VOTES_BONUS } else { 0 };
            SURVIVE_POINTS + bonus
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoteTally;

    fn players() -> Vec<Player> {
        vec![Player::new("P1"), Player::new("P2"), Player::new("P3")]
    }

    fn vote(voter: &Player, suspect: &Player) -> Vote {
        Vote {
            voter_id: voter.id,
            suspect_id: suspect.id,
        }
    }

    #[test]
    fn test_caught_rewards_only_correct_voters() {
        let players = players();
        let (p1, p2, p3) = (&players[0], &players[1], &players[2]);
        let votes = vec![vote(p1, p3), vote(p2, p3), vote(p3, p1)];
        let tally = VoteTally::tally(&votes, p3.id);

        let result = ScoringEngine::score_round(&players, p3.id, &votes, &tally);
        assert_eq!(result.outcome, RoundOutcome::ImposterCaught);
        assert_eq!(result.players[0].score, 100);
        assert_eq!(result.players[1].score, 100);
        assert_eq!(result.players[2].score, 0);
        assert_eq!(result.changes.len(), 2);
    }

    #[test]
    fn test_survivor_gains_200_without_bonus() {
        let players = players();
        let (p1, p2, p3) = (&players[0], &players[1], &players[2]);
        let votes = vec![vote(p1, p2), vote(p2, p1), vote(p3, p1)];
        let tally = VoteTally::tally(&votes, p3.id);

        let result = ScoringEngine::score_round(&players, p3.id, &votes, &tally);
        assert_eq!(result.outcome, RoundOutcome::ImposterSurvived);
        assert_eq!(result.players[0].score, 0);
        assert_eq!(result.players[1].score, 0);
        assert_eq!(result.players[2].score, 200);
        assert_eq!(
            result.changes,
            vec![ScoreChange {
                player_id: p3.id,
                points: 200
            }]
        );
    }

    #[test]
    fn test_survivor_with_no_votes_gains_250() {
        let players = players();
        let imposter = players[1].id;
        let tally = VoteTally::tally(&[], imposter);

        let result = ScoringEngine::score_round(&players, imposter, &[], &tally);
        assert_eq!(result.players[1].score, 250);
        assert_eq!(result.players[0].score, 0);
    }

    #[test]
    fn test_scoring_is_pure_and_repeatable() {
        let mut players = players();
        players[0].score = 300;
        let (p1, p2, p3) = (&players[0], &players[1], &players[2]);
        let votes = vec![vote(p1, p3), vote(p2, p1), vote(p3, p1)];
        let tally = VoteTally::tally(&votes, p3.id);

        let first = ScoringEngine::score_round(&players, p3.id, &votes, &tally);
        let second = ScoringEngine::score_round(&players, p3.id, &votes, &tally);
        assert_eq!(first, second);
        // Input untouched
        assert_eq!(players[0].score, 300);
        assert_eq!(players[2].score, 0);
        assert_eq!(first.players[2].score, 200);
    }

    #[test]
    fn test_scores_never_decrease() {
        let mut players = players();
        for (i, p) in players.iter_mut().enumerate() {
            p.score = (i as u32) * 100;
        }
        let votes = vec![vote(&players[0], &players[1])];
        let tally = VoteTally::tally(&votes, players[1].id);

        let result = ScoringEngine::score_round(&players, players[1].id, &votes, &tally);
        for (before, after) in players.iter().zip(&result.players) {
            assert!(after.score >= before.score);
        }
    }
}
