use game_types::{
    Answer, BallotEntry, CurrentRole, Difficulty, GameAction, GameError, GamePhase, GameRecord,
    GameSnapshot, Player, PlayerId, PlayerStatus, RoundResults, Vote,
};
use tracing::{debug, info, warn};

use crate::{
    AnalysisRequest, Effect, FallbackContent, GameEvent, GameEventBus, HistoryAggregator,
    InputValidator, QuestionRequest, RngSelector, ScoringEngine, SuggestionsRequest,
    SUGGESTION_COUNT, TextRequest, TextResult, TurnOutcome, TurnSequencer, VoteTally,
};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 8;
pub const TOTAL_ROUNDS: u32 = 5;
pub const COUNTDOWN_SECONDS: u32 = 15;

/// State that only lives for one round. A fresh one is built every round.
#[derive(Debug, Clone)]
pub struct Round {
    pub number: u32,
    pub question: String,
    pub imposter_index: usize,
    pub target_index: usize,
    pub turns: TurnSequencer,
    pub answers: Vec<Answer>,
    pub votes: Vec<Vote>,
    pub ballot: Vec<String>, // Answer texts, shuffled once voting opens
    pub suggestions: Vec<String>,
    pub suggestions_requested: bool,
    pub results: Option<RoundResults>,
}

impl Round {
    fn new(number: u32, imposter_index: usize, target_index: usize) -> Self {
        Self {
            number,
            question: String::new(),
            imposter_index,
            target_index,
            turns: TurnSequencer::new(),
            answers: Vec::new(),
            votes: Vec::new(),
            ballot: Vec::new(),
            suggestions: Vec::new(),
            suggestions_requested: false,
            results: None,
        }
    }

    pub fn has_answered(&self, player_id: PlayerId) -> bool {
        self.answers.iter().any(|a| a.player_id == player_id)
    }

    pub fn has_voted(&self, player_id: PlayerId) -> bool {
        self.votes.iter().any(|v| v.voter_id == player_id)
    }
}

/// The round/game state machine.
///
/// Every operation either fails with a [`GameError`] and leaves the state
/// untouched, or performs one transition and returns the [`Effect`]s the
/// owner has to run.
#[derive(Debug)]
pub struct Game {
    phase: GamePhase,
    difficulty: Difficulty,
    players: Vec<Player>,
    round: Option<Round>,
    /// Next round, staged until its question arrives.
    pending_round: Option<Round>,
    countdown: u32,
    final_standings: Vec<Player>,
    history: Vec<GameRecord>,
    rng: RngSelector,
    pub event_bus: GameEventBus,
}

impl Game {
    pub fn new(rng: RngSelector) -> Self {
        Self {
            phase: GamePhase::Setup,
            difficulty: Difficulty::default(),
            players: Vec::new(),
            round: None,
            pending_round: None,
            countdown: 0,
            final_standings: Vec::new(),
            history: Vec::new(),
            rng,
            event_bus: GameEventBus::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(RngSelector::new(seed))
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    pub fn final_standings(&self) -> &[Player] {
        &self.final_standings
    }

    pub fn is_awaiting_service(&self) -> bool {
        self.pending_round.is_some()
    }

    /// Install history read from storage, keeping the most recent games.
    pub fn load_history(&mut self, records: Vec<GameRecord>) {
        self.history.clear();
        for record in records {
            HistoryAggregator::append(&mut self.history, record);
        }
    }

    /// Dispatch a view action to the matching transition.
    pub fn apply(&mut self, action: GameAction) -> Result<Vec<Effect>, GameError> {
        if self.is_awaiting_service() {
            return Err(GameError::AwaitingService);
        }

        match action {
            GameAction::AddPlayer { name } => self.add_player(&name).map(|_| Vec::new()),
            GameAction::RemovePlayer { player_id } => {
                self.remove_player(player_id).map(|_| Vec::new())
            }
            GameAction::SetDifficulty { difficulty } => {
                self.set_difficulty(difficulty).map(|_| Vec::new())
            }
            GameAction::StartGame => self.start_game(),
            GameAction::ProceedToAnswers => self.proceed_to_answers().map(|_| Vec::new()),
            GameAction::BeginAnswer => self.begin_answer().map(|_| Vec::new()),
            GameAction::RequestSuggestions => self.request_suggestions(),
            GameAction::SubmitAnswer { text } => self.submit_answer(&text).map(|_| Vec::new()),
            GameAction::SubmitVote { suspect_id } => self.submit_vote(suspect_id),
            GameAction::Continue => self.continue_game(),
            GameAction::ViewHistory => self.view_side_state(GamePhase::History, "view history"),
            GameAction::ViewLeaderboard => {
                self.view_side_state(GamePhase::Leaderboard, "view the leaderboard")
            }
            GameAction::BackToSetup => self.back_to_setup().map(|_| Vec::new()),
            GameAction::ResetGame => self.reset().map(|_| Vec::new()),
        }
    }

    pub fn add_player(&mut self, name: &str) -> Result<Player, GameError> {
        self.expect_phase(GamePhase::Setup, "add a player")?;

        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::TooManyPlayers {
                max: MAX_PLAYERS as u32,
            });
        }

        let name = InputValidator::player_name(name, &self.players)?;
        let player = Player::new(name);
        self.players.push(player.clone());

        debug!("Added player {} ({})", player.name, player.id);
        self.event_bus.publish(GameEvent::PlayerAdded {
            player: player.clone(),
        });
        Ok(player)
    }

    /// Only allowed before the game starts, so rounds never lose a player.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Setup, "remove a player")?;

        let index = self.player_index(player_id)?;
        self.players.remove(index);

        self.event_bus.publish(GameEvent::PlayerRemoved { player_id });
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Setup, "change difficulty")?;
        self.difficulty = difficulty;
        Ok(())
    }

    /// SETUP -> QUESTION, once the question arrives.
    pub fn start_game(&mut self) -> Result<Vec<Effect>, GameError> {
        self.expect_phase(GamePhase::Setup, "start the game")?;
        self.expect_not_pending()?;

        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS as u32,
                actual: self.players.len() as u32,
            });
        }

        let n = self.players.len();
        let imposter = self.draw(n, &[])?;
        let target = self.draw(n, &[imposter])?;

        info!("Starting game with {} players on {:?}", n, self.difficulty);
        Ok(self.stage_round(Round::new(1, imposter, target)))
    }

    /// Accept the question for `round`, or fall back when the service failed.
    ///
    /// Results for a round that is not pending are ignored.
    pub fn deliver_question(&mut self, round: u32, result: TextResult<String>) -> Vec<Effect> {
        let Some(mut next) = self.pending_round.take_if(|r| r.number == round) else {
            debug!("Ignoring question for round {} with nothing pending", round);
            return Vec::new();
        };

        let (question, used_fallback) = match result {
            Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), false),
            Ok(_) => {
                warn!("Question service returned empty text, using fallback");
                (FallbackContent::question(self.difficulty, &mut self.rng), true)
            }
            Err(failure) => {
                warn!("Question service failed ({:?}), using fallback", failure);
                (FallbackContent::question(self.difficulty, &mut self.rng), true)
            }
        };

        next.question = question;
        self.round = Some(next);
        self.countdown = COUNTDOWN_SECONDS;
        self.set_phase(GamePhase::Question);

        self.event_bus.publish(GameEvent::RoundStarted {
            round,
            player_count: self.players.len(),
        });
        self.event_bus.publish(GameEvent::QuestionRevealed {
            round,
            used_fallback,
        });

        vec![Effect::StartCountdown {
            round,
            seconds: COUNTDOWN_SECONDS,
        }]
    }

    /// One countdown step. At zero, QUESTION moves straight to ANSWER.
    ///
    /// Returns whether the countdown should keep ticking. A tick for another
    /// round, or after the phase already moved on, changes nothing.
    pub fn tick(&mut self, round: u32) -> bool {
        if self.phase != GamePhase::Question || self.current_round_number() != Some(round) {
            return false;
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return true;
        }

        if let Some(current) = self.round.as_mut() {
            current.turns.reset();
        }
        self.set_phase(GamePhase::Answer);
        false
    }

    /// Manual QUESTION -> READY, skipping the rest of the countdown.
    pub fn proceed_to_answers(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Question, "proceed to answers")?;
        self.countdown = 0;
        self.current_round_mut()?.turns.reset();
        self.set_phase(GamePhase::Ready);
        Ok(())
    }

    /// READY -> ANSWER for the player whose turn it is.
    pub fn begin_answer(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Ready, "begin answering")?;
        self.set_phase(GamePhase::Answer);
        Ok(())
    }

    /// Override the drawn roles for the current round before anyone answers.
    pub fn assign_roles(
        &mut self,
        imposter_index: usize,
        target_index: usize,
    ) -> Result<(), GameError> {
        let phase = self.phase;
        if !matches!(phase, GamePhase::Question | GamePhase::Ready | GamePhase::Answer) {
            return Err(GameError::invalid_transition(phase, "assign roles"));
        }

        let n = self.players.len();
        if imposter_index >= n || target_index >= n || imposter_index == target_index {
            return Err(GameError::invalid_transition(phase, "assign roles"));
        }

        let round = self.current_round_mut()?;
        if !round.answers.is_empty() {
            return Err(GameError::invalid_transition(phase, "assign roles"));
        }
        round.imposter_index = imposter_index;
        round.target_index = target_index;
        round.suggestions.clear();
        round.suggestions_requested = false;
        Ok(())
    }

    /// Ask for answer ideas. Only the imposter, on their own turn, once per round.
    pub fn request_suggestions(&mut self) -> Result<Vec<Effect>, GameError> {
        self.expect_phase(GamePhase::Answer, "request suggestions")?;

        let target_name = {
            let round = self.current_round()?;
            if round.turns.current() != round.imposter_index {
                return Err(GameError::SuggestionsUnavailable);
            }
            if round.suggestions_requested {
                return Ok(Vec::new());
            }
            self.players[round.target_index].name.clone()
        };

        let round = self.current_round_mut()?;
        round.suggestions_requested = true;
        let request = SuggestionsRequest {
            round: round.number,
            question: round.question.clone(),
            target_name,
            answers_so_far: round.answers.iter().map(|a| a.text.clone()).collect(),
        };

        debug!("Requesting imposter suggestions for round {}", request.round);
        Ok(vec![Effect::Generate(TextRequest::Suggestions(request))])
    }

    pub fn deliver_suggestions(&mut self, round: u32, result: TextResult<Vec<String>>) {
        let Some(current) = self.round.as_mut().filter(|r| r.number == round) else {
            return;
        };
        if !current.suggestions_requested || !current.suggestions.is_empty() {
            return;
        }

        current.suggestions = match result {
            Ok(suggestions)
                if suggestions.len() == SUGGESTION_COUNT
                    && suggestions.iter().all(|s| !s.trim().is_empty()) =>
            {
                suggestions.into_iter().map(|s| s.trim().to_string()).collect()
            }
            Ok(suggestions) => {
                warn!(
                    "Expected {} suggestions, got {}; using fallback",
                    SUGGESTION_COUNT,
                    suggestions.len()
                );
                FallbackContent::suggestions()
            }
            Err(failure) => {
                warn!("Suggestion service failed ({:?}), using fallback", failure);
                FallbackContent::suggestions()
            }
        };
    }

    /// Record the current player's answer, then READY for the next player or VOTING.
    pub fn submit_answer(&mut self, text: &str) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Answer, "submit an answer")?;
        let text = InputValidator::answer(text)?;

        let player_count = self.players.len();
        let round = self.round.as_mut().ok_or_else(|| {
            GameError::invalid_transition(GamePhase::Answer, "submit an answer")
        })?;

        let index = round.turns.current();
        let player = &self.players[index];
        let is_imposter = index == round.imposter_index;
        let impersonating = is_imposter.then(|| self.players[round.target_index].name.clone());
        round.answers.push(Answer {
            player_id: player.id,
            player_name: player.name.clone(),
            text,
            is_imposter,
            impersonating,
        });

        let event = GameEvent::AnswerSubmitted {
            round: round.number,
            player_id: player.id,
        };

        match round.turns.advance(player_count) {
            TurnOutcome::Next(_) => {
                self.set_phase(GamePhase::Ready);
            }
            TurnOutcome::PhaseComplete => {
                let mut ballot: Vec<String> =
                    round.answers.iter().map(|a| a.text.clone()).collect();
                self.rng.shuffle(&mut ballot);
                round.ballot = ballot;
                self.set_phase(GamePhase::Voting);
            }
        }

        self.event_bus.publish(event);
        Ok(())
    }

    /// Record the current player's vote; the last vote scores the round.
    pub fn submit_vote(&mut self, suspect_id: PlayerId) -> Result<Vec<Effect>, GameError> {
        self.expect_phase(GamePhase::Voting, "submit a vote")?;
        self.player_index(suspect_id)?;

        let player_count = self.players.len();
        let round = self.round.as_mut().ok_or_else(|| {
            GameError::invalid_transition(GamePhase::Voting, "submit a vote")
        })?;

        let voter_id = self.players[round.turns.current()].id;
        if voter_id == suspect_id {
            return Err(GameError::SelfVote);
        }

        round.votes.push(Vote {
            voter_id,
            suspect_id,
        });
        let round_number = round.number;
        let outcome = round.turns.advance(player_count);

        self.event_bus.publish(GameEvent::VoteCast {
            round: round_number,
            voter_id,
        });

        match outcome {
            TurnOutcome::Next(_) => Ok(Vec::new()),
            TurnOutcome::PhaseComplete => Ok(self.score_round()),
        }
    }

    /// VOTING -> RESULTS. Analysis is requested but never waited for.
    fn score_round(&mut self) -> Vec<Effect> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };

        let imposter = self.players[round.imposter_index].clone();
        let target = self.players[round.target_index].clone();
        let tally = VoteTally::tally(&round.votes, imposter.id);
        let scored = ScoringEngine::score_round(&self.players, imposter.id, &round.votes, &tally);

        info!(
            "Round {} scored: {:?} (imposter {}, {} votes max)",
            round.number, scored.outcome, imposter.name, tally.max_votes
        );

        round.results = Some(RoundResults {
            round_number: round.number,
            imposter: imposter.clone(),
            target: target.clone(),
            outcome: scored.outcome,
            tallied_suspect: tally.tallied_suspect,
            max_votes: tally.max_votes,
            vote_counts: tally.counts.clone(),
            score_changes: scored.changes.clone(),
            answers: round.answers.clone(),
            votes: round.votes.clone(),
            analysis: None,
        });

        let imposter_answer = round
            .answers
            .iter()
            .find(|a| a.is_imposter)
            .map(|a| a.text.clone())
            .unwrap_or_default();
        let request = AnalysisRequest {
            round: round.number,
            question: round.question.clone(),
            imposter_name: imposter.name,
            target_name: target.name,
            imposter_answer,
            other_answers: round
                .answers
                .iter()
                .filter(|a| !a.is_imposter)
                .map(|a| (a.player_name.clone(), a.text.clone()))
                .collect(),
            outcome: scored.outcome,
        };
        let round_number = round.number;

        self.players = scored.players;
        self.set_phase(GamePhase::Results);
        self.event_bus.publish(GameEvent::RoundScored {
            round: round_number,
            outcome: scored.outcome,
            changes: scored.changes,
        });

        vec![Effect::Generate(TextRequest::Analysis(request))]
    }

    pub fn deliver_analysis(&mut self, round: u32, result: TextResult<String>) {
        let Some(results) = self
            .round
            .as_mut()
            .filter(|r| r.number == round)
            .and_then(|r| r.results.as_mut())
        else {
            return;
        };
        if results.analysis.is_some() {
            return;
        }

        results.analysis = Some(match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => FallbackContent::analysis(results.outcome),
            Err(failure) => {
                warn!("Analysis service failed ({:?}), using fallback", failure);
                FallbackContent::analysis(results.outcome)
            }
        });
    }

    /// RESULTS -> next round's QUESTION, or FINAL after the last round.
    pub fn continue_game(&mut self) -> Result<Vec<Effect>, GameError> {
        self.expect_phase(GamePhase::Results, "continue")?;
        self.expect_not_pending()?;

        let (number, previous_imposter) = {
            let round = self.current_round()?;
            (round.number, round.imposter_index)
        };

        if number >= TOTAL_ROUNDS {
            return Ok(self.end_game(number));
        }

        let n = self.players.len();
        let excluded = if n > 1 { vec![previous_imposter] } else { Vec::new() };
        let imposter = self.draw(n, &excluded)?;
        let target = self.draw(n, &[imposter])?;

        Ok(self.stage_round(Round::new(number + 1, imposter, target)))
    }

    fn end_game(&mut self, rounds: u32) -> Vec<Effect> {
        let mut standings = self.players.clone();
        standings.sort_by(|a, b| b.score.cmp(&a.score));

        let record = GameRecord {
            date: chrono::Utc::now().to_rfc3339(),
            rounds,
            winner: standings[0].clone(),
            players: standings.clone(),
        };

        info!(
            "Game over after {} rounds, winner {} with {}",
            rounds, record.winner.name, record.winner.score
        );

        HistoryAggregator::append(&mut self.history, record.clone());
        self.final_standings = standings;
        self.set_phase(GamePhase::Final);
        self.event_bus.publish(GameEvent::GameCompleted { record });

        vec![Effect::PersistHistory(self.history.clone())]
    }

    /// FINAL -> SETUP. Clears the game but keeps history.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Final, "reset the game")?;

        self.players.clear();
        self.round = None;
        self.pending_round = None;
        self.countdown = 0;
        self.final_standings.clear();
        self.set_phase(GamePhase::Setup);

        self.event_bus.publish(GameEvent::GameReset);
        Ok(())
    }

    fn view_side_state(
        &mut self,
        next: GamePhase,
        action: &str,
    ) -> Result<Vec<Effect>, GameError> {
        self.expect_phase(GamePhase::Setup, action)?;
        self.set_phase(next);
        Ok(Vec::new())
    }

    pub fn view_history(&mut self) -> Result<(), GameError> {
        self.view_side_state(GamePhase::History, "view history").map(|_| ())
    }

    pub fn view_leaderboard(&mut self) -> Result<(), GameError> {
        self.view_side_state(GamePhase::Leaderboard, "view the leaderboard").map(|_| ())
    }

    pub fn back_to_setup(&mut self) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::History | GamePhase::Leaderboard) {
            return Err(GameError::invalid_transition(self.phase, "go back to setup"));
        }
        self.set_phase(GamePhase::Setup);
        Ok(())
    }

    /// View-facing state. Roles stay hidden until the round is scored.
    pub fn snapshot(&self) -> GameSnapshot {
        let round = self.round.as_ref();
        let in_turns = matches!(
            self.phase,
            GamePhase::Ready | GamePhase::Answer | GamePhase::Voting
        );

        let players = self
            .players
            .iter()
            .map(|player| PlayerStatus {
                player: player.clone(),
                has_answered: round.is_some_and(|r| r.has_answered(player.id)),
                has_voted: round.is_some_and(|r| r.has_voted(player.id)),
            })
            .collect();

        let current_index = round.filter(|_| in_turns).map(|r| r.turns.current());

        let current_role = round
            .filter(|_| self.phase == GamePhase::Answer)
            .map(|r| {
                let is_imposter = r.turns.current() == r.imposter_index;
                CurrentRole {
                    is_imposter,
                    impersonating: is_imposter.then(|| self.players[r.target_index].name.clone()),
                    suggestions: if is_imposter { r.suggestions.clone() } else { Vec::new() },
                }
            });

        let ballot = round
            .filter(|_| self.phase == GamePhase::Voting)
            .map(|r| {
                r.ballot
                    .iter()
                    .map(|text| BallotEntry { text: text.clone() })
                    .collect()
            })
            .unwrap_or_default();

        let results = round
            .filter(|_| matches!(self.phase, GamePhase::Results | GamePhase::Final))
            .and_then(|r| r.results.clone());

        GameSnapshot {
            phase: self.phase,
            difficulty: self.difficulty,
            round_number: round.map_or(0, |r| r.number),
            total_rounds: TOTAL_ROUNDS,
            question: round.map(|r| r.question.clone()),
            countdown_remaining: if self.phase == GamePhase::Question {
                self.countdown
            } else {
                0
            },
            players,
            current_player: current_index.map(|i| self.players[i].clone()),
            current_role,
            ballot,
            results,
            final_standings: self.final_standings.clone(),
            awaiting_service: self.is_awaiting_service(),
        }
    }

    fn stage_round(&mut self, round: Round) -> Vec<Effect> {
        let request = QuestionRequest {
            round: round.number,
            difficulty: self.difficulty,
            player_count: self.players.len(),
        };
        debug!(
            "Round {} staged: imposter #{}, target #{}",
            round.number, round.imposter_index, round.target_index
        );
        self.pending_round = Some(round);
        vec![Effect::Generate(TextRequest::Question(request))]
    }

    fn draw(&mut self, n: usize, forbidden: &[usize]) -> Result<usize, GameError> {
        self.rng
            .pick_distinct(n, forbidden)
            .ok_or(GameError::NotEnoughPlayers {
                required: MIN_PLAYERS as u32,
                actual: n as u32,
            })
    }

    fn set_phase(&mut self, next: GamePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        info!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    fn expect_phase(&self, expected: GamePhase, action: &str) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::invalid_transition(self.phase, action));
        }
        Ok(())
    }

    fn expect_not_pending(&self) -> Result<(), GameError> {
        if self.is_awaiting_service() {
            return Err(GameError::AwaitingService);
        }
        Ok(())
    }

    fn player_index(&self, player_id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound { player_id })
    }

    fn current_round_number(&self) -> Option<u32> {
        self.round.as_ref().map(|r| r.number)
    }

    fn current_round(&self) -> Result<&Round, GameError> {
        self.round
            .as_ref()
            .ok_or_else(|| GameError::invalid_transition(self.phase, "play a round"))
    }

    fn current_round_mut(&mut self) -> Result<&mut Round, GameError> {
        let phase = self.phase;
        self.round
            .as_mut()
            .ok_or_else(|| GameError::invalid_transition(phase, "play a round"))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(RngSelector::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextFailure;

    fn game_with_players(names: &[&str]) -> Game {
        let mut game = Game::with_seed(9);
        for name in names {
            game.add_player(name).unwrap();
        }
        game
    }

    fn started(names: &[&str]) -> Game {
        let mut game = game_with_players(names);
        game.start_game().unwrap();
        game.deliver_question(1, Ok("What's your comfort food?".to_string()));
        game
    }

    #[test]
    fn test_start_requires_three_players() {
        let mut game = game_with_players(&["Alice", "Bob"]);
        assert_eq!(
            game.start_game(),
            Err(GameError::NotEnoughPlayers {
                required: 3,
                actual: 2
            })
        );
        assert_eq!(game.phase(), GamePhase::Setup);
        assert!(!game.is_awaiting_service());
    }

    #[test]
    fn test_start_waits_for_question() {
        let mut game = game_with_players(&["Alice", "Bob", "Cara"]);
        let effects = game.start_game().unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Generate(TextRequest::Question(QuestionRequest { round: 1, .. }))]
        ));
        assert_eq!(game.phase(), GamePhase::Setup);
        assert!(game.is_awaiting_service());
        assert_eq!(game.apply(GameAction::ViewHistory), Err(GameError::AwaitingService));

        let effects = game.deliver_question(1, Ok("  Tea or coffee? ".to_string()));
        assert_eq!(
            effects,
            vec![Effect::StartCountdown {
                round: 1,
                seconds: COUNTDOWN_SECONDS
            }]
        );
        assert_eq!(game.phase(), GamePhase::Question);
        assert_eq!(game.round().unwrap().question, "Tea or coffee?");
        assert_eq!(game.countdown(), COUNTDOWN_SECONDS);
    }

    #[test]
    fn test_question_failure_uses_fallback() {
        let mut game = game_with_players(&["Alice", "Bob", "Cara"]);
        game.set_difficulty(Difficulty::Hard).unwrap();
        game.start_game().unwrap();
        game.deliver_question(1, Err(TextFailure::Unavailable("offline".to_string())));

        let question = &game.round().unwrap().question;
        assert!(FallbackContent::questions(Difficulty::Hard).contains(&question.as_str()));
        assert_eq!(game.phase(), GamePhase::Question);
    }

    #[test]
    fn test_stale_question_is_ignored() {
        let mut game = game_with_players(&["Alice", "Bob", "Cara"]);
        game.start_game().unwrap();
        assert!(game.deliver_question(2, Ok("Wrong round".to_string())).is_empty());
        assert!(game.is_awaiting_service());
    }

    #[test]
    fn test_imposter_and_target_differ() {
        for seed in 0..50 {
            let mut game = Game::with_seed(seed);
            for i in 0..(3 + seed as usize % 6) {
                game.add_player(&format!("P{}", i)).unwrap();
            }
            game.start_game().unwrap();
            game.deliver_question(1, Ok("Q".to_string()));
            let round = game.round().unwrap();
            assert_ne!(round.imposter_index, round.target_index);
        }
    }

    #[test]
    fn test_countdown_moves_to_answer_once() {
        let mut game = started(&["Alice", "Bob", "Cara"]);
        for _ in 0..COUNTDOWN_SECONDS - 1 {
            assert!(game.tick(1));
        }
        assert!(!game.tick(1));
        assert_eq!(game.phase(), GamePhase::Answer);

        // Late ticks and a late manual proceed are no-ops
        assert!(!game.tick(1));
        assert_eq!(game.phase(), GamePhase::Answer);
        assert!(game.proceed_to_answers().is_err());
        assert_eq!(game.phase(), GamePhase::Answer);
    }

    #[test]
    fn test_manual_proceed_stops_countdown() {
        let mut game = started(&["Alice", "Bob", "Cara"]);
        game.tick(1);
        game.proceed_to_answers().unwrap();
        assert_eq!(game.phase(), GamePhase::Ready);
        assert!(!game.tick(1));
        assert_eq!(game.phase(), GamePhase::Ready);
        game.begin_answer().unwrap();
        assert_eq!(game.phase(), GamePhase::Answer);
    }

    #[test]
    fn test_answers_alternate_ready_and_answer() {
        let mut game = started(&["Alice", "Bob", "Cara"]);
        game.assign_roles(2, 0).unwrap();
        game.proceed_to_answers().unwrap();

        game.begin_answer().unwrap();
        game.submit_answer("Pizza").unwrap();
        assert_eq!(game.phase(), GamePhase::Ready);
        game.begin_answer().unwrap();
        game.submit_answer("Soup").unwrap();
        game.begin_answer().unwrap();
        game.submit_answer("Pizza, definitely").unwrap();
        assert_eq!(game.phase(), GamePhase::Voting);

        let round = game.round().unwrap();
        assert_eq!(round.answers.len(), 3);
        assert_eq!(round.turns.current(), 0);
        assert_eq!(round.answers[2].impersonating.as_deref(), Some("Alice"));
        assert!(round.answers[2].is_imposter);
        assert_eq!(round.answers[0].impersonating, None);
        assert_eq!(round.ballot.len(), 3);
    }

    #[test]
    fn test_self_vote_rejected_without_state_change() {
        let mut game = started(&["Alice", "Bob", "Cara"]);
        game.tick_to_answer();
        for text in ["a", "b", "c"] {
            game.submit_answer(text).unwrap();
            if game.phase() == GamePhase::Ready {
                game.begin_answer().unwrap();
            }
        }
        let alice = game.players()[0].id;
        assert_eq!(game.submit_vote(alice), Err(GameError::SelfVote));
        assert!(game.round().unwrap().votes.is_empty());
    }

    #[test]
    fn test_suggestions_only_for_imposter() {
        let mut game = started(&["Alice", "Bob", "Cara"]);
        game.assign_roles(1, 2).unwrap();
        game.tick_to_answer();

        assert_eq!(game.request_suggestions(), Err(GameError::SuggestionsUnavailable));
        game.submit_answer("first").unwrap();
        game.begin_answer().unwrap();

        let effects = game.request_suggestions().unwrap();
        match effects.as_slice() {
            [Effect::Generate(TextRequest::Suggestions(request))] => {
                assert_eq!(request.target_name, "Cara");
                assert_eq!(request.answers_so_far, vec!["first".to_string()]);
            }
            other => panic!("unexpected effects {:?}", other),
        }
        // A second request is swallowed
        assert!(game.request_suggestions().unwrap().is_empty());

        game.deliver_suggestions(1, Ok(vec!["only one".to_string()]));
        assert_eq!(game.round().unwrap().suggestions, FallbackContent::suggestions());

        let role = game.snapshot().current_role.unwrap();
        assert!(role.is_imposter);
        assert_eq!(role.impersonating.as_deref(), Some("Cara"));
        assert_eq!(role.suggestions.len(), SUGGESTION_COUNT);
    }

    #[test]
    fn test_remove_player_only_in_setup() {
        let mut game = game_with_players(&["Alice", "Bob", "Cara", "Dan"]);
        let bob = game.players()[1].id;
        game.remove_player(bob).unwrap();
        let names: Vec<_> = game.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Cara", "Dan"]);

        game.start_game().unwrap();
        game.deliver_question(1, Ok("Q".to_string()));
        let alice = game.players()[0].id;
        assert!(matches!(
            game.remove_player(alice),
            Err(GameError::InvalidTransition { .. })
        ));
        assert_eq!(game.players().len(), 3);
    }

    #[test]
    fn test_roster_limit() {
        let mut game = Game::with_seed(1);
        for i in 0..MAX_PLAYERS {
            game.add_player(&format!("P{}", i)).unwrap();
        }
        assert_eq!(
            game.add_player("Extra"),
            Err(GameError::TooManyPlayers { max: 8 })
        );
    }

    #[test]
    fn test_side_states_round_trip() {
        let mut game = Game::with_seed(1);
        game.view_leaderboard().unwrap();
        assert_eq!(game.phase(), GamePhase::Leaderboard);
        assert!(game.view_history().is_err());
        game.back_to_setup().unwrap();
        game.view_history().unwrap();
        assert_eq!(game.phase(), GamePhase::History);
        assert!(game.start_game().is_err());
        game.back_to_setup().unwrap();
        assert_eq!(game.phase(), GamePhase::Setup);
    }

    impl Game {
        fn tick_to_answer(&mut self) {
            let round = self.current_round_number().unwrap();
            while self.tick(round) {}
        }
    }
}
