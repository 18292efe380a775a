#![allow(dead_code)]

use game_core::{Effect, Game, GameEvent, GameEventHandler, TextRequest};
use game_types::{GamePhase, Player, PlayerId};
use std::sync::{Arc, Mutex};

/// Creates a seeded game with the given players already added
pub fn create_game_with_players(names: &[&str]) -> Game {
    let mut game = Game::with_seed(1234);
    for name in names {
        game.add_player(name).unwrap();
    }
    game
}

/// Creates the standard three-player table
pub fn create_standard_game() -> Game {
    create_game_with_players(&["P1", "P2", "P3"])
}

/// Starts the game and answers its question request
pub fn start_round_one(game: &mut Game) -> Vec<Effect> {
    let effects = game.start_game().unwrap();
    assert_question_requested(&effects, 1);
    game.deliver_question(1, Ok("What's your comfort food?".to_string()))
}

pub fn assert_question_requested(effects: &[Effect], round: u32) {
    assert!(
        effects.iter().any(|e| matches!(
            e,
            Effect::Generate(TextRequest::Question(request)) if request.round == round
        )),
        "Expected a question request for round {}, got {:?}",
        round,
        effects
    );
}

/// Runs the countdown out, landing in ANSWER
pub fn run_countdown(game: &mut Game) {
    let round = game.round().unwrap().number;
    while game.tick(round) {}
    assert_eq!(game.phase(), GamePhase::Answer);
}

/// Everyone answers in turn order, ending in VOTING
pub fn answer_all(game: &mut Game) {
    let count = game.players().len();
    for i in 0..count {
        if game.phase() == GamePhase::Ready {
            game.begin_answer().unwrap();
        }
        game.submit_answer(&format!("answer {}", i)).unwrap();
    }
    assert_eq!(game.phase(), GamePhase::Voting);
}

/// Casts votes by player name: `(voter, suspect)` in turn order
pub fn vote_by_name(game: &mut Game, suspects: &[&str]) -> Vec<Effect> {
    let mut effects = Vec::new();
    for suspect in suspects {
        let id = player_id(game, suspect);
        effects = game.submit_vote(id).unwrap();
    }
    effects
}

pub fn player_id(game: &Game, name: &str) -> PlayerId {
    get_player_by_name(game, name)
        .map(|p| p.id)
        .unwrap_or_else(|| panic!("No player named {}", name))
}

pub fn get_player_by_name<'a>(game: &'a Game, name: &str) -> Option<&'a Player> {
    game.players().iter().find(|p| p.name == name)
}

pub fn score_of(game: &Game, name: &str) -> u32 {
    get_player_by_name(game, name).map(|p| p.score).unwrap_or(0)
}

/// Plays a full round where every player votes for their right-hand neighbour
pub fn play_round(game: &mut Game) {
    let round = game.round().unwrap().number;
    if game.phase() != GamePhase::Question {
        panic!("Round {} not in QUESTION: {:?}", round, game.phase());
    }
    run_countdown(game);
    answer_all(game);

    let ids: Vec<PlayerId> = game.players().iter().map(|p| p.id).collect();
    for i in 0..ids.len() {
        game.submit_vote(ids[(i + 1) % ids.len()]).unwrap();
    }
    assert_eq!(game.phase(), GamePhase::Results);
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl GameEventHandler for EventCollector {
    fn handle_event(&mut self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}
