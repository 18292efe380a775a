use game_types::{GameRecord, Player, PlayerId, RoundOutcome, ScoreChange};

#[derive(Debug, Clone)]
pub enum GameEvent {
    PlayerAdded {
        player: Player,
    },
    PlayerRemoved {
        player_id: PlayerId,
    },
    RoundStarted {
        round: u32,
        player_count: usize,
    },
    QuestionRevealed {
        round: u32,
        used_fallback: bool,
    },
    AnswerSubmitted {
        round: u32,
        player_id: PlayerId,
    },
    VoteCast {
        round: u32,
        voter_id: PlayerId,
    },
    RoundScored {
        round: u32,
        outcome: RoundOutcome,
        changes: Vec<ScoreChange>,
    },
    GameCompleted {
        record: GameRecord,
    },
    GameReset,
}

/// Event handler trait for processing game events
pub trait GameEventHandler: Send {
    fn handle_event(&mut self, event: GameEvent);
}

/// Simple event bus for distributing game events
pub struct GameEventBus {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
