use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::text_generation::{TextGenError, TextGenerator, parse_suggestions};
use game_core::{Effect, Game, GameEvent, GameEventHandler, HistoryAggregator, TextRequest};
use game_persistence::HistoryRepository;
use game_types::{GameAction, GameError, GameRecord, GameSnapshot, HistorySummary, PlayerProfile};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Game manager is not running")]
    Unavailable,
}

enum GameCommand {
    Apply {
        action: GameAction,
        reply: oneshot::Sender<Result<GameSnapshot, GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    History {
        reply: oneshot::Sender<HistorySummary>,
    },
    Leaderboard {
        reply: oneshot::Sender<Vec<PlayerProfile>>,
    },
    TextReady {
        request: TextRequest,
        result: Result<String, TextGenError>,
    },
    Tick {
        round: u32,
        reply: oneshot::Sender<bool>,
    },
}

/// Logs game events as they are published.
pub struct TracingEventHandler;

impl GameEventHandler for TracingEventHandler {
    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PlayerAdded { player } => info!("Player {} joined", player.name),
            GameEvent::PlayerRemoved { player_id } => info!("Player {} removed", player_id),
            GameEvent::RoundStarted {
                round,
                player_count,
            } => info!("Round {} started with {} players", round, player_count),
            GameEvent::QuestionRevealed {
                round,
                used_fallback,
            } => info!(
                "Question revealed for round {} (fallback: {})",
                round, used_fallback
            ),
            GameEvent::AnswerSubmitted { round, player_id } => {
                debug!("Round {}: answer from {}", round, player_id)
            }
            GameEvent::VoteCast { round, voter_id } => {
                debug!("Round {}: vote from {}", round, voter_id)
            }
            GameEvent::RoundScored {
                round,
                outcome,
                changes,
            } => info!(
                "Round {} scored: {:?}, {} score changes",
                round,
                outcome,
                changes.len()
            ),
            GameEvent::GameCompleted { record } => info!(
                "Game completed after {} rounds, winner {} with {}",
                record.rounds, record.winner.name, record.winner.score
            ),
            GameEvent::GameReset => info!("Game reset"),
        }
    }
}

/// Handle to the task that owns the game.
///
/// Every mutation goes through one channel, so actions, countdown ticks and
/// text-service results are applied one at a time in arrival order.
#[derive(Clone)]
pub struct GameManager {
    sender: mpsc::Sender<GameCommand>,
}

impl GameManager {
    /// Load stored history into `game` and spawn the owning task.
    pub async fn start(
        mut game: Game,
        generator: Arc<dyn TextGenerator>,
        history: HistoryRepository,
        tick_interval: Duration,
    ) -> Self {
        match history.load().await {
            Ok(records) => {
                info!("Loaded {} games from history", records.len());
                game.load_history(records);
            }
            Err(e) => warn!("Failed to load game history, starting empty: {:?}", e),
        }
        game.event_bus.add_handler(Box::new(TracingEventHandler));

        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let actor = GameActor {
            game,
            generator,
            history,
            tick_interval,
            commands: sender.downgrade(),
        };
        tokio::spawn(actor.run(receiver));

        Self { sender }
    }

    pub async fn apply(&self, action: GameAction) -> Result<GameSnapshot, ManagerError> {
        let result = self
            .request(|reply| GameCommand::Apply { action, reply })
            .await?;
        Ok(result?)
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, ManagerError> {
        self.request(|reply| GameCommand::Snapshot { reply }).await
    }

    pub async fn history(&self) -> Result<HistorySummary, ManagerError> {
        self.request(|reply| GameCommand::History { reply }).await
    }

    pub async fn leaderboard(&self) -> Result<Vec<PlayerProfile>, ManagerError> {
        self.request(|reply| GameCommand::Leaderboard { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> GameCommand,
    ) -> Result<T, ManagerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| ManagerError::Unavailable)?;
        response.await.map_err(|_| ManagerError::Unavailable)
    }
}

struct GameActor {
    game: Game,
    generator: Arc<dyn TextGenerator>,
    history: HistoryRepository,
    tick_interval: Duration,
    commands: mpsc::WeakSender<GameCommand>,
}

impl GameActor {
    async fn run(mut self, mut receiver: mpsc::Receiver<GameCommand>) {
        while let Some(command) = receiver.recv().await {
            self.handle(command).await;
        }
        info!("Game manager stopped");
    }

    async fn handle(&mut self, command: GameCommand) {
        match command {
            GameCommand::Apply { action, reply } => {
                let name = action.name();
                let response = match self.game.apply(action) {
                    Ok(effects) => {
                        self.run_effects(effects).await;
                        Ok(self.game.snapshot())
                    }
                    Err(e) => {
                        debug!("Rejected attempt to {}: {}", name, e);
                        Err(e)
                    }
                };
                let _ = reply.send(response);
            }
            GameCommand::Snapshot { reply } => {
                let _ = reply.send(self.game.snapshot());
            }
            GameCommand::History { reply } => {
                let _ = reply.send(HistoryAggregator::summary(self.game.history()));
            }
            GameCommand::Leaderboard { reply } => {
                let _ = reply.send(HistoryAggregator::profiles(self.game.history()));
            }
            GameCommand::TextReady { request, result } => match request {
                TextRequest::Question(r) => {
                    let effects = self.game.deliver_question(r.round, result.map_err(Into::into));
                    self.run_effects(effects).await;
                }
                TextRequest::Analysis(r) => {
                    self.game.deliver_analysis(r.round, result.map_err(Into::into));
                }
                TextRequest::Suggestions(r) => {
                    let parsed = result.and_then(|raw| parse_suggestions(&raw));
                    self.game.deliver_suggestions(r.round, parsed.map_err(Into::into));
                }
            },
            GameCommand::Tick { round, reply } => {
                let _ = reply.send(self.game.tick(round));
            }
        }
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Generate(request) => self.spawn_generation(request),
                Effect::StartCountdown { round, seconds } => self.spawn_countdown(round, seconds),
                Effect::PersistHistory(records) => persist(&self.history, &records).await,
            }
        }
    }

    fn spawn_generation(&self, request: TextRequest) {
        let generator = self.generator.clone();
        let commands = self.commands.clone();

        tokio::spawn(async move {
            let result = generator.generate(&request).await;
            if let Err(e) = &result {
                debug!("Text generation for {:?} failed: {}", request.purpose(), e);
            }
            if let Some(sender) = commands.upgrade() {
                let _ = sender.send(GameCommand::TextReady { request, result }).await;
            }
        });
    }

    fn spawn_countdown(&self, round: u32, seconds: u32) {
        let commands = self.commands.clone();
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately.
            interval.tick().await;

            for _ in 0..seconds {
                interval.tick().await;

                let Some(sender) = commands.upgrade() else {
                    return;
                };
                let (reply, keep_going) = oneshot::channel();
                if sender.send(GameCommand::Tick { round, reply }).await.is_err() {
                    return;
                }
                drop(sender);

                if !keep_going.await.unwrap_or(false) {
                    return;
                }
            }
        });
    }
}

async fn persist(history: &HistoryRepository, records: &[GameRecord]) {
    if let Err(e) = history.save(records).await {
        warn!("Failed to persist game history: {:?}", e);
    }
}
