pub mod game_state;
pub mod scoring;
pub mod vote_tally;
pub mod turn_sequencer;
pub mod rng;
pub mod history;
pub mod input_validation;
pub mod text_service;
pub mod game_events;

// Re-export main components
pub use game_state::*;
pub use scoring::*;
pub use vote_tally::*;
pub use turn_sequencer::*;
pub use rng::*;
pub use history::*;
pub use input_validation::*;
pub use text_service::*;
pub use game_events::*;
