pub mod game;
pub mod messages;
pub mod player;
pub mod history;
pub mod errors;

use uuid::Uuid;

pub type PlayerId = Uuid;

// Re-export all types
pub use game::*;
pub use messages::*;
pub use player::*;
pub use history::*;
pub use errors::*;
