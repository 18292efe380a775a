use game_types::{GameError, Player};

pub const MAX_NAME_LENGTH: usize = 20;
pub const MAX_ANSWER_LENGTH: usize = 200;

pub struct InputValidator;

impl InputValidator {
    /// Trim and check a new player's name against the current roster.
    pub fn player_name(name: &str, existing: &[Player]) -> Result<String, GameError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(GameError::InvalidPlayerName {
                reason: "name cannot be empty".to_string(),
            });
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(GameError::InvalidPlayerName {
                reason: format!("name must be at most {} characters", MAX_NAME_LENGTH),
            });
        }

        // Profiles are keyed by name, so names must stay distinguishable
        if existing.iter().any(|p| p.name.to_lowercase() == name.to_lowercase()) {
            return Err(GameError::DuplicatePlayerName {
                name: name.to_string(),
            });
        }

        Ok(name.to_string())
    }

    pub fn answer(text: &str) -> Result<String, GameError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(GameError::InvalidAnswer {
                reason: "answer cannot be empty".to_string(),
            });
        }

        if text.chars().count() > MAX_ANSWER_LENGTH {
            return Err(GameError::InvalidAnswer {
                reason: format!("answer must be at most {} characters", MAX_ANSWER_LENGTH),
            });
        }

        Ok(text.to_string())
    }
}
