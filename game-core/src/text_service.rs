//! Contract with the text-generation collaborator.
//!
//! The core never calls the service itself. Transitions that need text emit
//! a [`TextRequest`] inside an [`Effect`]; the owner runs it and hands the
//! outcome back through `Game::deliver_*`, falling back to [`FallbackContent`]
//! on any failure.

use game_types::{Difficulty, GameRecord, RoundOutcome};
use serde::{Deserialize, Serialize};

use crate::RngSelector;

pub const SUGGESTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPurpose {
    Question,
    Analysis,
    Suggestions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub round: u32,
    pub difficulty: Difficulty,
    pub player_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub round: u32,
    pub question: String,
    pub imposter_name: String,
    pub target_name: String,
    pub imposter_answer: String,
    /// (player name, answer) for every honest player.
    pub other_answers: Vec<(String, String)>,
    pub outcome: RoundOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionsRequest {
    pub round: u32,
    pub question: String,
    pub target_name: String,
    pub answers_so_far: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRequest {
    Question(QuestionRequest),
    Analysis(AnalysisRequest),
    Suggestions(SuggestionsRequest),
}

impl TextRequest {
    pub fn purpose(&self) -> TextPurpose {
        match self {
            TextRequest::Question(_) => TextPurpose::Question,
            TextRequest::Analysis(_) => TextPurpose::Analysis,
            TextRequest::Suggestions(_) => TextPurpose::Suggestions,
        }
    }

    pub fn round(&self) -> u32 {
        match self {
            TextRequest::Question(r) => r.round,
            TextRequest::Analysis(r) => r.round,
            TextRequest::Suggestions(r) => r.round,
        }
    }
}

/// Work the owner of a [`crate::Game`] must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate(TextRequest),
    StartCountdown { round: u32, seconds: u32 },
    PersistHistory(Vec<GameRecord>),
}

/// Why a text response could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFailure {
    Unavailable(String),
    Malformed(String),
}

pub type TextResult<T> = Result<T, TextFailure>;

const EASY_QUESTIONS: [&str; 5] = [
    "What's your favorite color?",
    "Do you prefer coffee or tea?",
    "What's your favorite season?",
    "Are you a morning person or night owl?",
    "Do you prefer cats or dogs?",
];

const MEDIUM_QUESTIONS: [&str; 5] = [
    "What's your favorite way to spend a weekend?",
    "What's the last thing you learned?",
    "What's your comfort food?",
    "What's your dream vacation destination?",
    "What's a skill you want to learn?",
];

const HARD_QUESTIONS: [&str; 5] = [
    "What's a specific childhood memory that shaped who you are?",
    "What's the most unusual place you've ever fallen asleep?",
    "What's a small daily ritual you can't function without?",
    "What's the strangest food combination you genuinely enjoy?",
    "What's a belief you held strongly but completely changed your mind about?",
];

const CAUGHT_ANALYSIS: &str =
    "The players successfully identified the imposter through careful observation of the answers!";
const SURVIVED_ANALYSIS: &str = "The imposter blended in well with the other players' responses!";

const FALLBACK_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "I think it depends on the situation really.",
    "Something fun and relaxing, nothing too crazy.",
    "Whatever feels right in the moment, you know?",
];

/// Static content used whenever the service fails.
pub struct FallbackContent;

impl FallbackContent {
    pub fn questions(difficulty: Difficulty) -> &'static [&'static str] {
        match difficulty {
            Difficulty::Easy => &EASY_QUESTIONS,
            Difficulty::Medium => &MEDIUM_QUESTIONS,
            Difficulty::Hard => &HARD_QUESTIONS,
        }
    }

    pub fn question(difficulty: Difficulty, rng: &mut RngSelector) -> String {
        let questions = Self::questions(difficulty);
        rng.choose(questions)
            .copied()
            .unwrap_or(questions[0])
            .to_string()
    }

    pub fn analysis(outcome: RoundOutcome) -> String {
        match outcome {
            RoundOutcome::ImposterCaught => CAUGHT_ANALYSIS.to_string(),
            RoundOutcome::ImposterSurvived => SURVIVED_ANALYSIS.to_string(),
        }
    }

    pub fn suggestions() -> Vec<String> {
        FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_question_matches_difficulty() {
        let mut rng = RngSelector::new(3);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let question = FallbackContent::question(difficulty, &mut rng);
            assert!(FallbackContent::questions(difficulty).contains(&question.as_str()));
        }
    }

    #[test]
    fn test_fallback_suggestions_has_three_entries() {
        assert_eq!(FallbackContent::suggestions().len(), SUGGESTION_COUNT);
    }

    #[test]
    fn test_request_metadata() {
        let request = TextRequest::Question(QuestionRequest {
            round: 4,
            difficulty: Difficulty::Hard,
            player_count: 5,
        });
        assert_eq!(request.purpose(), TextPurpose::Question);
        assert_eq!(request.round(), 4);
    }
}
