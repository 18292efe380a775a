use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use game_core::{
    AnalysisRequest, QuestionRequest, SUGGESTION_COUNT, SuggestionsRequest, TextFailure,
    TextRequest,
};
use game_types::{Difficulty, RoundOutcome};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("code fence pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    #[error("Text generation is disabled")]
    Disabled,
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Service returned status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<TextGenError> for TextFailure {
    fn from(err: TextGenError) -> Self {
        match err {
            TextGenError::Malformed(detail) => TextFailure::Malformed(detail),
            other => TextFailure::Unavailable(other.to_string()),
        }
    }
}

/// The text-generation collaborator: one prompt in, free-form text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenError>;
}

/// Used when no API key is configured; every request falls back.
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _request: &TextRequest) -> Result<String, TextGenError> {
        Err(TextGenError::Disabled)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Messages-API client.
pub struct AnthropicClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, TextGenError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextGenError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: max_tokens(request),
            messages: vec![Message {
                role: "user",
                content: build_prompt(request),
            }],
        };

        tracing::debug!(
            "Requesting {:?} text for round {}",
            request.purpose(),
            request.round()
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Text generation request failed: {:?}", e);
                TextGenError::Request(e.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!("Text generation returned status: {}", response.status());
            return Err(TextGenError::Status(response.status().as_u16()));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::Malformed(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TextGenError::Malformed("no text content".to_string()))
    }
}

fn max_tokens(request: &TextRequest) -> u32 {
    match request {
        TextRequest::Analysis(_) => 500,
        _ => 1000,
    }
}

pub fn build_prompt(request: &TextRequest) -> String {
    match request {
        TextRequest::Question(r) => question_prompt(r),
        TextRequest::Analysis(r) => analysis_prompt(r),
        TextRequest::Suggestions(r) => suggestions_prompt(r),
    }
}

fn question_prompt(request: &QuestionRequest) -> String {
    let (kind, rules, examples) = match request.difficulty {
        Difficulty::Easy => (
            "simple, fun",
            "- Very easy to answer (basic preferences, common experiences)\n\
             - Not too specific or nuanced\n\
             - Something everyone can relate to\n\
             - Answers will naturally be similar, making it harder to spot the imposter",
            "\"What's your favorite color?\", \"Do you prefer coffee or tea?\", \"What's your favorite season?\"",
        ),
        Difficulty::Medium => (
            "interesting",
            "- Personal enough that answers vary between people\n\
             - Not too private or uncomfortable\n\
             - Easy to answer in 1-2 sentences\n\
             - Something people might know about coworkers or friends",
            "\"What's your favorite way to spend a weekend?\", \"What's the last thing you learned?\", \"What's your comfort food?\"",
        ),
        Difficulty::Hard => (
            "challenging, specific",
            "- Very specific and detailed (requiring genuine personal knowledge)\n\
             - Create clear differences between people's answers\n\
             - Be about unique experiences or specific preferences\n\
             - Make it difficult for the imposter to guess correctly",
            "\"What's a specific childhood memory that still makes you smile?\", \"What's the strangest food combination you genuinely enjoy?\"",
        ),
    };

    format!(
        "Generate 1 {} personal question for an imposter game with {} players. The question should be:\n\
         {}\n\n\
         Examples: {}\n\n\
         Return ONLY the question, nothing else.",
        kind, request.player_count, rules, examples
    )
}

fn analysis_prompt(request: &AnalysisRequest) -> String {
    let others = request
        .other_answers
        .iter()
        .map(|(name, text)| format!("{}: \"{}\"", name, text))
        .collect::<Vec<_>>()
        .join("\n");
    let (result, verb) = match request.outcome {
        RoundOutcome::ImposterCaught => ("Imposter was CAUGHT", "caught"),
        RoundOutcome::ImposterSurvived => ("Imposter SURVIVED", "able to blend in"),
    };

    format!(
        "Analyze this imposter game round in 2-3 sentences:\n\n\
         Question: \"{}\"\n\
         Imposter: {} (trying to impersonate {})\n\
         Imposter's answer: \"{}\"\n\n\
         Other players' answers:\n{}\n\n\
         Result: {}\n\n\
         Explain why the imposter was {}. Be specific about what gave them away or what helped them succeed.",
        request.question,
        request.imposter_name,
        request.target_name,
        request.imposter_answer,
        others,
        result,
        verb
    )
}

fn suggestions_prompt(request: &SuggestionsRequest) -> String {
    let context = if request.answers_so_far.is_empty() {
        "You are the first to answer.".to_string()
    } else {
        let quoted: Vec<String> = request
            .answers_so_far
            .iter()
            .map(|a| format!("\"{}\"", a))
            .collect();
        format!("Other answers so far: {}", quoted.join(", "))
    };

    format!(
        "You're helping someone in an imposter game. They need to answer a question while pretending to be someone else.\n\n\
         Question: \"{}\"\n\
         Target to impersonate: {}\n\
         {}\n\n\
         Generate exactly {} believable, natural answer suggestions (each 1-2 sentences) that:\n\
         1. Sound authentic and conversational (not generic)\n\
         2. Match the style of a casual game response\n\
         3. Are different from each other\n\
         4. Would help them blend in\n\n\
         Return ONLY as a JSON array with no other text: [\"answer 1\", \"answer 2\", \"answer 3\"]",
        request.question, request.target_name, context, SUGGESTION_COUNT
    )
}

/// Parse a suggestions reply: a JSON array of strings, possibly wrapped in a
/// Markdown code fence.
pub fn parse_suggestions(raw: &str) -> Result<Vec<String>, TextGenError> {
    let cleaned = CODE_FENCE.replace_all(raw, "");

    let suggestions: Vec<String> = serde_json::from_str(cleaned.trim())
        .map_err(|e| TextGenError::Malformed(e.to_string()))?;

    if suggestions.len() != SUGGESTION_COUNT {
        return Err(TextGenError::Malformed(format!(
            "expected {} suggestions, got {}",
            SUGGESTION_COUNT,
            suggestions.len()
        )));
    }

    Ok(suggestions)
}
