//! Reply generation using the OpenAI chat completions API.
//!
//! Every request carries the fixed Svarupa persona as the system message;
//! replies are non-deterministic across identical inputs (temperature 0.8).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const GENERATION_MODEL: &str = "gpt-4";
const MAX_REPLY_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.8;

const PERSONA_PROMPT: &str = "You are Svarupa, an Indian spiritual guide. Use compassionate, poetic, yet grounded responses. \
     No jargon. Respond as if inspired by Osho and Sadhguru. Always reflect empathy, and adapt your tone to the user's emotional state if it is apparent.";

#[derive(Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatRequestMessage>,
    user: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Debug)]
pub enum GenerateError {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api(e) => write!(f, "API error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Client for the remote text-generation endpoint.
pub struct ReplyGenerator {
    api_key: String,
    http: reqwest::Client,
}

impl ReplyGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Generate a persona-toned reply to `prompt`.
    ///
    /// `user` is the attribution key forwarded to the provider for usage
    /// tracking; it is not stored anywhere here.
    pub async fn generate(&self, prompt: &str, user: &str) -> Result<String, GenerateError> {
        debug!("Generating reply for user {user}");

        let request = ChatRequest {
            model: GENERATION_MODEL,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: PERSONA_PROMPT.to_string(),
                },
                ChatRequestMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            user: user.to_string(),
            max_tokens: MAX_REPLY_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api(format!("{status}: {body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Parse(e.to_string()))?;

        chat.choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(GenerateError::Empty)
    }
}
