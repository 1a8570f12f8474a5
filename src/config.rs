//! Environment-backed configuration, built once at startup.

use std::fmt;

use crate::synthesize::Voice;

const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
const VOICE_NAME_VAR: &str = "VOICE_NAME";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    MissingVar(&'static str),
    /// The configured voice name is not one of the known voices.
    InvalidVoice(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => {
                write!(f, "required environment variable {name} is not set")
            }
            Self::InvalidVoice(name) => {
                write!(
                    f,
                    "unknown voice '{name}' (expected one of: alloy, echo, fable, onyx, nova, shimmer)"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub bot_token: String,
    pub openai_api_key: String,
    /// Voice timbre used for synthesized replies.
    pub voice: Voice,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup(BOT_TOKEN_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(BOT_TOKEN_VAR))?;
        let openai_api_key = lookup(OPENAI_API_KEY_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(OPENAI_API_KEY_VAR))?;

        let voice = match lookup(VOICE_NAME_VAR).filter(|v| !v.is_empty()) {
            Some(name) => Voice::parse(&name).ok_or(ConfigError::InvalidVoice(name))?,
            None => Voice::Nova,
        };

        Ok(Self {
            bot_token,
            openai_api_key,
            voice,
        })
    }
}
