//! Text-to-speech using the OpenAI speech API.
//!
//! Synthesis is a soft-fail boundary: any failure is logged here and
//! reported as [`Synthesis::Unavailable`] so the caller can fall back to a
//! text reply.

use tracing::{error, info, warn};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const SPEECH_MODEL: &str = "tts-1";

/// Voice timbre for synthesized replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    /// Parse a voice name, case-insensitively. Returns `None` for names
    /// outside the fixed set.
    pub fn parse(name: &str) -> Option<Voice> {
        match name.trim().to_ascii_lowercase().as_str() {
            "alloy" => Some(Voice::Alloy),
            "echo" => Some(Voice::Echo),
            "fable" => Some(Voice::Fable),
            "onyx" => Some(Voice::Onyx),
            "nova" => Some(Voice::Nova),
            "shimmer" => Some(Voice::Shimmer),
            _ => None,
        }
    }
}

/// Outcome of a synthesis attempt.
#[derive(Debug)]
pub enum Synthesis {
    /// MP3 audio bytes ready to be sent as a voice message.
    Audio(Vec<u8>),
    /// Synthesis failed; the reply should be sent as text instead.
    Unavailable,
}

/// TTS client for the OpenAI speech API.
pub struct Synthesizer {
    api_key: String,
    http: reqwest::Client,
}

impl Synthesizer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Generate speech from text.
    ///
    /// Returns MP3 audio on success. Failure detail goes to the log only.
    pub async fn synthesize(&self, text: &str, voice: Voice) -> Synthesis {
        let preview: String = text.chars().take(50).collect();
        info!("TTS ({}): \"{preview}\"", voice.as_str());

        let response = match self
            .http
            .post(SPEECH_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": SPEECH_MODEL,
                "input": text,
                "voice": voice.as_str(),
            }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("TTS request failed: {e}");
                return Synthesis::Unavailable;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("TTS API error {status}: {body}");
            return Synthesis::Unavailable;
        }

        match response.bytes().await {
            Ok(audio) => {
                info!("Generated {} bytes of voice audio", audio.len());
                Synthesis::Audio(audio.to_vec())
            }
            Err(e) => {
                warn!("Failed to read TTS response: {e}");
                Synthesis::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_voices() {
        assert_eq!(Voice::parse("alloy"), Some(Voice::Alloy));
        assert_eq!(Voice::parse("echo"), Some(Voice::Echo));
        assert_eq!(Voice::parse("fable"), Some(Voice::Fable));
        assert_eq!(Voice::parse("onyx"), Some(Voice::Onyx));
        assert_eq!(Voice::parse("nova"), Some(Voice::Nova));
        assert_eq!(Voice::parse("shimmer"), Some(Voice::Shimmer));
    }

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(Voice::parse("Nova"), Some(Voice::Nova));
        assert_eq!(Voice::parse(" SHIMMER "), Some(Voice::Shimmer));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(Voice::parse(""), None);
        assert_eq!(Voice::parse("robotic"), None);
        assert_eq!(Voice::parse("nova2"), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for voice in [
            Voice::Alloy,
            Voice::Echo,
            Voice::Fable,
            Voice::Onyx,
            Voice::Nova,
            Voice::Shimmer,
        ] {
            assert_eq!(Voice::parse(voice.as_str()), Some(voice));
        }
    }
}
