//! Speech-to-text using the OpenAI transcription API.

use std::fmt;
use std::path::Path;

use tracing::info;

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Debug)]
pub enum TranscribeError {
    /// Failed to read the decoded audio file.
    Io(std::io::Error),
    /// The request could not be built or sent.
    Http(String),
    /// The endpoint answered with a non-success status.
    Api(String),
}

impl fmt::Display for TranscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read audio file: {e}"),
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api(e) => write!(f, "API error: {e}"),
        }
    }
}

impl std::error::Error for TranscribeError {}

/// Client for the remote transcription endpoint.
pub struct TranscriptionClient {
    api_key: String,
    http: reqwest::Client,
}

impl TranscriptionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Transcribe a 16 kHz mono PCM WAV file.
    ///
    /// Returns the recognized text with surrounding whitespace stripped.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(TranscribeError::Io)?;
        info!("Transcribing {} bytes of audio", audio.len());

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscribeError::Http(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .text("response_format", "text")
            .part("file", part);

        let response = self
            .http
            .post(TRANSCRIPTION_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscribeError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Api(format!("{status}: {body}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| TranscribeError::Http(e.to_string()))?;
        let text = text.trim().to_string();
        info!("Transcribed: \"{}\"", preview(&text, 100));
        Ok(text)
    }
}

fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("hello world", 5), "hello...");
    }
}
