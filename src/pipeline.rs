//! Per-update message pipeline.
//!
//! Each incoming update runs the same linear sequence:
//!
//! ```text
//! receive -> [voice: download -> decode -> transcribe -> echo transcript]
//!         -> generate reply -> synthesize -> respond -> cleanup
//! ```
//!
//! Every failure below this boundary is caught here, logged with full
//! detail, and turned into a short apology message. Temp-file cleanup runs
//! on every path, success or failure.

use std::fmt;
use std::path::PathBuf;

use teloxide::types::{ChatId, FileId, User};
use tracing::{error, warn};

use crate::decode::{self, DecodeError};
use crate::generate::{GenerateError, ReplyGenerator};
use crate::synthesize::{Synthesis, Synthesizer, Voice};
use crate::telegram::TelegramClient;
use crate::tempfiles::TempFiles;
use crate::transcribe::{TranscribeError, TranscriptionClient};

pub const VOICE_APOLOGY: &str = "Sorry, I couldn't process your voice message.";
pub const TEXT_APOLOGY: &str = "Sorry, I couldn't process your message.";

/// Who sent the update.
pub struct Sender {
    pub id: u64,
    pub username: Option<String>,
}

impl Sender {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
        }
    }

    /// Key used for logging and provider-side usage attribution: the
    /// username, or the numeric id when no username is set.
    pub fn attribution_key(&self) -> String {
        match &self.username {
            Some(username) => username.clone(),
            None => self.id.to_string(),
        }
    }
}

#[derive(Debug)]
enum PipelineError {
    Download(String),
    Decode(DecodeError),
    Transcribe(TranscribeError),
    Generate(GenerateError),
    Audio(std::io::Error),
    Send(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download(e) => write!(f, "voice download failed: {e}"),
            Self::Decode(e) => write!(f, "audio decode failed: {e}"),
            Self::Transcribe(e) => write!(f, "transcription failed: {e}"),
            Self::Generate(e) => write!(f, "reply generation failed: {e}"),
            Self::Audio(e) => write!(f, "audio file error: {e}"),
            Self::Send(e) => write!(f, "telegram send failed: {e}"),
        }
    }
}

impl From<DecodeError> for PipelineError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<TranscribeError> for PipelineError {
    fn from(e: TranscribeError) -> Self {
        Self::Transcribe(e)
    }
}

impl From<GenerateError> for PipelineError {
    fn from(e: GenerateError) -> Self {
        Self::Generate(e)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::Audio(e)
    }
}

/// The reply form chosen after synthesis.
enum Reply {
    /// Voice reply persisted at this temp path.
    Voice(PathBuf),
    /// Plain-text fallback carrying the full generated reply.
    Text(String),
}

/// Decide the reply form and persist audio if synthesis produced any.
fn plan_reply(
    synthesis: Synthesis,
    reply_text: String,
    files: &mut TempFiles,
) -> std::io::Result<Reply> {
    match synthesis {
        Synthesis::Audio(audio) => {
            let path = files.create("mp3", &audio)?;
            Ok(Reply::Voice(path))
        }
        Synthesis::Unavailable => Ok(Reply::Text(reply_text)),
    }
}

fn acknowledgment(transcript: &str) -> String {
    format!("📝 You said: {transcript}")
}

pub struct MessagePipeline {
    telegram: TelegramClient,
    transcriber: TranscriptionClient,
    generator: ReplyGenerator,
    synthesizer: Synthesizer,
    voice: Voice,
}

impl MessagePipeline {
    pub fn new(
        telegram: TelegramClient,
        transcriber: TranscriptionClient,
        generator: ReplyGenerator,
        synthesizer: Synthesizer,
        voice: Voice,
    ) -> Self {
        Self {
            telegram,
            transcriber,
            generator,
            synthesizer,
            voice,
        }
    }

    /// Process one voice update. Never propagates internal failures.
    pub async fn process_voice(&self, chat_id: ChatId, sender: &Sender, file_id: FileId) {
        let mut files = TempFiles::new();

        if let Err(e) = self.run_voice(chat_id, sender, file_id, &mut files).await {
            error!(
                "Voice handling error for {}: {e}",
                sender.attribution_key()
            );
            if let Err(send_err) = self.telegram.send_message(chat_id, VOICE_APOLOGY).await {
                warn!("Failed to deliver apology: {send_err}");
            }
        }

        files.cleanup();
    }

    /// Process one text update. Never propagates internal failures.
    pub async fn process_text(&self, chat_id: ChatId, sender: &Sender, text: &str) {
        let mut files = TempFiles::new();

        if let Err(e) = self.run_text(chat_id, sender, text, &mut files).await {
            error!(
                "Text handling error for {}: {e}",
                sender.attribution_key()
            );
            if let Err(send_err) = self.telegram.send_message(chat_id, TEXT_APOLOGY).await {
                warn!("Failed to deliver apology: {send_err}");
            }
        }

        files.cleanup();
    }

    async fn run_voice(
        &self,
        chat_id: ChatId,
        sender: &Sender,
        file_id: FileId,
        files: &mut TempFiles,
    ) -> Result<(), PipelineError> {
        let compressed = self
            .telegram
            .download_voice(file_id)
            .await
            .map_err(PipelineError::Download)?;
        let ogg_path = files.create("ogg", &compressed)?;

        let wav_path = files.derive(&ogg_path, "wav");
        decode::transcode_to_wav(&ogg_path, &wav_path)?;

        let transcript = self.transcriber.transcribe(&wav_path).await?;
        self.telegram
            .send_message(chat_id, &acknowledgment(&transcript))
            .await
            .map_err(PipelineError::Send)?;

        let reply = self
            .generator
            .generate(&transcript, &sender.attribution_key())
            .await?;
        self.telegram
            .send_message(chat_id, "🔊 Let me reply in voice...")
            .await
            .map_err(PipelineError::Send)?;

        self.respond(chat_id, reply, files).await
    }

    async fn run_text(
        &self,
        chat_id: ChatId,
        sender: &Sender,
        text: &str,
        files: &mut TempFiles,
    ) -> Result<(), PipelineError> {
        let reply = self
            .generator
            .generate(text, &sender.attribution_key())
            .await?;
        self.respond(chat_id, reply, files).await
    }

    /// Synthesize the reply and send it as voice, or as text when
    /// synthesis is unavailable.
    async fn respond(
        &self,
        chat_id: ChatId,
        reply: String,
        files: &mut TempFiles,
    ) -> Result<(), PipelineError> {
        let synthesis = self.synthesizer.synthesize(&reply, self.voice).await;
        match plan_reply(synthesis, reply, files)? {
            Reply::Voice(path) => {
                // Read back from disk so the send always sees the fully
                // flushed file.
                let audio = std::fs::read(&path)?;
                self.telegram
                    .send_voice(chat_id, audio)
                    .await
                    .map_err(PipelineError::Send)?;
            }
            Reply::Text(text) => {
                self.telegram
                    .send_message(chat_id, &text)
                    .await
                    .map_err(PipelineError::Send)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_attribution_key_prefers_username() {
        let sender = Sender {
            id: 42,
            username: Some("alice".to_string()),
        };
        assert_eq!(sender.attribution_key(), "alice");
    }

    #[test]
    fn test_attribution_key_falls_back_to_numeric_id() {
        let sender = Sender {
            id: 987654321,
            username: None,
        };
        assert_eq!(sender.attribution_key(), "987654321");
    }

    #[test]
    fn test_acknowledgment_contains_transcript() {
        let message = acknowledgment("hello there");
        assert!(message.contains("hello there"));
    }

    #[test]
    fn test_plan_reply_with_audio_persists_temp_file() {
        let dir = tempdir().unwrap();
        let mut files = TempFiles::in_dir(dir.path());

        let reply = plan_reply(
            Synthesis::Audio(b"mp3 bytes".to_vec()),
            "spoken reply".to_string(),
            &mut files,
        )
        .unwrap();

        match reply {
            Reply::Voice(path) => {
                assert!(path.exists());
                assert_eq!(path.extension().unwrap(), "mp3");
                assert_eq!(std::fs::read(&path).unwrap(), b"mp3 bytes");
            }
            Reply::Text(_) => panic!("expected a voice reply"),
        }
        assert_eq!(files.tracked_paths().len(), 1);
    }

    #[test]
    fn test_plan_reply_without_audio_falls_back_to_text() {
        let dir = tempdir().unwrap();
        let mut files = TempFiles::in_dir(dir.path());

        let reply = plan_reply(
            Synthesis::Unavailable,
            "the generated reply".to_string(),
            &mut files,
        )
        .unwrap();

        match reply {
            Reply::Text(text) => assert_eq!(text, "the generated reply"),
            Reply::Voice(_) => panic!("expected a text fallback"),
        }
        // No audio path was assigned, so there is nothing to open or clean.
        assert!(files.tracked_paths().is_empty());
        assert_eq!(files.cleanup(), 0);
    }

    #[test]
    fn test_apologies_are_per_update_kind() {
        assert!(VOICE_APOLOGY.contains("voice message"));
        assert!(TEXT_APOLOGY.ends_with("your message."));
        assert_ne!(VOICE_APOLOGY, TEXT_APOLOGY);
    }
}
