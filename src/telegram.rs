//! Telegram client using teloxide.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, ParseMode};
use tracing::{info, warn};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), String> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send message: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Send a message rendered with Telegram's Markdown markup.
    pub async fn send_markdown(&self, chat_id: ChatId, text: &str) -> Result<(), String> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Markdown)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send message: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Download a voice file's raw bytes by file id.
    pub async fn download_voice(&self, file_id: FileId) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("Downloaded voice message ({} bytes)", data.len());
        Ok(data)
    }

    /// Send a voice reply from audio bytes.
    pub async fn send_voice(&self, chat_id: ChatId, voice_data: Vec<u8>) -> Result<(), String> {
        info!("Sending voice reply ({} bytes)", voice_data.len());

        let input_file = InputFile::memory(voice_data).file_name("reply.mp3");
        self.bot
            .send_voice(chat_id, input_file)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send voice: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
