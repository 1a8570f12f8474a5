use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use svarupa::config::Config;
use svarupa::generate::ReplyGenerator;
use svarupa::pipeline::{MessagePipeline, Sender};
use svarupa::synthesize::Synthesizer;
use svarupa::telegram::TelegramClient;
use svarupa::transcribe::TranscriptionClient;

const LOG_FILE: &str = "svarupa.log";

const WELCOME: &str = "🗣️ *Welcome to Svarupa!*\n\n\
    Send me a *voice message* and I will reply in a natural AI voice.\n\
    You can also send text if you prefer.\n\n\
    Commands:\n\
    /start or /help — Show this help message.";

struct BotState {
    telegram: TelegramClient,
    pipeline: MessagePipeline,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _guard = init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}. Check your .env or deployment variables.");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.bot_token);
    let telegram = TelegramClient::new(bot.clone());
    let pipeline = MessagePipeline::new(
        TelegramClient::new(bot.clone()),
        TranscriptionClient::new(config.openai_api_key.clone()),
        ReplyGenerator::new(config.openai_api_key.clone()),
        Synthesizer::new(config.openai_api_key.clone()),
        config.voice,
    );
    let state = Arc::new(BotState { telegram, pipeline });

    info!("Starting Svarupa bot (voice: {})...", config.voice.as_str());

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Log to stdout and to an append-mode file, both at INFO by default.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .expect("Failed to open log file");
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    guard
}

fn is_command(text: &str) -> bool {
    let text = text.trim();
    text.starts_with("/start") || text.starts_with("/help")
}

/// Route one update by type: command, voice message, or text message.
async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(sender) = msg.from.as_ref().map(Sender::from_user) else {
        return Ok(());
    };

    if let Some(text) = msg.text()
        && is_command(text)
    {
        info!("User {} started the bot", sender.attribution_key());
        if let Err(e) = state.telegram.send_markdown(msg.chat.id, WELCOME).await {
            warn!("Failed to send welcome: {e}");
        }
        return Ok(());
    }

    if let Some(voice) = msg.voice() {
        info!("User {} sent a voice message", sender.attribution_key());
        state
            .pipeline
            .process_voice(msg.chat.id, &sender, voice.file.id.clone())
            .await;
        return Ok(());
    }

    if let Some(text) = msg.text() {
        info!("User {} sent a text message", sender.attribution_key());
        state.pipeline.process_text(msg.chat.id, &sender, text).await;
    }

    Ok(())
}
