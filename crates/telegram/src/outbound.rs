//! Replies to the originating chat.
//!
//! [`ReplyDispatcher::dispatch`] hands each reply to its own detached tokio
//! task that nothing joins, so two dispatched replies may arrive in either
//! order. A failed reply is logged and dropped. [`ReplyDispatcher::send`] is
//! the awaited variant, used only when the caller must know the attempt is
//! over (a file attachment that is deleted right afterwards).

use std::{path::PathBuf, sync::Arc};

use {
    async_trait::async_trait,
    teloxide::{
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
    },
    tracing::{debug, warn},
};

use crate::error::Result;

pub const WELCOME_TEXT: &str = "Welcome to the Video Converter bot! Please upload a video file. \
                                This bot uses ffmpeg to convert videos.";

const WELCOME_LINKS: &[(&str, &str)] = &[
    ("FFmpeg", "https://ffmpeg.org/"),
    ("Donate to ffmpeg", "https://ffmpeg.org/donations.html"),
];

/// What to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMessage {
    Text(String),
    /// The `/start` greeting with its link buttons.
    Welcome,
    /// A converted clip. The file stays owned by the job that produced it.
    Clip(PathBuf),
}

impl ReplyMessage {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Welcome => "welcome",
            Self::Clip(_) => "clip",
        }
    }
}

/// Delivers one reply to a chat.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, chat_id: ChatId, message: &ReplyMessage) -> Result<()>;
}

/// Cheap to clone; every clone shares the same sink.
#[derive(Clone)]
pub struct ReplyDispatcher {
    sink: Arc<dyn ReplySink>,
}

impl ReplyDispatcher {
    #[must_use]
    pub fn new(sink: Arc<dyn ReplySink>) -> Self {
        Self { sink }
    }

    /// Fire and forget.
    pub fn dispatch(&self, chat_id: ChatId, message: ReplyMessage) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.send(chat_id, &message).await {
                warn!(
                    chat_id = chat_id.0,
                    kind = message.label(),
                    error = %e,
                    "failed to send reply"
                );
            }
        });
    }

    /// Send and wait for the attempt to finish.
    pub async fn send(&self, chat_id: ChatId, message: &ReplyMessage) -> Result<()> {
        self.sink.send(chat_id, message).await
    }
}

/// [`ReplySink`] that talks to the Bot API.
pub struct TelegramReplies {
    bot: Bot,
}

impl TelegramReplies {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySink for TelegramReplies {
    async fn send(&self, chat_id: ChatId, message: &ReplyMessage) -> Result<()> {
        match message {
            ReplyMessage::Text(text) => {
                self.bot.send_message(chat_id, text).await?;
            },
            ReplyMessage::Welcome => {
                self.bot
                    .send_message(chat_id, WELCOME_TEXT)
                    .reply_markup(welcome_keyboard())
                    .await?;
            },
            ReplyMessage::Clip(path) => {
                self.bot
                    .send_video(chat_id, InputFile::file(path.clone()))
                    .await?;
            },
        }
        debug!(chat_id = chat_id.0, kind = message.label(), "reply sent");
        Ok(())
    }
}

fn welcome_keyboard() -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = WELCOME_LINKS
        .iter()
        .filter_map(|(label, url)| {
            let url = reqwest::Url::parse(url).ok()?;
            Some(vec![InlineKeyboardButton::url(*label, url)])
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}
