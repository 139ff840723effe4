//! Telegram adapter (teloxide).
//!
//! This crate implements the `rcb-core` MessagingPort over Telegram Bot API and feeds
//! bot commands into the core dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use rcb_core::{
    domain::ChatId,
    errors::Error,
    images::ImageSource,
    messaging::{
        port::MessagingPort,
        types::{OutgoingReply, TextFormat},
    },
    Result,
};

/// Telegram's limit on photo captions, in characters.
const CAPTION_LIMIT: usize = 1024;

fn fits_caption(text: &str) -> bool {
    text.chars().count() <= CAPTION_LIMIT
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn parse_mode(format: TextFormat) -> Option<ParseMode> {
        match format {
            TextFormat::Plain => None,
            TextFormat::Html => Some(ParseMode::Html),
        }
    }

    fn input_file(image: &ImageSource) -> InputFile {
        match image {
            ImageSource::Remote(url) => InputFile::url(url.clone()),
            ImageSource::Local(path) => InputFile::file(path.clone()),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(teloxide::RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    sleep(d).await;
                }
                Err(other) => return Err(Self::map_err(other)),
            }
        }
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
            if let Some(mode) = parse_mode {
                req = req.parse_mode(mode);
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: &ImageSource,
        caption: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        self.with_retry(|| {
            let mut req = self
                .bot
                .send_photo(Self::tg_chat(chat_id), Self::input_file(image))
                .caption(caption.to_string());
            if let Some(mode) = parse_mode {
                req = req.parse_mode(mode);
            }
            req
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_reply(&self, chat_id: ChatId, reply: OutgoingReply) -> Result<()> {
        let parse_mode = Self::parse_mode(reply.format);

        if let Some(image) = &reply.image {
            if !fits_caption(&reply.text) {
                tracing::debug!(chat_id = chat_id.0, ?image, "reply too long for a caption, sending text only");
                return self.send_text(chat_id, &reply.text, parse_mode).await;
            }
            match self.send_photo(chat_id, image, &reply.text, parse_mode).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(chat_id = chat_id.0, ?image, error = %e, "photo send failed, sending text only");
                }
            }
        }

        self.send_text(chat_id, &reply.text, parse_mode).await
    }
}
