//! Telegram adapter (teloxide).
//!
//! Implements the `msgw-core` chat, files and acknowledgment capabilities over the
//! Telegram Bot API.

use std::future::IntoFuture;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile as TgInputFile, Recipient},
    ApiError, RequestError,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use msgw_core::{
    domain::{CallbackId, ChatId, MessageId},
    errors::Error,
    messaging::{
        port::{Acknowledger, ChatClient, ChatFilesClient},
        types::{
            FileKind, InlineKeyboard, InputFile, KeyboardButton, SendFileRequest, SendResult,
            SendTextRequest, UPLOAD_UNSUPPORTED,
        },
    },
    Result,
};

pub const PROVIDER: &str = "telegram";

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    /// Numeric ids go to `Recipient::Id`; anything else is treated as `@channel`.
    fn recipient(chat_id: &ChatId) -> Recipient {
        let raw = chat_id.as_str().trim();
        match raw.parse::<i64>() {
            Ok(id) => Recipient::Id(teloxide::types::ChatId(id)),
            Err(_) => Recipient::ChannelUsername(raw.to_string()),
        }
    }

    fn markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
        let rows = keyboard.rows().iter().map(|row| {
            row.buttons()
                .iter()
                .map(|b| match b {
                    KeyboardButton::Callback { label, data } => {
                        InlineKeyboardButton::callback(label.clone(), data.clone())
                    }
                    KeyboardButton::Url { label, url } => {
                        InlineKeyboardButton::url(label.clone(), url.clone())
                    }
                })
                .collect::<Vec<_>>()
        });
        InlineKeyboardMarkup::new(rows)
    }

    fn input_file(file: &InputFile) -> Result<TgInputFile> {
        match file {
            InputFile::FileId(id) => Ok(TgInputFile::file_id(id.clone())),
            InputFile::RemoteUrl(url) => Ok(TgInputFile::url(url.clone())),
            InputFile::Upload(_) => Err(Error::UnsupportedOperation(UPLOAD_UNSUPPORTED.to_string())),
        }
    }

    fn map_err(e: RequestError) -> Error {
        let code = match &e {
            RequestError::Api(ApiError::BotBlocked) => "telegram_bot_blocked",
            RequestError::Api(ApiError::ChatNotFound) => "telegram_chat_not_found",
            RequestError::Api(_) => "telegram_api",
            RequestError::RetryAfter(_) => "telegram_rate_limited",
            RequestError::Network(_) => "telegram_network",
            _ => "telegram_error",
        };
        Error::messaging(code, e.to_string())
    }

    /// Runs `op`, racing it against `cancel`. A single `RetryAfter` is honored,
    /// everything else is surfaced.
    async fn with_retry<T, Fut>(
        &self,
        cancel: &CancellationToken,
        mut op: impl FnMut() -> Fut,
    ) -> Result<T>
    where
        Fut: IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                res = op().into_future() => res,
            };
            match res {
                Ok(v) => return Ok(v),
                Err(RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    warn!(provider = PROVIDER, wait = ?d, "rate limited, retrying once");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = sleep(d) => {}
                    }
                }
                Err(other) => return Err(Self::map_err(other)),
            }
        }
    }
}

/// Builds one file request with the shared caption/markup setters applied.
macro_rules! file_request {
    ($bot:expr, $method:ident, $recipient:expr, $file:expr, $caption:expr, $markup:expr) => {{
        let mut req = $bot.$method($recipient.clone(), $file.clone());
        if let Some(caption) = $caption {
            req = req.caption(caption.to_string());
        }
        if let Some(markup) = $markup {
            req = req.reply_markup(markup.clone());
        }
        req
    }};
}

#[async_trait]
impl ChatClient for TelegramMessenger {
    async fn send_text(
        &self,
        request: &SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        let recipient = Self::recipient(request.chat_id());
        let markup = request.keyboard().map(Self::markup);

        let msg = self
            .with_retry(cancel, || {
                let mut req = self
                    .bot
                    .send_message(recipient.clone(), request.text().to_string());
                if let Some(markup) = &markup {
                    req = req.reply_markup(markup.clone());
                }
                req
            })
            .await?;

        Ok(SendResult {
            message_id: MessageId::from(msg.id.0),
        })
    }
}

#[async_trait]
impl ChatFilesClient for TelegramMessenger {
    async fn send_file(
        &self,
        request: &SendFileRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        let file = Self::input_file(request.file())?;
        let recipient = Self::recipient(request.chat_id());
        let markup = request.keyboard().map(Self::markup);
        let caption = request.caption();
        let bot = &self.bot;

        let msg = match request.kind() {
            FileKind::Document => {
                self.with_retry(cancel, || {
                    file_request!(bot, send_document, recipient, file, caption, &markup)
                })
                .await?
            }
            FileKind::Image => {
                self.with_retry(cancel, || {
                    file_request!(bot, send_photo, recipient, file, caption, &markup)
                })
                .await?
            }
            FileKind::Video => {
                self.with_retry(cancel, || {
                    file_request!(bot, send_video, recipient, file, caption, &markup)
                })
                .await?
            }
            FileKind::Audio => {
                self.with_retry(cancel, || {
                    file_request!(bot, send_audio, recipient, file, caption, &markup)
                })
                .await?
            }
        };

        Ok(SendResult {
            message_id: MessageId::from(msg.id.0),
        })
    }
}

#[async_trait]
impl Acknowledger for TelegramMessenger {
    async fn acknowledge(
        &self,
        callback_id: &CallbackId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.with_retry(cancel, || {
            self.bot
                .answer_callback_query(callback_id.as_str().to_string())
        })
        .await?;
        Ok(())
    }
}
