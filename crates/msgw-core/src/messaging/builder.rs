//! Fluent construction of send requests.
//!
//! ```ignore
//! Message::to(chat_id)
//!     .text("Pick one")
//!     .keyboard(keyboard)
//!     .send(client.as_ref(), &cancel)
//!     .await?;
//! ```

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    domain::ChatId,
    messaging::{
        port::{ChatClient, ChatFilesClient},
        types::{
            FileKind, InlineKeyboard, InputFile, SendFileRequest, SendResult, SendTextRequest,
        },
    },
    Result,
};

/// Entry point of the builder.
pub struct Message;

impl Message {
    pub fn to(chat_id: ChatId) -> MessageTarget {
        MessageTarget { chat_id }
    }
}

pub struct MessageTarget {
    chat_id: ChatId,
}

impl MessageTarget {
    pub fn text(self, text: impl Into<String>) -> TextMessageBuilder {
        TextMessageBuilder {
            chat_id: self.chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn file(self, file: InputFile, kind: FileKind) -> FileMessageBuilder {
        FileMessageBuilder {
            chat_id: self.chat_id,
            file,
            kind,
            caption: None,
            keyboard: None,
        }
    }
}

pub struct TextMessageBuilder {
    chat_id: ChatId,
    text: String,
    keyboard: Option<InlineKeyboard>,
}

impl TextMessageBuilder {
    pub fn keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn build(self) -> Result<SendTextRequest> {
        SendTextRequest::new(self.chat_id, self.text, self.keyboard)
    }

    pub async fn send<C>(self, client: &C, cancel: &CancellationToken) -> Result<SendResult>
    where
        C: ChatClient + ?Sized,
    {
        let request = self.build()?;
        send_text(client, &request, cancel).await
    }
}

pub struct FileMessageBuilder {
    chat_id: ChatId,
    file: InputFile,
    kind: FileKind,
    caption: Option<String>,
    keyboard: Option<InlineKeyboard>,
}

impl FileMessageBuilder {
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn build(self) -> Result<SendFileRequest> {
        SendFileRequest::new(
            self.chat_id,
            self.file,
            self.kind,
            self.caption,
            self.keyboard,
        )
    }

    pub async fn send<C>(self, client: &C, cancel: &CancellationToken) -> Result<SendResult>
    where
        C: ChatFilesClient + ?Sized,
    {
        let request = self.build()?;
        send_file(client, &request, cancel).await
    }
}

/// Single-call dispatch of a text request. No retries.
pub async fn send_text<C>(
    client: &C,
    request: &SendTextRequest,
    cancel: &CancellationToken,
) -> Result<SendResult>
where
    C: ChatClient + ?Sized,
{
    debug!(
        chat_id = %request.chat_id(),
        has_keyboard = request.keyboard().is_some(),
        "sending text message"
    );
    client.send_text(request, cancel).await
}

/// Single-call dispatch of a file request.
///
/// `Upload` sources fail with `UnsupportedOperation` before the client is called.
pub async fn send_file<C>(
    client: &C,
    request: &SendFileRequest,
    cancel: &CancellationToken,
) -> Result<SendResult>
where
    C: ChatFilesClient + ?Sized,
{
    request.file().ensure_deliverable()?;
    debug!(
        chat_id = %request.chat_id(),
        kind = %request.kind(),
        "sending file message"
    );
    client.send_file(request, cancel).await
}
