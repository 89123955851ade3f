use std::{fmt, pin::Pin, str::FromStr};

use tokio::io::AsyncRead;
use url::Url;

use crate::{
    domain::{CallbackId, ChatId, MessageId},
    errors::Error,
    Result,
};

/// Guidance returned whenever a caller asks for stream uploads.
pub const UPLOAD_UNSUPPORTED: &str = "Upload mode requires a file stream, which no provider \
path can deliver yet. Use fileId or url mode instead.";

/// Source of a file to send.
#[derive(Debug)]
pub enum InputFile {
    /// A file already known to the provider.
    FileId(String),
    /// A file the provider fetches itself.
    RemoteUrl(Url),
    /// Raw bytes from the caller. Not deliverable by any provider yet.
    Upload(UploadStream),
}

impl InputFile {
    pub fn file_id(id: impl Into<String>) -> Self {
        Self::FileId(id.into())
    }

    pub fn remote_url(url: &str) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(Error::invalid_argument("File url cannot be empty."));
        }
        let url = Url::parse(url.trim())
            .map_err(|e| Error::invalid_argument(format!("File url '{url}' is invalid: {e}")))?;
        Ok(Self::RemoteUrl(url))
    }

    /// Fails unless this file can be handed to a provider client as-is.
    pub fn ensure_deliverable(&self) -> Result<()> {
        match self {
            Self::FileId(id) if id.trim().is_empty() => {
                Err(Error::invalid_argument("File id cannot be empty."))
            }
            Self::FileId(_) | Self::RemoteUrl(_) => Ok(()),
            Self::Upload(_) => Err(Error::UnsupportedOperation(UPLOAD_UNSUPPORTED.to_string())),
        }
    }
}

/// Caller-supplied byte stream plus the name the file should carry.
pub struct UploadStream {
    pub file_name: String,
    pub reader: Pin<Box<dyn AsyncRead + Send + Sync>>,
}

impl UploadStream {
    pub fn new(
        file_name: impl Into<String>,
        reader: impl AsyncRead + Send + Sync + 'static,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            reader: Box::pin(reader),
        }
    }
}

impl fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStream")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// How the provider should present a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    Document,
    Image,
    Video,
    Audio,
}

impl FileKind {
    pub const ALL: [FileKind; 4] = [
        FileKind::Document,
        FileKind::Image,
        FileKind::Video,
        FileKind::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Document => "Document",
            FileKind::Image => "Image",
            FileKind::Video => "Video",
            FileKind::Audio => "Audio",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        FileKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid = FileKind::ALL.map(FileKind::as_str).join(", ");
                Error::invalid_argument(format!("Invalid kind. Valid values: {valid}"))
            })
    }
}

/// One inline keyboard button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyboardButton {
    /// Round-trips `data` through the provider's callback webhook.
    Callback { label: String, data: String },
    /// Opens a link; produces no callback.
    Url { label: String, url: Url },
}

impl KeyboardButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Callback {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn url(label: impl Into<String>, url: Url) -> Self {
        Self::Url {
            label: label.into(),
            url,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Callback { label, .. } | Self::Url { label, .. } => label,
        }
    }
}

/// Non-empty row of buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardRow {
    buttons: Vec<KeyboardButton>,
}

impl KeyboardRow {
    pub fn new(buttons: Vec<KeyboardButton>) -> Result<Self> {
        if buttons.is_empty() {
            return Err(Error::invalid_argument(
                "Keyboard row must contain at least one button.",
            ));
        }
        if buttons.iter().any(|b| b.label().trim().is_empty()) {
            return Err(Error::invalid_argument("Keyboard button label cannot be empty."));
        }
        Ok(Self { buttons })
    }

    pub fn buttons(&self) -> &[KeyboardButton] {
        &self.buttons
    }
}

/// Non-empty, immutable grid of keyboard rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    rows: Vec<KeyboardRow>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<KeyboardRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::invalid_argument(
                "Inline keyboard must contain at least one row.",
            ));
        }
        Ok(Self { rows })
    }

    /// Convenience for a keyboard with a single row.
    pub fn single_row(buttons: Vec<KeyboardButton>) -> Result<Self> {
        Self::new(vec![KeyboardRow::new(buttons)?])
    }

    pub fn rows(&self) -> &[KeyboardRow] {
        &self.rows
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTextRequest {
    chat_id: ChatId,
    text: String,
    keyboard: Option<InlineKeyboard>,
}

impl SendTextRequest {
    pub fn new(
        chat_id: ChatId,
        text: impl Into<String>,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::invalid_argument("Message text cannot be empty."));
        }
        Ok(Self {
            chat_id,
            text,
            keyboard,
        })
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        self.keyboard.as_ref()
    }
}

#[derive(Debug)]
pub struct SendFileRequest {
    chat_id: ChatId,
    file: InputFile,
    kind: FileKind,
    caption: Option<String>,
    keyboard: Option<InlineKeyboard>,
}

impl SendFileRequest {
    /// Builds the request. A blank file id is rejected here; `Upload` is accepted
    /// and rejected only when the request is sent.
    pub fn new(
        chat_id: ChatId,
        file: InputFile,
        kind: FileKind,
        caption: Option<String>,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<Self> {
        if let InputFile::FileId(id) = &file {
            if id.trim().is_empty() {
                return Err(Error::invalid_argument("File id cannot be empty."));
            }
        }
        Ok(Self {
            chat_id,
            file,
            kind,
            caption: caption.filter(|c| !c.trim().is_empty()),
            keyboard,
        })
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn file(&self) -> &InputFile {
        &self.file
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        self.keyboard.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendResult {
    pub message_id: MessageId,
}

/// Raw inbound webhook, exactly as the transport received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookEnvelope {
    pub provider: String,
    pub raw_json: String,
}

impl WebhookEnvelope {
    pub fn new(provider: impl Into<String>, raw_json: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            raw_json: raw_json.into(),
        }
    }
}

/// Provider-neutral view of a keyboard button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackUpdate {
    pub callback_id: CallbackId,
    pub data: String,
}
