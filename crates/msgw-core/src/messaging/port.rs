use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::CallbackId,
    messaging::types::{CallbackUpdate, SendFileRequest, SendResult, SendTextRequest},
    Result,
};

/// Sends text messages (optionally with an inline keyboard) to a chat.
///
/// Implementations must honor `cancel` and report it as `Error::Cancelled`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_text(
        &self,
        request: &SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult>;
}

/// Sends file messages to a chat.
#[async_trait]
pub trait ChatFilesClient: Send + Sync {
    async fn send_file(
        &self,
        request: &SendFileRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult>;
}

/// Confirms receipt of a callback so the provider stops showing a spinner.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn acknowledge(&self, callback_id: &CallbackId, cancel: &CancellationToken)
        -> Result<()>;
}

/// Parses one provider's raw webhook JSON into a callback, if it is one.
///
/// `None` covers both "not a callback" and "unreadable payload"; the latter is
/// logged by the implementation.
pub trait CallbackNormalizer: Send + Sync {
    fn try_parse_callback(&self, raw_json: &str) -> Option<CallbackUpdate>;
}
