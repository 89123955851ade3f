//! HTTP surface: webhook ingestion plus two demo send endpoints.

use std::{fmt, str::FromStr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use msgw_core::{
    domain::ChatId,
    errors::Error,
    messaging::{
        builder::Message,
        types::{
            FileKind, InlineKeyboard, InputFile, KeyboardButton, WebhookEnvelope,
            UPLOAD_UNSUPPORTED,
        },
    },
    registry::ProviderRegistry,
    webhook::{DispatchOutcome, WebhookDispatcher},
};

const DEFAULT_BUTTON_DATA: &str = "callback_data";
const DOCS_URL: &str = "https://example.com/docs";

#[derive(Clone)]
pub struct AppState {
    registry: Arc<ProviderRegistry>,
    dispatcher: WebhookDispatcher,
    cancel: CancellationToken,
}

impl AppState {
    pub fn new(registry: Arc<ProviderRegistry>, cancel: CancellationToken) -> Self {
        Self {
            dispatcher: WebhookDispatcher::new(registry.clone()),
            registry,
            cancel,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "msgw is running" }))
        .route("/webhooks/{provider}", post(receive_webhook))
        .route("/demo/send-keyboard/{provider}", get(send_keyboard))
        .route("/demo/send-file/{provider}", post(send_file))
        .with_state(state)
}

/// Error reply of the demo endpoints.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Messaging { code: String, message: String },
    Unavailable,
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        if e.is_caller_error() {
            return match e {
                Error::InvalidArgument(msg) | Error::UnsupportedOperation(msg) => {
                    Self::BadRequest(msg)
                }
                other => Self::BadRequest(other.to_string()),
            };
        }
        match e {
            Error::Messaging { code, message } => Self::Messaging { code, message },
            Error::Cancelled => Self::Unavailable,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Messaging { code, message } => {
                warn!(code = %code, error = %message, "provider call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "title": format!("Messaging error: {code}"),
                        "status": 500,
                        "detail": message,
                    })),
                )
                    .into_response()
            }
            Self::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "server is shutting down").into_response()
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

async fn receive_webhook(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> StatusCode {
    // Undecodable bytes still reach the normalizer, which reports them.
    let envelope = WebhookEnvelope::new(provider, String::from_utf8_lossy(&body).into_owned());
    let cancel = state.cancel.child_token();

    match state.dispatcher.dispatch(&envelope, &cancel).await {
        Ok(DispatchOutcome::Callback { acknowledged, .. }) => {
            info!(provider = %envelope.provider, acknowledged, "callback handled");
            StatusCode::OK
        }
        Ok(_) => StatusCode::OK,
        Err(e) => {
            warn!(provider = %envelope.provider, error = %e, "webhook dispatch aborted");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendKeyboardQuery {
    chat_id: Option<String>,
}

async fn send_keyboard(
    Path(provider): Path<String>,
    Query(query): Query<SendKeyboardQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let Some(chat_id) = query.chat_id.filter(|c| !c.trim().is_empty()) else {
        return Err(ApiError::BadRequest(
            "chatId query parameter is required.".to_string(),
        ));
    };

    let client = state.registry.resolve_chat_client(&provider)?;

    let docs = Url::parse(DOCS_URL).map_err(|e| ApiError::Internal(e.to_string()))?;
    let keyboard = InlineKeyboard::single_row(vec![
        KeyboardButton::callback("OK", "ok"),
        KeyboardButton::url("Docs", docs),
    ])?;

    Message::to(ChatId::new(chat_id)?)
        .text(format!("Inline keyboard demo ({provider})"))
        .keyboard(keyboard)
        .send(client.as_ref(), &state.cancel.child_token())
        .await?;

    Ok(StatusCode::OK)
}

/// How the demo request names the file to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileSendMode {
    FileId,
    Url,
    Upload,
}

impl FileSendMode {
    const ALL: [FileSendMode; 3] = [Self::FileId, Self::Url, Self::Upload];

    fn as_str(self) -> &'static str {
        match self {
            Self::FileId => "FileId",
            Self::Url => "Url",
            Self::Upload => "Upload",
        }
    }
}

impl fmt::Display for FileSendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileSendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid = Self::ALL.map(Self::as_str).join(", ");
                format!("Invalid mode. Valid values: {valid}")
            })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SendFileBody {
    chat_id: Option<String>,
    kind: Option<String>,
    mode: Option<String>,
    value: Option<String>,
    caption: Option<String>,
    keyboard_button_text: Option<String>,
    keyboard_button_data: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

async fn send_file(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<SendFileBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(chat_id) = non_blank(body.chat_id) else {
        return Err(ApiError::BadRequest("chatId is required.".to_string()));
    };
    let kind: FileKind = body.kind.as_deref().unwrap_or_default().parse()?;
    let mode: FileSendMode = body
        .mode
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::BadRequest)?;

    let client = state.registry.resolve_chat_files_client(&provider)?;

    let value = || {
        body.value.clone().ok_or_else(|| {
            ApiError::BadRequest(format!(
                "value is required for {} mode.",
                match mode {
                    FileSendMode::FileId => "fileId",
                    FileSendMode::Url => "url",
                    FileSendMode::Upload => "upload",
                }
            ))
        })
    };
    let file = match mode {
        FileSendMode::FileId => InputFile::file_id(value()?),
        FileSendMode::Url => InputFile::remote_url(&value()?)?,
        FileSendMode::Upload => {
            return Err(Error::UnsupportedOperation(UPLOAD_UNSUPPORTED.to_string()).into())
        }
    };

    let mut message = Message::to(ChatId::new(chat_id)?).file(file, kind);
    if let Some(caption) = non_blank(body.caption) {
        message = message.caption(caption);
    }
    if let Some(text) = non_blank(body.keyboard_button_text) {
        let data = body
            .keyboard_button_data
            .unwrap_or_else(|| DEFAULT_BUTTON_DATA.to_string());
        message = message.keyboard(InlineKeyboard::single_row(vec![KeyboardButton::callback(
            text, data,
        )])?);
    }

    let result = message
        .send(client.as_ref(), &state.cancel.child_token())
        .await?;

    Ok(Json(json!({ "messageId": result.message_id.as_str() })))
}
