//! Request and response bodies of the MAX bot API.

use serde::Deserialize;
use serde_json::{json, Value};

use msgw_core::{
    domain::MessageId,
    errors::Error,
    messaging::types::{
        FileKind, InlineKeyboard, InputFile, KeyboardButton, SendFileRequest, SendTextRequest,
        UPLOAD_UNSUPPORTED,
    },
    Result,
};

pub(crate) fn text_body(request: &SendTextRequest) -> Value {
    let mut body = json!({ "text": request.text() });
    if let Some(kb) = request.keyboard() {
        body["attachments"] = json!([keyboard_attachment(kb)]);
    }
    body
}

pub(crate) fn file_body(request: &SendFileRequest) -> Result<Value> {
    let mut attachments = vec![file_attachment(request.file(), request.kind())?];
    if let Some(kb) = request.keyboard() {
        attachments.push(keyboard_attachment(kb));
    }

    let mut body = json!({ "attachments": attachments });
    if let Some(caption) = request.caption() {
        body["text"] = json!(caption);
    }
    Ok(body)
}

pub(crate) fn answer_body(notification: Option<&str>) -> Value {
    match notification {
        Some(text) => json!({ "notification": text }),
        None => json!({}),
    }
}

fn attachment_type(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Document => "file",
        FileKind::Image => "image",
        FileKind::Video => "video",
        FileKind::Audio => "audio",
    }
}

fn file_attachment(file: &InputFile, kind: FileKind) -> Result<Value> {
    let payload = match file {
        InputFile::FileId(token) => json!({ "token": token }),
        InputFile::RemoteUrl(url) => json!({ "url": url.as_str() }),
        InputFile::Upload(_) => {
            return Err(Error::UnsupportedOperation(UPLOAD_UNSUPPORTED.to_string()))
        }
    };
    Ok(json!({ "type": attachment_type(kind), "payload": payload }))
}

fn keyboard_attachment(kb: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = kb
        .rows()
        .iter()
        .map(|row| row.buttons().iter().map(button).collect())
        .collect();
    json!({ "type": "inline_keyboard", "payload": { "buttons": rows } })
}

fn button(b: &KeyboardButton) -> Value {
    match b {
        KeyboardButton::Callback { label, data } => {
            json!({ "type": "callback", "text": label, "payload": data })
        }
        KeyboardButton::Url { label, url } => {
            json!({ "type": "link", "text": label, "url": url.as_str() })
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    message: SentMessage,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    body: SentMessageBody,
}

#[derive(Debug, Deserialize)]
struct SentMessageBody {
    mid: String,
}

/// Extracts `message.body.mid` from a send response.
pub(crate) fn message_id(response: Value) -> Result<MessageId> {
    let parsed: SendMessageResponse = serde_json::from_value(response).map_err(|e| {
        Error::messaging("max_bad_response", format!("unexpected send response: {e}"))
    })?;
    MessageId::new(parsed.message.body.mid)
        .map_err(|_| Error::messaging("max_bad_response", "send response has an empty mid"))
}

#[cfg(test)]
mod tests {
    use msgw_core::{
        domain::ChatId,
        messaging::types::{KeyboardRow, UploadStream},
    };
    use url::Url;

    use super::*;

    fn chat() -> ChatId {
        ChatId::new("42").unwrap()
    }

    fn keyboard() -> InlineKeyboard {
        InlineKeyboard::new(vec![KeyboardRow::new(vec![
            KeyboardButton::callback("OK", "ok"),
            KeyboardButton::url("Docs", Url::parse("https://example.com/docs").unwrap()),
        ])
        .unwrap()])
        .unwrap()
    }

    #[test]
    fn plain_text_has_no_attachments() {
        let req = SendTextRequest::new(chat(), "hello", None).unwrap();
        assert_eq!(text_body(&req), json!({ "text": "hello" }));
    }

    #[test]
    fn text_with_keyboard_uses_inline_keyboard_attachment() {
        let req = SendTextRequest::new(chat(), "pick", Some(keyboard())).unwrap();
        assert_eq!(
            text_body(&req),
            json!({
                "text": "pick",
                "attachments": [{
                    "type": "inline_keyboard",
                    "payload": { "buttons": [[
                        { "type": "callback", "text": "OK", "payload": "ok" },
                        { "type": "link", "text": "Docs", "url": "https://example.com/docs" }
                    ]] }
                }]
            })
        );
    }

    #[test]
    fn file_body_maps_kind_and_source() {
        let req = SendFileRequest::new(
            chat(),
            InputFile::file_id("tok-1"),
            FileKind::Document,
            Some("report".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(
            file_body(&req).unwrap(),
            json!({
                "text": "report",
                "attachments": [{ "type": "file", "payload": { "token": "tok-1" } }]
            })
        );

        let req = SendFileRequest::new(
            chat(),
            InputFile::remote_url("https://example.com/cat.png").unwrap(),
            FileKind::Image,
            None,
            Some(keyboard()),
        )
        .unwrap();
        let body = file_body(&req).unwrap();
        assert_eq!(body["attachments"][0]["type"], "image");
        assert_eq!(
            body["attachments"][0]["payload"]["url"],
            "https://example.com/cat.png"
        );
        assert_eq!(body["attachments"][1]["type"], "inline_keyboard");
        assert!(body.get("text").is_none());
    }

    #[test]
    fn upload_has_no_body() {
        let req = SendFileRequest::new(
            chat(),
            InputFile::Upload(UploadStream::new("a.bin", tokio::io::empty())),
            FileKind::Video,
            None,
            None,
        )
        .unwrap();
        assert!(matches!(
            file_body(&req),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn answer_body_is_empty_without_notification() {
        assert_eq!(answer_body(None), json!({}));
        assert_eq!(answer_body(Some("Done")), json!({ "notification": "Done" }));
    }

    #[test]
    fn message_id_comes_from_body_mid() {
        let id = message_id(json!({ "message": { "body": { "mid": "mid.abc", "seq": 1 } } }))
            .unwrap();
        assert_eq!(id.as_str(), "mid.abc");

        assert!(matches!(
            message_id(json!({ "success": true })),
            Err(Error::Messaging { code, .. }) if code == "max_bad_response"
        ));
    }
}
