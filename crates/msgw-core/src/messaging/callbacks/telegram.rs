use serde::Deserialize;
use tracing::warn;

use super::decode_payload;
use crate::{
    domain::CallbackId,
    messaging::{port::CallbackNormalizer, types::CallbackUpdate},
};

const PROVIDER: &str = "telegram";

/// Only the fields needed to recognize a callback; every other update kind
/// (message, edited_message, ...) deserializes with `callback_query: None`.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    #[serde(default)]
    callback_query: Option<TelegramCallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct TelegramCallbackQuery {
    id: String,
    #[serde(default)]
    data: Option<String>,
}

/// Reads Bot API updates that carry a `callback_query`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TelegramCallbackNormalizer;

impl CallbackNormalizer for TelegramCallbackNormalizer {
    fn try_parse_callback(&self, raw_json: &str) -> Option<CallbackUpdate> {
        let update: TelegramUpdate = decode_payload(PROVIDER, raw_json)?;
        let query = update.callback_query?;

        let callback_id = match CallbackId::new(query.id) {
            Ok(id) => id,
            Err(_) => {
                warn!(provider = PROVIDER, "callback_query without an id");
                return None;
            }
        };

        Some(CallbackUpdate {
            callback_id,
            // Game callbacks carry no data.
            data: query.data.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE_UPDATE: &str = r#"{
        "update_id": 123456789,
        "message": {
            "message_id": 1,
            "from": { "id": 987654321, "is_bot": false, "first_name": "Test", "username": "testuser" },
            "chat": { "id": 987654321, "first_name": "Test", "username": "testuser", "type": "private" },
            "date": 1234567890,
            "text": "Hello, bot!"
        }
    }"#;

    const CALLBACK_UPDATE: &str = r#"{
        "update_id": 123456789,
        "callback_query": {
            "id": "callback-1",
            "data": "ok",
            "message": { "message_id": 1, "chat": { "id": 987654321 } }
        }
    }"#;

    #[test]
    fn message_update_is_not_a_callback() {
        assert_eq!(
            TelegramCallbackNormalizer.try_parse_callback(MESSAGE_UPDATE),
            None
        );
    }

    #[test]
    fn callback_query_is_normalized() {
        let update = TelegramCallbackNormalizer
            .try_parse_callback(CALLBACK_UPDATE)
            .unwrap();
        assert_eq!(update.callback_id.as_str(), "callback-1");
        assert_eq!(update.data, "ok");
    }

    #[test]
    fn missing_data_becomes_empty_string() {
        let update = TelegramCallbackNormalizer
            .try_parse_callback(r#"{"update_id":1,"callback_query":{"id":"cb"}}"#)
            .unwrap();
        assert_eq!(update.data, "");
    }

    #[tracing_test::traced_test]
    #[test]
    fn malformed_json_degrades_to_none_with_warning() {
        assert_eq!(
            TelegramCallbackNormalizer.try_parse_callback("{not json"),
            None
        );
        assert!(logs_contain("webhook payload is not valid JSON"));
    }

    #[tracing_test::traced_test]
    #[test]
    fn schema_violations_degrade_to_none_with_warning() {
        assert_eq!(
            TelegramCallbackNormalizer.try_parse_callback(r#"{"callback_query":{"data":"ok"}}"#),
            None
        );
        assert!(logs_contain("does not match the provider schema"));

        assert_eq!(
            TelegramCallbackNormalizer.try_parse_callback(r#"{"callback_query":{"id":""}}"#),
            None
        );
        assert!(logs_contain("callback_query without an id"));
    }
}
