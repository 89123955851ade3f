use serde::Deserialize;
use tracing::warn;

use super::decode_payload;
use crate::{
    domain::CallbackId,
    messaging::{port::CallbackNormalizer, types::CallbackUpdate},
};

const PROVIDER: &str = "max";
const CALLBACK_UPDATE_TYPE: &str = "message_callback";

#[derive(Debug, Deserialize)]
struct MaxUpdate {
    #[serde(default)]
    update_type: Option<String>,
    #[serde(default)]
    callback: Option<MaxCallback>,
}

#[derive(Debug, Deserialize)]
struct MaxCallback {
    callback_id: String,
    #[serde(default)]
    payload: Option<String>,
}

/// Reads MAX bot API updates of type `message_callback`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxCallbackNormalizer;

impl CallbackNormalizer for MaxCallbackNormalizer {
    fn try_parse_callback(&self, raw_json: &str) -> Option<CallbackUpdate> {
        let update: MaxUpdate = decode_payload(PROVIDER, raw_json)?;
        if update.update_type.as_deref() != Some(CALLBACK_UPDATE_TYPE) {
            return None;
        }

        let Some(callback) = update.callback else {
            warn!(provider = PROVIDER, "message_callback update without a callback object");
            return None;
        };
        let Ok(callback_id) = CallbackId::new(callback.callback_id) else {
            warn!(provider = PROVIDER, "message_callback update without a callback_id");
            return None;
        };

        Some(CallbackUpdate {
            callback_id,
            data: callback.payload.unwrap_or_default(),
        })
    }
}
