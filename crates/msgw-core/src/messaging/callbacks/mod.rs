//! Per-provider callback normalizers.
//!
//! Each normalizer understands exactly one provider's webhook schema. Picking the
//! right one for an envelope is the dispatcher's job.

mod max;
mod telegram;

pub use max::MaxCallbackNormalizer;
pub use telegram::TelegramCallbackNormalizer;

use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode `raw_json` as `T`, logging (not failing) when it is unreadable.
///
/// Unparseable JSON and JSON that does not fit `T` are reported separately so a
/// provider schema change is distinguishable from garbage traffic.
fn decode_payload<T: DeserializeOwned>(provider: &str, raw_json: &str) -> Option<T> {
    let value: serde_json::Value = match serde_json::from_str(raw_json) {
        Ok(v) => v,
        Err(e) => {
            warn!(provider, error = %e, "webhook payload is not valid JSON");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(provider, error = %e, "webhook payload does not match the provider schema");
            None
        }
    }
}
