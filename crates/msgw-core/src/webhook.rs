//! Inbound webhook dispatch.
//!
//! Dispatch is total: unknown providers and unknown payload shapes are no-ops.
//! The only error a caller can see is cancellation of the acknowledgment call.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    domain::ProviderName,
    errors::Error,
    messaging::types::{CallbackUpdate, WebhookEnvelope},
    registry::ProviderRegistry,
    Result,
};

/// What happened to one envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The provider has no callback semantics registered.
    NoNormalizer,
    /// The payload was not a callback (or was unreadable).
    NotCallback,
    Callback {
        update: CallbackUpdate,
        /// `true` only when an acknowledger exists and it succeeded.
        acknowledged: bool,
    },
}

#[derive(Clone, Debug)]
pub struct WebhookDispatcher {
    registry: Arc<ProviderRegistry>,
}

impl WebhookDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub async fn dispatch(
        &self,
        envelope: &WebhookEnvelope,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome> {
        info!(
            "Received webhook from provider '{}', RawJson size: {} bytes",
            envelope.provider,
            envelope.raw_json.len()
        );

        let Ok(provider) = ProviderName::parse(&envelope.provider) else {
            debug!("webhook envelope without a provider name");
            return Ok(DispatchOutcome::NoNormalizer);
        };

        let Some(normalizer) = self.registry.normalizer(&provider) else {
            debug!(provider = %provider, "no callback normalizer registered");
            return Ok(DispatchOutcome::NoNormalizer);
        };

        let Some(update) = normalizer.try_parse_callback(&envelope.raw_json) else {
            return Ok(DispatchOutcome::NotCallback);
        };

        info!("Callback data: {}", update.data);

        let Some(acknowledger) = self.registry.acknowledger(&provider) else {
            return Ok(DispatchOutcome::Callback {
                update,
                acknowledged: false,
            });
        };

        let acknowledged = match acknowledger.acknowledge(&update.callback_id, cancel).await {
            Ok(()) => true,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(
                    provider = %provider,
                    callback_id = %update.callback_id,
                    error = %e,
                    "callback acknowledgment failed"
                );
                false
            }
        };

        Ok(DispatchOutcome::Callback {
            update,
            acknowledged,
        })
    }
}
