#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use msgw_core::{
    domain::{CallbackId, MessageId},
    messaging::{
        callbacks::{MaxCallbackNormalizer, TelegramCallbackNormalizer},
        port::{Acknowledger, ChatClient, ChatFilesClient},
        types::{SendFileRequest, SendResult, SendTextRequest},
    },
    registry::{ProviderEntry, ProviderRegistry},
    Error, Result,
};
use tokio_util::sync::CancellationToken;

/// In-memory client that records what it was asked to send.
pub struct FakeClient {
    pub name: &'static str,
    pub texts: Mutex<Vec<SendTextRequest>>,
    pub files: Mutex<u32>,
}

impl FakeClient {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            texts: Mutex::new(Vec::new()),
            files: Mutex::new(0),
        })
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn send_text(
        &self,
        request: &SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.texts.lock().unwrap().push(request.clone());
        Ok(SendResult {
            message_id: MessageId::new(format!("{}-1", self.name))?,
        })
    }
}

#[async_trait]
impl ChatFilesClient for FakeClient {
    async fn send_file(
        &self,
        _request: &SendFileRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        *self.files.lock().unwrap() += 1;
        Ok(SendResult {
            message_id: MessageId::new(format!("{}-file", self.name))?,
        })
    }
}

#[derive(Default)]
pub struct RecordingAcknowledger {
    pub acked: Mutex<Vec<CallbackId>>,
}

#[async_trait]
impl Acknowledger for RecordingAcknowledger {
    async fn acknowledge(
        &self,
        callback_id: &CallbackId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.acked.lock().unwrap().push(callback_id.clone());
        Ok(())
    }
}

pub struct Fixture {
    pub registry: Arc<ProviderRegistry>,
    pub telegram: Arc<FakeClient>,
    pub max: Arc<FakeClient>,
    pub telegram_ack: Arc<RecordingAcknowledger>,
}

/// Telegram with an acknowledger, MAX without one.
pub fn two_providers() -> Fixture {
    let telegram = FakeClient::new("telegram");
    let max = FakeClient::new("max");
    let telegram_ack = Arc::new(RecordingAcknowledger::default());

    let registry = ProviderRegistry::builder()
        .register(
            "telegram",
            ProviderEntry::from_client(telegram.clone())
                .with_normalizer(Arc::new(TelegramCallbackNormalizer))
                .with_acknowledger(telegram_ack.clone()),
        )
        .unwrap()
        .register(
            "max",
            ProviderEntry::from_client(max.clone())
                .with_normalizer(Arc::new(MaxCallbackNormalizer)),
        )
        .unwrap()
        .build();

    Fixture {
        registry: Arc::new(registry),
        telegram,
        max,
        telegram_ack,
    }
}
