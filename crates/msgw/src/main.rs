use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use msgw_core::{
    config::Config,
    messaging::callbacks::{MaxCallbackNormalizer, TelegramCallbackNormalizer},
    registry::{ProviderEntry, ProviderRegistry},
};
use msgw_max::MaxClient;
use msgw_telegram::TelegramMessenger;

mod http;

fn build_registry(cfg: &Config) -> msgw_core::Result<ProviderRegistry> {
    let telegram = Arc::new(TelegramMessenger::from_token(cfg.telegram_bot_token.clone()));
    let mut max = MaxClient::new(
        cfg.max_base_url.clone(),
        cfg.max_access_token.clone(),
        cfg.request_timeout,
    )?;
    if let Some(text) = &cfg.max_ack_notification {
        max = max.with_ack_notification(text.clone());
    }
    let max = Arc::new(max);

    Ok(ProviderRegistry::builder()
        .register(
            msgw_telegram::PROVIDER,
            ProviderEntry::from_client(telegram.clone())
                .with_normalizer(Arc::new(TelegramCallbackNormalizer))
                .with_acknowledger(telegram),
        )?
        .register(
            msgw_max::PROVIDER,
            ProviderEntry::from_client(max.clone())
                .with_normalizer(Arc::new(MaxCallbackNormalizer))
                .with_acknowledger(max),
        )?
        .build())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    msgw_core::logging::init("msgw")?;

    let cfg = Config::load()?;
    let registry = Arc::new(build_registry(&cfg)?);
    info!(providers = ?registry.provider_names(), "provider registry ready");

    let cancel = CancellationToken::new();
    let app = http::router(http::AppState::new(registry, cancel.clone()));

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    info!(addr = %cfg.bind, "msgw listening");

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                shutdown.cancel();
            }
            Err(e) => warn!(error = %e, "ctrl-c handler unavailable"),
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("http server failed")?;

    Ok(())
}
